//! Conflict Stage - exclusion rules between groups

use std::collections::HashSet;

use crate::catalog::GroupId;
use crate::selection::SelectedLayer;

/// Drop every layer whose group is excluded by any selected variant.
///
/// Exclusions are collected from all selected variants before anything is
/// removed, and the removal is applied once: a removed layer's own
/// exclusions still count.
pub fn remove_excluded(layers: Vec<SelectedLayer<'_>>) -> Vec<SelectedLayer<'_>> {
    let excluded: HashSet<GroupId> = layers
        .iter()
        .flat_map(|layer| layer.variant.excludes_groups.iter().copied())
        .collect();

    if excluded.is_empty() {
        return layers;
    }

    layers
        .into_iter()
        .filter(|layer| {
            let keep = !excluded.contains(&layer.group_id());
            if !keep {
                tracing::debug!(group = %layer.group_id(), "layer excluded by another variant");
            }
            keep
        })
        .collect()
}
