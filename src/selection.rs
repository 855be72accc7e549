//! Selection Stage - one variant per group
//!
//! Groups are visited in catalog order. A group contributes nothing when
//! no variant is eligible, when the drawn variant is an empty sentinel, or
//! when its template cannot be resolved.

use rand::Rng;

use crate::assets::AssetStore;
use crate::catalog::{Gender, GroupId, LayerCatalog, LayerGroup, Variant};
use crate::weighted::pick;

/// A chosen variant that survived selection, plus what later stages resolve.
#[derive(Debug, Clone)]
pub struct SelectedLayer<'c> {
    pub group: &'c LayerGroup,
    pub variant: &'c Variant,
    /// Raw template text as resolved from the asset store
    pub template: String,
    pub colors: Option<Vec<String>>,
}

impl<'c> SelectedLayer<'c> {
    pub fn group_id(&self) -> GroupId {
        self.group.id
    }

    pub fn z_index(&self) -> i32 {
        self.group.z_index
    }

    pub fn first_color(&self) -> Option<&str> {
        self.colors.as_ref()?.first().map(String::as_str)
    }
}

pub fn select_layers<'c, R>(
    catalog: &'c LayerCatalog,
    gender: Gender,
    store: &dyn AssetStore,
    rng: &mut R,
) -> Vec<SelectedLayer<'c>>
where
    R: Rng + ?Sized,
{
    catalog
        .groups
        .iter()
        .filter_map(|group| select_variant(group, gender, store, rng))
        .collect()
}

fn select_variant<'c, R>(
    group: &'c LayerGroup,
    gender: Gender,
    store: &dyn AssetStore,
    rng: &mut R,
) -> Option<SelectedLayer<'c>>
where
    R: Rng + ?Sized,
{
    let eligible: Vec<&Variant> = group
        .variants
        .iter()
        .filter(|v| gender.accepts(v.gender))
        .collect();

    let variant = match pick(&eligible, rng) {
        Some(variant) => *variant,
        None => {
            tracing::debug!(group = %group.id, %gender, "no eligible variant");
            return None;
        }
    };

    let name = variant.template_name()?;
    let template = store
        .resolve_template(&group.dir, name)
        .filter(|text| !text.trim().is_empty());

    match template {
        Some(template) => {
            tracing::trace!(group = %group.id, template = name, "selected variant");
            Some(SelectedLayer {
                group,
                variant,
                template,
                colors: None,
            })
        }
        None => {
            tracing::debug!(group = %group.id, dir = %group.dir, template = name, "template missing, layer dropped");
            None
        }
    }
}
