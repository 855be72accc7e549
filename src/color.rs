//! Color Stage - palette assignment and color constraints
//!
//! Three passes in fixed order: assign palettes, re-roll layers whose first
//! color collides with a group they must differ from, then copy colors
//! for layers that follow another group.

use rand::Rng;

use crate::selection::SelectedLayer;
use crate::weighted::pick;

/// Re-roll bound for a single differs-from target.
pub const MAX_RECOLOR_ATTEMPTS: usize = 10;

pub fn resolve_colors<R>(layers: &mut [SelectedLayer<'_>], rng: &mut R)
where
    R: Rng + ?Sized,
{
    assign_palettes(layers, rng);
    separate_colors(layers, rng);
    inherit_colors(layers);
}

fn assign_palettes<R>(layers: &mut [SelectedLayer<'_>], rng: &mut R)
where
    R: Rng + ?Sized,
{
    for layer in layers.iter_mut() {
        if let Some(palette) = pick(&layer.variant.palettes, rng) {
            layer.colors = Some(palette.colors.clone());
        }
    }
}

fn separate_colors<R>(layers: &mut [SelectedLayer<'_>], rng: &mut R)
where
    R: Rng + ?Sized,
{
    for i in 0..layers.len() {
        if layers[i].colors.is_none() {
            continue;
        }
        let variant = layers[i].variant;

        for target in &variant.color_differs_from {
            let Some(target_color) = layers
                .iter()
                .find(|l| l.group_id() == *target)
                .and_then(|l| l.first_color())
                .map(str::to_string)
            else {
                continue;
            };

            let mut attempts = 0;
            while layers[i].first_color() == Some(target_color.as_str()) {
                if attempts == MAX_RECOLOR_ATTEMPTS {
                    tracing::warn!(
                        group = %layers[i].group_id(),
                        target = %target,
                        color = %target_color,
                        "color collision kept after retry limit"
                    );
                    break;
                }
                if let Some(palette) = pick(&variant.palettes, rng) {
                    layers[i].colors = Some(palette.colors.clone());
                }
                attempts += 1;
            }
        }
    }
}

// Single hop: the source is read as it stands after the first two passes.
fn inherit_colors(layers: &mut [SelectedLayer<'_>]) {
    let inherited: Vec<Option<Vec<String>>> = layers
        .iter()
        .map(|layer| {
            let source = layer.variant.color_follows?;
            layers
                .iter()
                .find(|l| l.group_id() == source)
                .and_then(|l| l.colors.clone())
        })
        .collect();

    for (layer, colors) in layers.iter_mut().zip(inherited) {
        if colors.is_some() {
            layer.colors = colors;
        }
    }
}
