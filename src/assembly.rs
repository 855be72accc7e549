//! Assembly Stage - z-ordering and document synthesis

use once_cell::sync::Lazy;
use rand::Rng;
use regex::{Captures, Regex};

use crate::catalog::{ColorPalette, GroupId, FALLBACK_BACKGROUND_COLOR};
use crate::selection::SelectedLayer;
use crate::weighted::pick;

/// Templates are authored on a fixed 380x380 canvas.
pub const CANVAS_VIEWBOX: u32 = 380;

pub const GROUP_ID_PREFIX: &str = "avatar-";

static COLOR_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{color\[(\d+)\]\}\}").expect("Invalid regex pattern for color placeholder")
});

static XML_PROLOG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<\?xml[^>]*\?>").expect("Invalid regex pattern for xml prolog"));

static SVG_OPEN_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<svg[^>]*>").expect("Invalid regex pattern for svg open tag"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembled {
    pub document: String,
    pub celebration_triggered: bool,
}

pub fn assemble<R>(
    mut layers: Vec<SelectedLayer<'_>>,
    size: u32,
    background_palettes: &[ColorPalette],
    rng: &mut R,
) -> Assembled
where
    R: Rng + ?Sized,
{
    // Vec::sort_by_key is stable, ties keep catalog order.
    layers.sort_by_key(SelectedLayer::z_index);

    let mut elements = Vec::with_capacity(layers.len() + 1);

    if !layers.iter().any(|l| l.group_id() == GroupId::Background) {
        elements.push(fill_rect(&background_color(background_palettes, rng)));
    }

    for layer in &layers {
        if layer.group_id() == GroupId::Background {
            let color = match layer.first_color() {
                Some(color) => color.to_string(),
                None => background_color(background_palettes, rng),
            };
            elements.push(fill_rect(&color));
        }

        let content = strip_wrapper(&substitute_colors(&layer.template, layer.colors.as_deref()));
        elements.push(format!(
            r#"<g id="{}{}">{}</g>"#,
            GROUP_ID_PREFIX,
            layer.group_id(),
            content
        ));
    }

    let celebration_triggered = layers.iter().any(|l| l.variant.celebrates);

    let document = format!(
        r#"<svg width="{size}" height="{size}" viewBox="0 0 {vb} {vb}" fill="none" xmlns="http://www.w3.org/2000/svg">{body}</svg>"#,
        size = size,
        vb = CANVAS_VIEWBOX,
        body = elements.concat(),
    );

    Assembled {
        document: compact(&document),
        celebration_triggered,
    }
}

/// Replace `{{color[N]}}` with the N-th assigned color.
///
/// Tokens without a matching color are left as they are.
pub fn substitute_colors(template: &str, colors: Option<&[String]>) -> String {
    let Some(colors) = colors else {
        return template.to_string();
    };
    COLOR_PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            caps[1]
                .parse::<usize>()
                .ok()
                .and_then(|index| colors.get(index))
                .cloned()
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Drop the template's own document wrapper, keeping the drawable content.
pub fn strip_wrapper(svg: &str) -> String {
    let without_prolog = XML_PROLOG.replace_all(svg, "");
    let without_open = SVG_OPEN_TAG.replace_all(&without_prolog, "");
    without_open.replace("</svg>", "").trim().to_string()
}

fn background_color<R>(palettes: &[ColorPalette], rng: &mut R) -> String
where
    R: Rng + ?Sized,
{
    pick(palettes, rng)
        .and_then(ColorPalette::first_color)
        .unwrap_or(FALLBACK_BACKGROUND_COLOR)
        .to_string()
}

fn fill_rect(color: &str) -> String {
    format!(r#"<rect width="100%" height="100%" fill="{}"/>"#, color)
}

/// Delete every `\n`, `\r` and `\t`. Nothing is collapsed into a space,
/// so templates must not rely on a line break as the only attribute
/// separator: `<path\nd="M0"/>` becomes `<pathd="M0"/>`.
fn compact(document: &str) -> String {
    document
        .trim()
        .chars()
        .filter(|c| !matches!(c, '\n' | '\r' | '\t'))
        .collect()
}
