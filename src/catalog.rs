//! Layer Catalog - Declarative Avatar Parts
//!
//! The catalog is read-only for the whole process. Compositions borrow
//! from it and never write back.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

use crate::builtin;
use crate::ENGINE_VERSION;

/// Used when the catalog carries no background palettes at all.
pub const FALLBACK_BACKGROUND_COLOR: &str = "#E0DDFF";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GroupId {
    Base,
    Ear,
    EarRing,
    EyeBrows,
    Eyes,
    FacialHair,
    Glasses,
    Hair,
    Hat,
    Mouth,
    Nose,
    Shirt,
    Background,
    Mask,
    Headwear,
}

impl GroupId {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupId::Base => "base",
            GroupId::Ear => "ear",
            GroupId::EarRing => "earRing",
            GroupId::EyeBrows => "eyeBrows",
            GroupId::Eyes => "eyes",
            GroupId::FacialHair => "facialHair",
            GroupId::Glasses => "glasses",
            GroupId::Hair => "hair",
            GroupId::Hat => "hat",
            GroupId::Mouth => "mouth",
            GroupId::Nose => "nose",
            GroupId::Shirt => "shirt",
            GroupId::Background => "background",
            GroupId::Mask => "mask",
            GroupId::Headwear => "headwear",
        }
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gender eligibility of a variant, or the preference of a request.
///
/// Serialized as its lowercase name. Deserialization goes through
/// [`FromStr`], so the `0`/`1`/`2` wire codes are accepted as well.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Gender {
    #[default]
    Unspecified,
    Male,
    Female,
}

impl Gender {
    /// A variant is eligible when either side expresses no preference,
    /// or both agree.
    pub fn accepts(self, variant: Gender) -> bool {
        self == Gender::Unspecified || variant == Gender::Unspecified || self == variant
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Unspecified => "unspecified",
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown gender '{0}', expected 0/1/2 or unspecified/male/female")]
pub struct ParseGenderError(pub String);

impl FromStr for Gender {
    type Err = ParseGenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "" | "unspecified" | "unset" => Ok(Gender::Unspecified),
            "1" | "male" => Ok(Gender::Male),
            "2" | "female" => Ok(Gender::Female),
            _ => Err(ParseGenderError(s.to_string())),
        }
    }
}

impl TryFrom<String> for Gender {
    type Error = ParseGenderError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// A weighted set of colors assigned to one layer as a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorPalette {
    pub weight: u32,
    pub colors: Vec<String>,
}

impl ColorPalette {
    pub fn new(weight: u32, colors: &[&str]) -> Self {
        Self {
            weight,
            colors: colors.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn first_color(&self) -> Option<&str> {
        self.colors.first().map(String::as_str)
    }
}

/// One selectable option within a layer group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    #[serde(default)]
    pub gender: Gender,
    pub weight: u32,
    /// Template file name inside the group directory, without extension
    #[serde(default)]
    pub template: Option<String>,
    /// Sentinel variant that renders nothing
    #[serde(default)]
    pub empty: bool,
    #[serde(default)]
    pub palettes: Vec<ColorPalette>,
    #[serde(default)]
    pub color_follows: Option<GroupId>,
    #[serde(default)]
    pub color_differs_from: Vec<GroupId>,
    #[serde(default)]
    pub excludes_groups: Vec<GroupId>,
    #[serde(default)]
    pub celebrates: bool,
}

impl Variant {
    pub fn template(name: &str, weight: u32) -> Self {
        Self {
            gender: Gender::Unspecified,
            weight,
            template: Some(name.to_string()),
            empty: false,
            palettes: vec![],
            color_follows: None,
            color_differs_from: vec![],
            excludes_groups: vec![],
            celebrates: false,
        }
    }

    pub fn empty(weight: u32) -> Self {
        Self {
            template: None,
            empty: true,
            ..Self::template("", weight)
        }
    }

    pub fn gender(mut self, gender: Gender) -> Self {
        self.gender = gender;
        self
    }

    pub fn palettes(mut self, palettes: Vec<ColorPalette>) -> Self {
        self.palettes = palettes;
        self
    }

    pub fn follows(mut self, group: GroupId) -> Self {
        self.color_follows = Some(group);
        self
    }

    pub fn differs_from(mut self, groups: &[GroupId]) -> Self {
        self.color_differs_from = groups.to_vec();
        self
    }

    pub fn excludes(mut self, groups: &[GroupId]) -> Self {
        self.excludes_groups = groups.to_vec();
        self
    }

    pub fn celebrating(mut self) -> Self {
        self.celebrates = true;
        self
    }

    /// The template to render, if this variant draws anything.
    pub fn template_name(&self) -> Option<&str> {
        if self.empty {
            return None;
        }
        self.template.as_deref().filter(|name| !name.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerGroup {
    pub id: GroupId,
    /// Asset directory holding this group's templates
    pub dir: String,
    #[serde(default)]
    pub description: Option<String>,
    pub z_index: i32,
    pub variants: Vec<Variant>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read catalog: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid version '{0}' in catalog")]
    InvalidVersion(String),

    #[error("Catalog version {0} requires engine >= {1}, current is {2}")]
    EngineVersionMismatch(String, String, String),
}

/// Ordered set of layer groups plus the palettes used for background fills.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerCatalog {
    pub version: String,
    #[serde(default = "default_engine_min_version")]
    pub engine_min_version: String,
    pub groups: Vec<LayerGroup>,
    #[serde(default)]
    pub background_palettes: Vec<ColorPalette>,
}

fn default_engine_min_version() -> String {
    crate::MIN_ENGINE_VERSION.to_string()
}

static BUILTIN: Lazy<LayerCatalog> = Lazy::new(builtin::catalog);

impl LayerCatalog {
    /// The catalog shipped with the engine.
    pub fn builtin() -> &'static LayerCatalog {
        &BUILTIN
    }

    pub fn from_json_str(content: &str) -> Result<Self, CatalogError> {
        let catalog: LayerCatalog = serde_json::from_str(content)?;
        catalog.check_engine_version()?;
        Ok(catalog)
    }

    pub fn load_from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path)?;
        let catalog = Self::from_json_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            version = %catalog.version,
            groups = catalog.groups.len(),
            "loaded catalog"
        );
        Ok(catalog)
    }

    pub fn group(&self, id: GroupId) -> Option<&LayerGroup> {
        self.groups.iter().find(|g| g.id == id)
    }

    fn check_engine_version(&self) -> Result<(), CatalogError> {
        let engine_ver = semver::Version::parse(ENGINE_VERSION)
            .map_err(|_| CatalogError::InvalidVersion(ENGINE_VERSION.to_string()))?;
        semver::Version::parse(&self.version)
            .map_err(|_| CatalogError::InvalidVersion(self.version.clone()))?;
        let min_ver = semver::Version::parse(&self.engine_min_version)
            .map_err(|_| CatalogError::InvalidVersion(self.engine_min_version.clone()))?;

        if engine_ver < min_ver {
            return Err(CatalogError::EngineVersionMismatch(
                self.version.clone(),
                self.engine_min_version.clone(),
                ENGINE_VERSION.to_string(),
            ));
        }

        Ok(())
    }
}
