//! Configuration loading for `avatarforge.toml`
//!
//! Every field is optional in the file. CLI flags override file values.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::catalog::Gender;
use crate::pipeline::DEFAULT_OUTPUT_SIZE;

pub const CONFIG_FILENAME: &str = "avatarforge.toml";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse avatarforge.toml: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Config validation failed: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct EngineConfig {
    /// Root of the template tree, one directory per layer group
    pub assets_dir: PathBuf,
    /// JSON catalog replacing the built-in one
    pub catalog: Option<PathBuf>,
    pub default_size: u32,
    pub default_gender: Gender,
    pub log_level: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("resource"),
            catalog: None,
            default_size: DEFAULT_OUTPUT_SIZE,
            default_gender: Gender::Unspecified,
            log_level: "info".to_string(),
        }
    }
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub assets_dir: Option<PathBuf>,
    pub catalog: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl EngineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path`, or the defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn with_overrides(mut self, overrides: &CliOverrides) -> Self {
        if let Some(dir) = &overrides.assets_dir {
            self.assets_dir = dir.clone();
        }
        if let Some(catalog) = &overrides.catalog {
            self.catalog = Some(catalog.clone());
        }
        if let Some(level) = &overrides.log_level {
            self.log_level = level.clone();
        }
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.default_size == 0 {
            return Err(ConfigError::Validation(
                "default-size must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}
