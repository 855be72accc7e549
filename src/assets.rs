//! Asset Store - Template Resolution
//!
//! The engine never touches storage itself. Everything goes through
//! [`AssetStore`], so compositions can run against a directory tree or
//! against in-memory fixtures.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const TEMPLATE_EXTENSION: &str = "svg";

pub trait AssetStore: Send + Sync {
    /// Raw template text for `name` inside the group directory `dir`.
    fn resolve_template(&self, dir: &str, name: &str) -> Option<String>;
}

/// Templates laid out as `<root>/<dir>/<name>.svg`.
#[derive(Debug, Clone)]
pub struct DirAssetStore {
    root: PathBuf,
}

impl DirAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn template_path(&self, dir: &str, name: &str) -> PathBuf {
        self.root
            .join(dir)
            .join(format!("{}.{}", name, TEMPLATE_EXTENSION))
    }
}

impl AssetStore for DirAssetStore {
    fn resolve_template(&self, dir: &str, name: &str) -> Option<String> {
        let path = self.template_path(dir, name);
        match fs::read_to_string(&path) {
            Ok(content) => Some(content),
            Err(err) => {
                tracing::debug!(path = %path.display(), %err, "template not readable");
                None
            }
        }
    }
}

/// In-memory templates keyed by `(dir, name)`.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetStore {
    templates: HashMap<(String, String), String>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, dir: &str, name: &str, content: impl Into<String>) {
        self.templates
            .insert((dir.to_string(), name.to_string()), content.into());
    }

    pub fn with(mut self, dir: &str, name: &str, content: impl Into<String>) -> Self {
        self.insert(dir, name, content);
        self
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl AssetStore for MemoryAssetStore {
    fn resolve_template(&self, dir: &str, name: &str) -> Option<String> {
        self.templates
            .get(&(dir.to_string(), name.to_string()))
            .cloned()
    }
}
