//! Composition Pipeline - Single Entry Point
//!
//! selection -> conflict -> color -> assembly. Every call is an
//! independent random draw; nothing is cached between calls.

use base64::Engine as _;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

use crate::assembly::assemble;
use crate::assets::AssetStore;
use crate::catalog::{CatalogError, Gender, LayerCatalog};
use crate::color::resolve_colors;
use crate::conflict::remove_excluded;
use crate::selection::select_layers;

pub const DEFAULT_OUTPUT_SIZE: u32 = 280;

#[derive(Debug, Error)]
pub enum CompositionError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionRequest {
    #[serde(default = "default_size")]
    pub size: u32,
    #[serde(default)]
    pub gender: Gender,
}

fn default_size() -> u32 {
    DEFAULT_OUTPUT_SIZE
}

impl Default for CompositionRequest {
    fn default() -> Self {
        Self {
            size: DEFAULT_OUTPUT_SIZE,
            gender: Gender::Unspecified,
        }
    }
}

impl CompositionRequest {
    pub fn new(size: u32, gender: Gender) -> Self {
        Self { size, gender }
    }

    pub fn validate(&self) -> Result<(), CompositionError> {
        if self.size == 0 {
            return Err(CompositionError::InvalidRequest(
                "output size must be a positive number of pixels".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositionResult {
    pub document: String,
    pub celebration_triggered: bool,
}

/// How a composed document is handed to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Renderer {
    #[default]
    Svg,
    Base64,
}

impl Renderer {
    pub fn render(&self, result: &CompositionResult) -> String {
        match self {
            Renderer::Svg => result.document.clone(),
            Renderer::Base64 => format!(
                "data:image/svg+xml;base64,{}",
                base64::engine::general_purpose::STANDARD.encode(result.document.as_bytes())
            ),
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Renderer::Svg => "image/svg+xml",
            Renderer::Base64 => "text/plain",
        }
    }
}

impl fmt::Display for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Renderer::Svg => f.write_str("svg"),
            Renderer::Base64 => f.write_str("base64"),
        }
    }
}

impl FromStr for Renderer {
    type Err = CompositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "0" | "svg" => Ok(Renderer::Svg),
            "2" | "base64" => Ok(Renderer::Base64),
            other => Err(CompositionError::InvalidRequest(format!(
                "unsupported renderer '{}', expected svg or base64",
                other
            ))),
        }
    }
}

/// The composition engine - owns the catalog and the asset store
pub struct CompositionEngine {
    catalog: LayerCatalog,
    store: Arc<dyn AssetStore>,
}

impl CompositionEngine {
    pub fn new(catalog: LayerCatalog, store: Arc<dyn AssetStore>) -> Self {
        Self { catalog, store }
    }

    /// Engine over the built-in catalog.
    pub fn with_builtin(store: Arc<dyn AssetStore>) -> Self {
        Self::new(LayerCatalog::builtin().clone(), store)
    }

    pub fn catalog(&self) -> &LayerCatalog {
        &self.catalog
    }

    /// Compose one avatar with a fresh thread-local generator.
    pub fn compose(&self, request: &CompositionRequest) -> Result<CompositionResult, CompositionError> {
        self.compose_with(request, &mut rand::thread_rng(), None)
    }

    /// Compose one avatar with an injected generator and an optional
    /// celebration hook, fired at most once.
    pub fn compose_with<R>(
        &self,
        request: &CompositionRequest,
        rng: &mut R,
        on_celebrate: Option<&dyn Fn()>,
    ) -> Result<CompositionResult, CompositionError>
    where
        R: Rng + ?Sized,
    {
        request.validate()?;

        let selected = select_layers(&self.catalog, request.gender, self.store.as_ref(), rng);
        let mut layers = remove_excluded(selected);
        resolve_colors(&mut layers, rng);

        let layer_count = layers.len();
        let assembled = assemble(layers, request.size, &self.catalog.background_palettes, rng);

        if assembled.celebration_triggered {
            if let Some(hook) = on_celebrate {
                hook();
            }
        }

        tracing::debug!(
            size = request.size,
            gender = %request.gender,
            layers = layer_count,
            celebration = assembled.celebration_triggered,
            "composed avatar"
        );

        Ok(CompositionResult {
            document: assembled.document,
            celebration_triggered: assembled.celebration_triggered,
        })
    }
}

impl fmt::Debug for CompositionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositionEngine")
            .field("catalog_version", &self.catalog.version)
            .field("groups", &self.catalog.groups.len())
            .finish_non_exhaustive()
    }
}
