//! AvatarForge Core - Avatar Layer Compositor
//!
//! # The Five Rules
//! 1. One Layer Per Group
//! 2. Exclusions Apply Once
//! 3. Colors Resolve Before Assembly
//! 4. A Background Fill Is Always Drawn
//! 5. Every Call Draws Fresh

pub mod catalog;
pub mod builtin;
pub mod weighted;
pub mod assets;
pub mod selection;
pub mod conflict;
pub mod color;
pub mod assembly;
pub mod pipeline;
pub mod batch;
pub mod hashing;
pub mod config;

pub use catalog::{ColorPalette, Gender, GroupId, LayerCatalog, LayerGroup, Variant, CatalogError};
pub use assets::{AssetStore, DirAssetStore, MemoryAssetStore};
pub use weighted::{pick, Weighted};
pub use selection::SelectedLayer;
pub use pipeline::{CompositionEngine, CompositionError, CompositionRequest, CompositionResult, Renderer};
pub use batch::{generate_batch, Batch, BatchItem, BatchRequest, MAX_BATCH_AMOUNT};
pub use hashing::{compute_manifest_hash, compute_request_hash, canonical_json};
pub use config::{CliOverrides, ConfigError, EngineConfig};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const MIN_ENGINE_VERSION: &str = "1.0.0";
