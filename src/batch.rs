//! Batch Generation - many avatars, one manifest
//!
//! Items are composed in parallel. Each item owns its generator, so no
//! two compositions share random state.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use uuid::Uuid;

use crate::hashing::{compute_manifest_hash, compute_request_hash, sha256_hex};
use crate::pipeline::{CompositionEngine, CompositionError, CompositionRequest};
use crate::ENGINE_VERSION;

pub const MAX_BATCH_AMOUNT: u32 = 10;
pub const MANIFEST_FILENAME: &str = "manifest.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchRequest {
    #[serde(default = "default_amount")]
    pub amount: u32,
    #[serde(flatten)]
    pub request: CompositionRequest,
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_amount() -> u32 {
    5
}

impl BatchRequest {
    /// Amount actually generated, clamped to `1..=MAX_BATCH_AMOUNT`.
    pub fn effective_amount(&self) -> u32 {
        self.amount.clamp(1, MAX_BATCH_AMOUNT)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItem {
    pub filename: String,
    #[serde(skip)]
    pub document: String,
    pub sha256: String,
    pub celebration_triggered: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub engine_version: String,
    pub catalog_version: String,
    pub request_hash: String,
    pub items: Vec<BatchItem>,
    pub manifest_hash: String,
}

pub fn generate_batch(
    engine: &CompositionEngine,
    batch: &BatchRequest,
    on_celebrate: Option<&(dyn Fn() + Sync)>,
) -> Result<Batch, CompositionError> {
    batch.request.validate()?;
    let amount = batch.effective_amount();
    if amount != batch.amount {
        tracing::debug!(requested = batch.amount, amount, "batch amount clamped");
    }

    let items = (0..amount)
        .into_par_iter()
        .map(|index| {
            let mut rng = match batch.seed {
                Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(u64::from(index))),
                None => StdRng::from_entropy(),
            };
            let hook = on_celebrate.map(|h| h as &dyn Fn());
            engine
                .compose_with(&batch.request, &mut rng, hook)
                .map(|result| BatchItem {
                    filename: format!("avatar_{}.svg", index + 1),
                    sha256: sha256_hex(result.document.as_bytes()),
                    document: result.document,
                    celebration_triggered: result.celebration_triggered,
                })
        })
        .collect::<Result<Vec<_>, CompositionError>>()?;

    let catalog_version = engine.catalog().version.clone();
    let mut manifest = Batch {
        id: Uuid::new_v4().to_string(),
        created_at: Utc::now(),
        engine_version: ENGINE_VERSION.to_string(),
        request_hash: compute_request_hash(batch, &catalog_version, ENGINE_VERSION)?,
        catalog_version,
        items,
        manifest_hash: String::new(), // Computed after
    };

    manifest.manifest_hash = compute_manifest_hash(&manifest)?;

    Ok(manifest)
}

impl Batch {
    /// Write every document plus `manifest.json` into `dir`.
    pub fn write_to_dir(&self, dir: &Path) -> Result<(), CompositionError> {
        fs::create_dir_all(dir)?;
        for item in &self.items {
            fs::write(dir.join(&item.filename), &item.document)?;
        }
        fs::write(dir.join(MANIFEST_FILENAME), serde_json::to_string_pretty(self)?)?;
        tracing::info!(dir = %dir.display(), items = self.items.len(), "batch written");
        Ok(())
    }
}
