//! AvatarForge CLI - Bridge interface for HTTP and batch callers
//!
//! Commands: catalog, compose, batch
//! Outputs documents or JSON to stdout, logs to stderr
//! Returns 2 on an invalid request

use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use avatarforge_core::{
    config::CONFIG_FILENAME, generate_batch, BatchRequest, CliOverrides, CompositionEngine,
    CompositionError, CompositionRequest, DirAssetStore, EngineConfig, Gender, LayerCatalog,
    Renderer,
};

#[derive(Parser)]
#[command(name = "avatarforge-cli")]
#[command(about = "AvatarForge CLI - Avatar Layer Compositor")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the config file
    #[arg(short, long, global = true, default_value = CONFIG_FILENAME)]
    config: PathBuf,

    /// Path to the template tree
    #[arg(short, long, global = true)]
    assets_dir: Option<PathBuf>,

    /// JSON catalog replacing the built-in one
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// trace, debug, info, warn or error
    #[arg(short, long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List layer groups in the catalog
    Catalog,

    /// Compose one avatar
    Compose {
        /// Output width and height in pixels
        #[arg(short, long)]
        size: Option<u32>,

        /// 0/1/2 or unspecified/male/female
        #[arg(short, long)]
        gender: Option<Gender>,

        /// svg or base64
        #[arg(short, long, default_value_t = Renderer::Svg)]
        renderer: Renderer,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// Wrap the result in a JSON envelope
        #[arg(long)]
        json: bool,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Compose several avatars into a directory
    Batch {
        /// Number of avatars, clamped to 1..=10
        #[arg(short = 'n', long, default_value_t = 5)]
        amount: u32,

        #[arg(short, long)]
        size: Option<u32>,

        #[arg(short, long)]
        gender: Option<Gender>,

        #[arg(long)]
        seed: Option<u64>,

        /// Output directory
        #[arg(short, long)]
        out_dir: PathBuf,
    },
}

fn setup_logging(log_level: &str) {
    let filter = EnvFilter::try_new(log_level.to_lowercase()).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn failure(error: &CompositionError) -> ExitCode {
    let output = serde_json::json!({
        "success": false,
        "error": error.to_string(),
    });
    println!("{}", output);
    match error {
        CompositionError::InvalidRequest(_) => ExitCode::from(2),
        _ => ExitCode::FAILURE,
    }
}

fn celebrate() {
    tracing::info!("special variant drawn, congratulations!");
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let overrides = CliOverrides {
        assets_dir: cli.assets_dir.clone(),
        catalog: cli.catalog.clone(),
        log_level: cli.log_level.clone(),
    };
    let config = match EngineConfig::load(&cli.config) {
        Ok(c) => c.with_overrides(&overrides),
        Err(e) => {
            eprintln!(r#"{{"error": "Failed to load config: {}"}}"#, e);
            return ExitCode::FAILURE;
        }
    };

    setup_logging(&config.log_level);

    // Load catalog
    let catalog = match &config.catalog {
        Some(path) => match LayerCatalog::load_from_file(path) {
            Ok(c) => c,
            Err(e) => return failure(&e.into()),
        },
        None => LayerCatalog::builtin().clone(),
    };

    let store = DirAssetStore::new(&config.assets_dir);
    if !store.root().exists() {
        tracing::warn!(dir = %store.root().display(), "assets directory missing, layers will be dropped");
    }
    let engine = CompositionEngine::new(catalog, Arc::new(store));

    match cli.command {
        Commands::Catalog => {
            let groups: Vec<_> = engine
                .catalog()
                .groups
                .iter()
                .map(|g| serde_json::json!({
                    "id": g.id,
                    "dir": g.dir,
                    "zIndex": g.z_index,
                    "variants": g.variants.len(),
                }))
                .collect();

            let output = serde_json::json!({
                "version": engine.catalog().version,
                "groups": groups,
            });
            match serde_json::to_string_pretty(&output) {
                Ok(text) => {
                    println!("{}", text);
                    ExitCode::SUCCESS
                }
                Err(e) => failure(&e.into()),
            }
        }

        Commands::Compose { size, gender, renderer, seed, json, out } => {
            let request = CompositionRequest::new(
                size.unwrap_or(config.default_size),
                gender.unwrap_or(config.default_gender),
            );

            let hook: &dyn Fn() = &celebrate;
            let composed = match seed {
                Some(seed) => engine.compose_with(&request, &mut StdRng::seed_from_u64(seed), Some(hook)),
                None => engine.compose_with(&request, &mut rand::thread_rng(), Some(hook)),
            };
            let result = match composed {
                Ok(r) => r,
                Err(e) => return failure(&e),
            };

            let rendered = renderer.render(&result);
            let text = if json {
                serde_json::json!({
                    "success": true,
                    "data": {
                        "svg": rendered,
                        "size": request.size,
                        "gender": request.gender,
                        "contentType": renderer.content_type(),
                        "celebrationTriggered": result.celebration_triggered,
                    }
                })
                .to_string()
            } else {
                rendered
            };

            match out {
                Some(path) => match fs::write(&path, text) {
                    Ok(()) => {
                        tracing::info!(path = %path.display(), "avatar written");
                        ExitCode::SUCCESS
                    }
                    Err(e) => failure(&e.into()),
                },
                None => {
                    println!("{}", text);
                    ExitCode::SUCCESS
                }
            }
        }

        Commands::Batch { amount, size, gender, seed, out_dir } => {
            let request = BatchRequest {
                amount,
                request: CompositionRequest::new(
                    size.unwrap_or(config.default_size),
                    gender.unwrap_or(config.default_gender),
                ),
                seed,
            };

            let hook: &(dyn Fn() + Sync) = &celebrate;
            let batch = match generate_batch(&engine, &request, Some(hook)) {
                Ok(b) => b,
                Err(e) => return failure(&e),
            };
            if let Err(e) = batch.write_to_dir(&out_dir) {
                return failure(&e);
            }

            let output = serde_json::json!({
                "success": true,
                "manifest": batch,
            });
            println!("{}", output);
            ExitCode::SUCCESS
        }
    }
}
