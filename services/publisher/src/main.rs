//! Data cube publisher.
//!
//! Publishes a cube file as a STAC collection backed by Zarr, re-registers
//! already generated documents with a remote catalog, or derives the
//! day-of-year encoding of a cube.

mod cube_file;
mod manifest;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use publication::request::validate_identifier;
use publication::{
    CatalogSynchronizer, EnvSource, ProcessEnv, Publisher, PublisherConfig, SyncConfig,
};
use zarr_stac::{StacArtifacts, ZarrStacGenerator};

use manifest::PublicationManifest;

#[derive(Parser, Debug)]
#[command(name = "publisher")]
#[command(about = "Publish data cubes as Zarr-backed STAC collections")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log level
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write Zarr and STAC documents for a cube, then upload and register
    /// them as the manifest requests
    Publish {
        /// Cube description (JSON)
        #[arg(long)]
        cube: PathBuf,

        /// Publication manifest (YAML)
        #[arg(short, long)]
        manifest: PathBuf,

        /// Root for output folders (overrides PUBLISH_OUTPUT_ROOT)
        #[arg(long)]
        output_root: Option<PathBuf>,
    },

    /// Register previously generated documents with a remote catalog
    Sync {
        #[arg(long)]
        collection_url: String,

        /// Collection identifier
        #[arg(long)]
        item_id: String,

        /// Folder holding the collection and items documents
        #[arg(long)]
        output_dir: PathBuf,
    },

    /// Replace the time axis of a cube by sin/cos of the day of year
    SinCosDoy {
        #[arg(long)]
        cube: PathBuf,

        #[arg(long)]
        out: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let env: Arc<dyn EnvSource> = Arc::new(ProcessEnv::new());

    match args.command {
        Command::Publish {
            cube,
            manifest,
            output_root,
        } => publish(env, cube, manifest, output_root).await,
        Command::Sync {
            collection_url,
            item_id,
            output_dir,
        } => sync(env.as_ref(), &collection_url, &item_id, output_dir).await,
        Command::SinCosDoy { cube, out } => sin_cos_doy(cube, out),
    }
}

async fn publish(
    env: Arc<dyn EnvSource>,
    cube_path: PathBuf,
    manifest_path: PathBuf,
    output_root: Option<PathBuf>,
) -> Result<()> {
    let cube = Arc::new(cube_file::load_cube(&cube_path)?);
    info!(cube = %cube_path.display(), shape = ?cube.shape(), "Loaded cube");

    let manifest = PublicationManifest::load(&manifest_path, env.as_ref())?;
    let request = manifest.into_request(Arc::clone(&cube))?;

    let mut config = PublisherConfig::from_env(env.as_ref());
    if let Some(root) = output_root {
        config = config.with_output_root(root);
    }

    let generator = Arc::new(ZarrStacGenerator::from_env());
    let publisher = Publisher::new(generator, env, config)?;
    let output = publisher.output_folder(&request);
    let item_id = request.item_id.clone();

    publisher
        .publish(request)
        .await
        .with_context(|| format!("Publication of '{}' failed", item_id))?;

    info!(item_id = %item_id, output = %output.display(), "Publication complete");
    Ok(())
}

async fn sync(
    env: &dyn EnvSource,
    collection_url: &str,
    item_id: &str,
    output_dir: PathBuf,
) -> Result<()> {
    validate_identifier(item_id)?;

    let config = PublisherConfig::from_env(env);
    let synchronizer = CatalogSynchronizer::new(SyncConfig {
        request_timeout: config.request_timeout,
    })?;

    let artifacts = StacArtifacts::locate(&output_dir, item_id);
    let report = synchronizer
        .synchronize(
            collection_url,
            item_id,
            &artifacts.collection_document,
            &artifacts.items_document,
        )
        .await?;

    info!(
        item_id = %item_id,
        collection_status = report.collection_status,
        items = report.items_created,
        "Catalog synchronized"
    );
    Ok(())
}

fn sin_cos_doy(cube_path: PathBuf, out: PathBuf) -> Result<()> {
    let cube = cube_file::load_cube(&cube_path)?;
    let encoded = cube_common::sin_cos_doy(&cube)
        .map_err(|e| anyhow::anyhow!("sin_cos_doy failed ({}): {}", e.code(), e))?;
    cube_file::save_cube(&encoded, &out)?;
    info!(out = %out.display(), shape = ?encoded.shape(), "Wrote day-of-year encoding");
    Ok(())
}
