//! Papershelf bulk import
//!
//! Ingests every PDF in a directory into the catalog and prints a JSON
//! summary. The directory is the first argument, or the configured library
//! folder when none is given.
//!
//! ```text
//! ingest [DIR]
//! ```

use anyhow::{bail, Context};
use papershelf_common::{config::AppConfig, telemetry, Repository, VERSION};
use papershelf_ingestion::{IngestReport, IngestionPipeline};
use std::path::PathBuf;
use tracing::{info, Instrument};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load().context("Failed to load configuration")?;
    telemetry::init_tracing(&config.observability);

    let span = telemetry::service_span(&config.observability);
    let report = import(&config).instrument(span).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.failed > 0 {
        std::process::exit(2);
    }
    Ok(())
}

async fn import(config: &AppConfig) -> anyhow::Result<IngestReport> {
    info!("Starting Papershelf import v{}", VERSION);

    let dir = match std::env::args_os().nth(1) {
        Some(arg) => PathBuf::from(arg),
        None => match config.library.folder_path() {
            Some(folder) => folder.to_path_buf(),
            None => bail!("No directory given and no library folder configured"),
        },
    };
    if !dir.is_dir() {
        bail!("Not a directory: {}", dir.display());
    }

    let repository = Repository::open(&config.database)
        .await
        .context("Failed to open catalog")?;
    let pipeline = IngestionPipeline::new(repository);

    let report = pipeline
        .ingest_directory(&dir)
        .await
        .with_context(|| format!("Failed to import {}", dir.display()))?;

    Ok(report)
}
