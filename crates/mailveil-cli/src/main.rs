//! The `mailveil` binary: anonymize email addresses in a document-store
//! snapshot.
//!
//! Exits non-zero when the people registry is absent, any configured target
//! collection is invalid, or the identity map build yields zero entries.
//! Fields that simply contain no matches do not fail the run.

use anyhow::Context;
use clap::Parser;
use mailveil_core::{AppConfig, CollectionName, FieldName, TargetField};
use mailveil_scrub::{IdentityMapBuilder, ScrubPipeline};
use mailveil_store::SqliteStore;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

#[derive(Debug, Parser)]
#[command(
    name = "mailveil",
    version,
    about = "Replace known email addresses in free-text fields with identity tokens"
)]
struct Cli {
    /// Path to the SQLite snapshot database
    #[arg(long, value_name = "PATH")]
    db: PathBuf,

    /// Comma-separated collection.field pairs to rewrite (overrides config)
    #[arg(long, value_name = "LIST")]
    fields: Option<String>,

    /// Addresses shared by more than this many identities are not replaced
    #[arg(long, value_name = "N")]
    threshold: Option<usize>,

    /// Number of document ids fetched per batched request
    #[arg(long, value_name = "N")]
    window_size: Option<usize>,

    /// Log filter, e.g. "info" or "mailveil_scrub=debug"
    #[arg(long, default_value = "info", value_name = "FILTER")]
    log: String,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .parse_lossy(&cli.log),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("set tracing subscriber");

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");

        let mut source = e.source();
        if source.is_some() {
            eprintln!("\nCaused by:");
            let mut index = 0;
            while let Some(err) = source {
                eprintln!("    {index}: {err}");
                source = err.source();
                index += 1;
            }
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let start = Instant::now();
    info!("Starting mailveil...");

    let mut config = AppConfig::load_with_env().context("failed to load configuration")?;
    if let Some(threshold) = cli.threshold {
        config.run.threshold = threshold;
    }
    if let Some(window_size) = cli.window_size {
        config.run.window_size = window_size;
    }
    config.validate().context("invalid configuration")?;

    let targets = match &cli.fields {
        Some(fields) => TargetField::parse_list(fields),
        None => config
            .run
            .targets
            .iter()
            .map(|spec| TargetField::parse(spec))
            .collect(),
    }
    .context("invalid target field list")?;

    let registry = CollectionName::new(&config.registry.collection)
        .context("invalid registry collection name")?;
    let email_field =
        FieldName::new(&config.registry.email_field).context("invalid registry email field")?;

    let store = SqliteStore::open(&cli.db)
        .await
        .with_context(|| format!("failed to open snapshot '{}'", cli.db.display()))?;

    let builder = IdentityMapBuilder::new(registry, email_field)
        .with_threshold(config.run.threshold)
        .with_window_size(config.run.window_size);
    let (map, stats) = builder
        .build(&store)
        .await
        .context("failed to build identity mapping")?;
    info!(
        mapped = stats.mapped_addresses,
        excluded = stats.excluded_addresses,
        "identity mapping ready"
    );

    let report = ScrubPipeline::new(&store)
        .with_window_size(config.run.window_size)
        .run(&targets, &map)
        .await
        .context("anonymization run failed")?;

    info!(
        documents = report.total_documents(),
        found = report.total_found(),
        replaced = report.total_replaced(),
        failed_writes = report.total_write_failures(),
        "run complete in {:.3} s",
        start.elapsed().as_secs_f64()
    );

    store.close().await;
    Ok(())
}
