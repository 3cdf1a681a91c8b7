#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the incident log extractor.
//!
//! Reads a list of daily incident summary URLs, extracts and augments every
//! incident, and writes the report to stdout. Logs and progress bars go to
//! stderr through [`bars::init_logger`].

mod bars;

use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, ValueEnum};
use incident_log_ingest::config::RunConfig;
use incident_log_ingest::{Pipeline, Services, output, read_urls};

use crate::bars::{DocumentBar, IncidentBar};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Tab-separated report with a header row
    Tsv,
    /// JSON array of augmented incidents
    Json,
}

#[derive(Parser)]
#[command(
    name = "incident_log",
    about = "Extract and augment incidents from daily incident summaries"
)]
struct Cli {
    /// File containing one incident summary URL per line
    #[arg(long)]
    urls: PathBuf,
    /// Run configuration TOML (defaults are built in)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Report format written to stdout
    #[arg(long, value_enum, default_value_t = OutputFormat::Tsv)]
    format: OutputFormat,
    /// Skip geocoding and weather lookups
    #[arg(long)]
    offline: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = bars::init_logger();
    let cli = Cli::parse();

    let config = RunConfig::load(cli.config.as_deref())?;
    let urls = read_urls(&cli.urls)?;
    if urls.is_empty() {
        log::warn!("No URLs in {}", cli.urls.display());
    }

    let services = Services::connect(&config, cli.offline)?;

    let run = Pipeline::new(&config, services.collaborators())
        .with_progress(
            Arc::new(DocumentBar::new(&multi)),
            Arc::new(IncidentBar::new(&multi)),
        )
        .run(&urls)
        .await?;

    for failed in &run.failed {
        log::error!("Failed to process {}: {}", failed.url, failed.reason);
    }

    let mut out = BufWriter::new(std::io::stdout().lock());
    match cli.format {
        OutputFormat::Tsv => output::write_tsv(&mut out, &run.incidents)?,
        OutputFormat::Json => output::write_json(&mut out, &run.incidents)?,
    }

    Ok(())
}
