use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use sr_pulse::config::PulseConfig;
use sr_pulse::orchestrator::{Orchestrator, PipelineRequest};
use sr_pulse::stages::StageStatus;
use sr_pulse::store::Store;

/// The Orchestrator's external interface (§4.13/§6 CLI surface).
#[derive(Debug, Parser)]
#[command(name = "sr-pulse", about = "Daily telecom-complaints analytics pipeline")]
struct Cli {
    /// Delimited SR export to ingest before running the pipeline.
    #[arg(long)]
    file: Option<PathBuf>,

    /// Target date (YYYY-MM-DD). Defaults to yesterday.
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Force a baseline recompute for the target date.
    #[arg(long)]
    baseline: bool,

    /// Skip ingestion even if --file is given.
    #[arg(long = "no-ingest")]
    no_ingest: bool,

    /// Path to the TOML config file.
    #[arg(long, default_value = "./sr-pulse.toml")]
    config: PathBuf,

    /// Path to the SQLite database file.
    #[arg(long, default_value = "./sr_pulse.db")]
    db: PathBuf,
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sr_pulse=info")))
        .init();

    let cli = Cli::parse();

    let config = match PulseConfig::load(&cli.config) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("failed to load config: {err}");
            return ExitCode::FAILURE;
        }
    };

    let store = match Store::open(cli.db.to_string_lossy().as_ref(), config.connection_pool_size) {
        Ok(store) => store,
        Err(err) => {
            tracing::error!("failed to open store at {}: {err}", cli.db.display());
            return ExitCode::FAILURE;
        }
    };

    let request = PipelineRequest {
        file_path: cli.file.clone(),
        target_date: cli.date,
        run_ingestion: cli.file.is_some() && !cli.no_ingest,
        run_baseline: cli.baseline,
    };

    let orchestrator = Orchestrator::new(&store, &config);
    let result = orchestrator.run(request);

    match serde_json::to_string_pretty(&result) {
        Ok(json) => println!("{json}"),
        Err(err) => tracing::error!("failed to serialize pipeline result: {err}"),
    }

    if result.overall == StageStatus::Error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
