//! CLI entry point for the paper downloader.

use std::io::{self, IsTerminal};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use paperdl_core::config::{self, LoadedConfig};
use paperdl_core::{
    DEFAULT_PARALLELISM, DownloadManager, HttpClient, Pipeline, PipelineConfig, ScraperRegistry,
};
use tracing::{debug, info};

mod cli;
mod progress;

use cli::Args;
use progress::ConsoleObserver;

/// Process outcome for a batch of targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProcessExit {
    Success,
    Partial,
    Failure,
}

impl From<ProcessExit> for ExitCode {
    fn from(exit: ProcessExit) -> Self {
        match exit {
            ProcessExit::Success => ExitCode::SUCCESS,
            ProcessExit::Partial | ProcessExit::Failure => ExitCode::FAILURE,
        }
    }
}

/// Maps completed and failed target counts to the exit outcome.
fn determine_exit_outcome(completed: usize, failed: usize) -> ProcessExit {
    if failed == 0 {
        ProcessExit::Success
    } else if completed > 0 {
        ProcessExit::Partial
    } else {
        ProcessExit::Failure
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(args.default_log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match run(args).await {
        Ok(exit) => exit.into(),
        Err(error) => {
            eprintln!("Error: {error:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ProcessExit> {
    debug!(?args, "CLI arguments parsed");

    let LoadedConfig {
        path: config_path,
        config: file_config,
        loaded_from_file,
    } = config::load_config(args.config.as_deref())?;
    if loaded_from_file && let Some(path) = &config_path {
        debug!(path = %path.display(), "config file loaded");
    }

    let download_dir = config::resolve_download_dir(args.download_dir.as_deref(), &file_config)?;
    let mut pipeline_config = PipelineConfig::new(download_dir);
    pipeline_config.parallelism = args
        .parallel
        .map(usize::from)
        .or(file_config.parallel_connections)
        .unwrap_or(DEFAULT_PARALLELISM);
    pipeline_config.pdf_only = args.pdf_only || file_config.pdf_only.unwrap_or(false);
    pipeline_config.embed_metadata =
        args.embed_metadata || file_config.embed_metadata.unwrap_or(false);

    let scrapers = ScraperRegistry::standard(&file_config.scrape_http_settings())?;
    let downloads = DownloadManager::new(HttpClient::new(&file_config.download_http_settings())?);

    info!(
        targets = args.targets.len(),
        download_dir = %pipeline_config.download_dir.display(),
        parallelism = pipeline_config.parallelism,
        "paper downloader starting"
    );

    let use_spinner = !args.quiet && io::stderr().is_terminal();
    let observer = Arc::new(ConsoleObserver::new(use_spinner, args.targets.len()));
    let pipeline = Pipeline::new(pipeline_config, scrapers, downloads)
        .with_observer(Box::new(Arc::clone(&observer)));

    let results = pipeline.process_all(args.targets.as_slice()).await;
    observer.finish();

    let failed = results.iter().filter(|(_, result)| result.is_err()).count();
    let completed = results.len() - failed;
    info!(completed, failed, "run complete");
    Ok(determine_exit_outcome(completed, failed))
}
