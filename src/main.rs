//! CLI entry point for the rangeload tool.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use rangeload_core::download::{Downloader, HttpClient, LocalPartStore};
use tracing::{debug, info};

mod app_config;
mod cli;
mod progress_bar;

use app_config::Settings;
use cli::Args;
use progress_bar::TransferProgress;

/// Final outcome of a run, mapped to the process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProcessExit {
    Success,
    Failure,
}

impl From<ProcessExit> for ExitCode {
    fn from(outcome: ProcessExit) -> Self {
        match outcome {
            ProcessExit::Success => ExitCode::SUCCESS,
            ProcessExit::Failure => ExitCode::FAILURE,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    match run(args).await {
        Ok(outcome) => outcome.into(),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ProcessExit> {
    let file_config = app_config::load_default_file_config()?;
    let settings = Settings::resolve(&args, file_config.as_ref());

    // Priority: RUST_LOG env var > quiet flag > verbose flag > config verbosity > info
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(settings.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, ?settings, "CLI arguments resolved");
    info!(url = %args.url, dir = %args.dir.display(), "rangeload starting");

    let progress = Arc::new(TransferProgress::new(settings.show_progress));
    let downloader = Downloader::new(
        Arc::new(HttpClient::with_connect_timeout(settings.connect_timeout_secs)),
        Arc::new(LocalPartStore::new()),
    )
    .with_progress(Arc::clone(&progress) as Arc<dyn rangeload_core::ProgressObserver>);

    let result = if args.single_stream {
        downloader.download_single_stream(&args.dir, &args.url).await
    } else {
        downloader
            .download_concurrent(&args.dir, &args.url, settings.concurrency)
            .await
    };
    progress.finish();

    let outcome = match &result {
        Ok(path) => {
            println!("ok");
            println!("Finished downloading {}", path.display());
            ProcessExit::Success
        }
        Err(e) => {
            println!("error: {e}");
            println!("Finished downloading {}", args.url);
            ProcessExit::Failure
        }
    };
    Ok(outcome)
}
