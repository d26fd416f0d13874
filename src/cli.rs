//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Download one file over HTTP, optionally as parallel byte ranges.
///
/// Rangeload asks the server for the file size, splits it into byte ranges,
/// fetches them concurrently, and stitches the parts back together. With
/// `--single-stream` it resumes a partial file over one connection instead.
#[derive(Parser, Debug)]
#[command(name = "rangeload")]
#[command(author, version, about)]
pub struct Args {
    /// Directory to save the file into (created if missing)
    pub dir: PathBuf,

    /// URL of the file to download
    pub url: String,

    /// Number of concurrent range requests (1-100) [default: 4]
    #[arg(value_parser = clap::value_parser!(u64).range(1..=100))]
    pub concurrency: Option<u64>,

    /// Download over one connection, resuming a partial file if present
    #[arg(long)]
    pub single_stream: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,

    /// TCP connect timeout in seconds (1-3600) [default: 30]
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..=3600))]
    pub connect_timeout: Option<u64>,
}
