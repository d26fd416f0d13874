//! Range-split HTTP downloads.
//!
//! This module downloads one HTTP resource into a local directory, either as a
//! single resumable stream or as several ranged requests running in parallel
//! whose part files are merged in order.
//!
//! # Components
//!
//! - [`DownloadPlan`] splits a content length into contiguous [`ByteRange`]s
//! - [`TransferClient`] / [`HttpClient`] issue HEAD and ranged GET requests
//! - [`PartStore`] / [`LocalPartStore`] create, append, merge, and delete files
//! - [`Downloader`] runs the pipeline on top of the two traits
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use rangeload_core::download::{Downloader, HttpClient, LocalPartStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let downloader = Downloader::new(Arc::new(HttpClient::new()), Arc::new(LocalPartStore::new()));
//! let file_path = downloader
//!     .download_single_stream(Path::new("./downloads"), "https://example.com/paper.pdf")
//!     .await?;
//! println!("Downloaded: {}", file_path.display());
//! # Ok(())
//! # }
//! ```

mod client;
mod constants;
mod engine;
mod error;
mod filename;
mod plan;
mod progress;
mod store;

pub use client::{ByteStream, HeadInfo, HttpClient, TransferClient};
pub use constants::{CONNECT_TIMEOUT_SECS, DEFAULT_CONCURRENCY, MAX_CONCURRENCY, MIN_CONCURRENCY};
pub use engine::Downloader;
pub use error::DownloadError;
pub use filename::file_name_from_url;
pub use plan::{ByteRange, DownloadPlan, FilePart, part_file_name};
pub use progress::{ByteCounter, ProgressObserver};
pub use store::{LocalPartStore, PartStore};

// Note: we do NOT define module-local Result aliases.
// Use `Result<T, DownloadError>` explicitly in function signatures.
