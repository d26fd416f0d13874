//! Rangeload Core Library
//!
//! Downloads a single HTTP resource into a local directory. Large files can
//! be fetched as several byte ranges in parallel and reassembled in order;
//! a single-stream mode resumes a partially downloaded file.
//!
//! # Architecture
//!
//! - [`download`] - range planning, transfer client, part store, orchestrator

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod download;
#[cfg(test)]
pub(crate) mod test_support;
mod user_agent;

// Re-export commonly used types
pub use download::{
    DEFAULT_CONCURRENCY, DownloadError, DownloadPlan, Downloader, HttpClient, LocalPartStore,
    ProgressObserver,
};
