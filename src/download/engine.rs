//! Download orchestrator: single-stream resume and concurrent ranged downloads.
//!
//! [`Downloader`] coordinates a [`TransferClient`] and a [`PartStore`]. It owns
//! the plan and the set of part files for the duration of one call; nothing
//! survives between calls.
//!
//! # Concurrent pipeline
//!
//! `download_concurrent` resolves the file name, asks the server for the
//! content length, splits it into a [`DownloadPlan`], and spawns one Tokio
//! task per range. Each task clears a stale part file, creates a fresh one,
//! fetches its range, and appends the body to the part file. The join waits
//! for every task, even after one has failed, and collects the outcomes into
//! a vector indexed by plan position. A single scan over that vector reports
//! the lowest-index failure or yields the parts, which are merged in index
//! order and then removed.
//!
//! There is no cancellation: a failing task does not stop its siblings, and
//! part files from a failed run are left on disk.
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
//! let path = downloader
//!     .download_concurrent(Path::new("./downloads"), "https://example.com/archive.zip", 8)
//!     .await?;
//! println!("Downloaded to: {}", path.display());
//! # Ok(())
//! # }
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures_util::StreamExt;
use futures_util::future::join_all;
use tracing::{debug, info, instrument, warn};

use super::client::{ByteStream, TransferClient};
use super::constants::{MAX_CONCURRENCY, MIN_CONCURRENCY};
use super::error::DownloadError;
use super::filename::file_name_from_url;
use super::plan::{ByteRange, DownloadPlan, FilePart, part_file_name};
use super::progress::ProgressObserver;
use super::store::PartStore;

/// Coordinates planning, fan-out, merge, and cleanup for one download at a time.
///
/// Cloning is cheap; clones share the same client, store, and observer.
#[derive(Clone)]
pub struct Downloader {
    client: Arc<dyn TransferClient>,
    store: Arc<dyn PartStore>,
    progress: Option<Arc<dyn ProgressObserver>>,
}

impl std::fmt::Debug for Downloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Downloader")
            .field("progress", &self.progress.is_some())
            .finish_non_exhaustive()
    }
}

impl Downloader {
    /// Creates a downloader from its two collaborators.
    #[must_use]
    pub fn new(client: Arc<dyn TransferClient>, store: Arc<dyn PartStore>) -> Self {
        Self {
            client,
            store,
            progress: None,
        }
    }

    /// Attaches an observer that receives byte counts as chunks arrive.
    #[must_use]
    pub fn with_progress(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.progress = Some(observer);
        self
    }

    /// Downloads `url` into `dir` over one connection, resuming a partial file.
    ///
    /// If `dir/<file name>` already holds `k` bytes, the request carries
    /// `Range: bytes=k-` and the response is appended to the file.
    ///
    /// # Errors
    ///
    /// - [`DownloadError::InvalidInput`] if `url` is not an absolute URL with a
    ///   file name, before any network or filesystem call
    /// - any error from the store (creating/stat-ing or writing the file)
    /// - any error from the client (request or body stream)
    #[instrument(skip_all, fields(url = %url, dir = %dir.display()))]
    pub async fn download_single_stream(
        &self,
        dir: &Path,
        url: &str,
    ) -> Result<PathBuf, DownloadError> {
        let file_name = file_name_from_url(url)?;

        let existing_bytes = self.store.ensure_file(dir, &file_name).await?;
        let range = ByteRange::open(existing_bytes);
        debug!(existing_bytes, range = %range, "resuming single-stream download");

        let stream = self.client.get_range(url, range).await?;
        let dest = dir.join(&file_name);
        let written = self
            .store
            .write_stream(observe(self.progress.as_ref(), stream), &dest)
            .await?;

        info!(
            path = %dest.display(),
            bytes = existing_bytes + written,
            resumed_from = existing_bytes,
            "download complete"
        );
        Ok(dest)
    }

    /// Downloads `url` into `dir` using up to `concurrency` ranged requests.
    ///
    /// The plan may hold one more range than `concurrency` (the remainder
    /// range), and one task runs per range. Part files are named
    /// `<index>-<file name>` and merged in ascending index order into
    /// `dir/<file name>`.
    ///
    /// # Errors
    ///
    /// - [`DownloadError::InvalidInput`] for an unusable URL or a concurrency
    ///   outside `1..=100`, before any network or filesystem call
    /// - the client's HEAD error, unwrapped
    /// - [`DownloadError::FilePart`] wrapping the lowest-index part failure
    /// - the store's merge error, unwrapped
    ///
    /// Failures to remove part files are logged and never returned.
    #[instrument(skip_all, fields(url = %url, dir = %dir.display(), concurrency = concurrency))]
    pub async fn download_concurrent(
        &self,
        dir: &Path,
        url: &str,
        concurrency: u64,
    ) -> Result<PathBuf, DownloadError> {
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&concurrency) {
            return Err(DownloadError::invalid_input(format!(
                "invalid concurrency value {concurrency}: must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}"
            )));
        }
        let file_name = file_name_from_url(url)?;

        let head = self.client.head(url).await?;
        debug!(content_length = head.content_length, "content length resolved");

        let plan = DownloadPlan::split(head.content_length, concurrency, 0)?;
        debug!(ranges = plan.len(), concurrency, "plan ready");
        if let Some(observer) = &self.progress {
            observer.on_total(plan.total_len().unwrap_or(0));
        }

        let parts = self.fetch_parts(dir, url, &file_name, &plan).await?;

        let replaced = self.store.exists(&dir.join(&file_name)).await;
        let ordered: Vec<PathBuf> = parts.iter().map(|part| part.path.clone()).collect();
        let dest = self.store.merge_parts(&ordered, dir, &file_name).await?;

        self.remove_parts(&parts).await;

        info!(
            path = %dest.display(),
            bytes = head.content_length,
            parts = parts.len(),
            replaced,
            "download complete"
        );
        Ok(dest)
    }

    /// Runs one task per plan entry, waits for all of them, and returns the
    /// parts sorted by index, or the lowest-index failure.
    async fn fetch_parts(
        &self,
        dir: &Path,
        url: &str,
        file_name: &str,
        plan: &DownloadPlan,
    ) -> Result<Vec<FilePart>, DownloadError> {
        let handles: Vec<_> = plan
            .iter()
            .enumerate()
            .map(|(index, range)| {
                let task = PartTask {
                    index,
                    range: *range,
                    dir: dir.to_path_buf(),
                    url: url.to_string(),
                    file_name: file_name.to_string(),
                };
                let client = Arc::clone(&self.client);
                let store = Arc::clone(&self.store);
                let progress = self.progress.clone();
                tokio::spawn(async move { task.run(client, store, progress).await })
            })
            .collect();

        debug!(task_count = handles.len(), "waiting for part downloads");
        let outcomes = join_all(handles).await;

        let mut parts = Vec::with_capacity(outcomes.len());
        for (index, outcome) in outcomes.into_iter().enumerate() {
            match outcome {
                Ok(Ok(part)) => parts.push(part),
                Ok(Err(e)) => return Err(DownloadError::file_part(index, e)),
                Err(join_error) => {
                    return Err(DownloadError::file_part(
                        index,
                        DownloadError::task_aborted(index, join_error.to_string()),
                    ));
                }
            }
        }

        // Merge order is the numeric plan index, never the path's lexical order.
        parts.sort_by_key(|part| part.index);
        Ok(parts)
    }

    async fn remove_parts(&self, parts: &[FilePart]) {
        for part in parts {
            if let Err(e) = self.store.delete_if_exists(&part.path).await {
                warn!(
                    index = part.index,
                    path = %part.path.display(),
                    error = %e,
                    "failed to remove part file"
                );
            }
        }
    }
}

/// Everything one part task needs, moved into the spawned future.
#[derive(Debug)]
struct PartTask {
    index: usize,
    range: ByteRange,
    dir: PathBuf,
    url: String,
    file_name: String,
}

impl PartTask {
    #[instrument(
        level = "debug",
        skip_all,
        fields(index = self.index, range = %self.range)
    )]
    async fn run(
        self,
        client: Arc<dyn TransferClient>,
        store: Arc<dyn PartStore>,
        progress: Option<Arc<dyn ProgressObserver>>,
    ) -> Result<FilePart, DownloadError> {
        let part = FilePart::new(&self.dir, self.index, &self.file_name);

        if let Err(e) = store.delete_if_exists(&part.path).await {
            warn!(path = %part.path.display(), error = %e, "failed to remove stale part file");
        }
        let existing = store
            .ensure_file(&self.dir, &part_file_name(self.index, &self.file_name))
            .await?;
        if existing != 0 {
            return Err(DownloadError::io(
                &part.path,
                std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    format!("stale part file still holds {existing} bytes"),
                ),
            ));
        }

        let stream = client.get_range(&self.url, self.range).await?;
        let written = store
            .write_stream(observe(progress.as_ref(), stream), &part.path)
            .await?;

        if let Some(expected) = self.range.len()
            && written != expected
        {
            return Err(DownloadError::integrity(&part.path, expected, written));
        }

        debug!(bytes = written, "part complete");
        Ok(part)
    }
}

/// Reports every received chunk to `progress`, if any.
fn observe(progress: Option<&Arc<dyn ProgressObserver>>, stream: ByteStream) -> ByteStream {
    let Some(observer) = progress else {
        return stream;
    };
    let observer = Arc::clone(observer);
    stream
        .inspect(move |chunk| {
            if let Ok(bytes) = chunk {
                observer.on_bytes(bytes.len() as u64);
            }
        })
        .boxed()
}
