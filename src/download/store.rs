//! Part store: the filesystem side of a download.
//!
//! The orchestrator never touches the filesystem directly. It asks a
//! [`PartStore`] to prepare files, append response streams to them, merge
//! part files into the destination, and remove leftovers.
//! [`LocalPartStore`] implements this on top of `tokio::fs`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, instrument};

use super::client::ByteStream;
use super::constants::WRITE_BUFFER_SIZE;
use super::error::DownloadError;

/// Filesystem operations needed by the download pipeline.
///
/// This trait uses `async_trait` so the orchestrator can hold it as
/// `Arc<dyn PartStore>` and share it across spawned part tasks.
#[async_trait]
pub trait PartStore: Send + Sync {
    /// Creates `dir` (recursively) and an empty `dir/name` if absent.
    ///
    /// Returns the current size of the file, which is 0 for a new file and
    /// the resume offset for an existing one.
    async fn ensure_file(&self, dir: &Path, name: &str) -> Result<u64, DownloadError>;

    /// Removes `path` if it exists. A missing file is not an error.
    ///
    /// Callers treat a returned error as non-fatal and only log it.
    async fn delete_if_exists(&self, path: &Path) -> Result<(), DownloadError>;

    /// Appends every chunk of `stream` to `path` until the stream ends.
    ///
    /// Returns the number of bytes written. The first read or write error
    /// aborts the rest of the stream.
    async fn write_stream(&self, stream: ByteStream, path: &Path) -> Result<u64, DownloadError>;

    /// Concatenates `ordered_parts`, in the order given, into `dest_dir/dest_name`.
    ///
    /// The caller is responsible for passing parts in plan-index order.
    /// Returns the destination path.
    async fn merge_parts(
        &self,
        ordered_parts: &[PathBuf],
        dest_dir: &Path,
        dest_name: &str,
    ) -> Result<PathBuf, DownloadError>;

    /// Returns true if `path` exists.
    async fn exists(&self, path: &Path) -> bool;
}

/// [`PartStore`] backed by the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalPartStore;

impl LocalPartStore {
    /// Creates a new local part store.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PartStore for LocalPartStore {
    #[instrument(level = "debug", skip(self, dir), fields(dir = %dir.display()))]
    async fn ensure_file(&self, dir: &Path, name: &str) -> Result<u64, DownloadError> {
        fs::create_dir_all(dir)
            .await
            .map_err(|e| DownloadError::io(dir, e))?;

        let path = dir.join(name);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| DownloadError::io(&path, e))?;
        let size = file
            .metadata()
            .await
            .map_err(|e| DownloadError::io(&path, e))?
            .len();

        debug!(path = %path.display(), size, "file ready");
        Ok(size)
    }

    async fn delete_if_exists(&self, path: &Path) -> Result<(), DownloadError> {
        match fs::remove_file(path).await {
            Ok(()) => {
                debug!(path = %path.display(), "removed file");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DownloadError::io(path, e)),
        }
    }

    #[instrument(level = "debug", skip_all, fields(path = %path.display()))]
    async fn write_stream(
        &self,
        mut stream: ByteStream,
        path: &Path,
    ) -> Result<u64, DownloadError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .map_err(|e| DownloadError::io(path, e))?;
        let mut writer = BufWriter::with_capacity(WRITE_BUFFER_SIZE, file);
        let mut bytes_written: u64 = 0;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            writer
                .write_all(&chunk)
                .await
                .map_err(|e| DownloadError::io(path, e))?;
            bytes_written += chunk.len() as u64;
        }

        writer
            .flush()
            .await
            .map_err(|e| DownloadError::io(path, e))?;

        debug!(bytes = bytes_written, "stream written");
        Ok(bytes_written)
    }

    #[instrument(level = "debug", skip(self, ordered_parts), fields(parts = ordered_parts.len()))]
    async fn merge_parts(
        &self,
        ordered_parts: &[PathBuf],
        dest_dir: &Path,
        dest_name: &str,
    ) -> Result<PathBuf, DownloadError> {
        fs::create_dir_all(dest_dir)
            .await
            .map_err(|e| DownloadError::merge(dest_dir, e))?;

        // Concurrent downloads never resume, so start from an empty destination.
        let dest = dest_dir.join(dest_name);
        let file = File::create(&dest)
            .await
            .map_err(|e| DownloadError::merge(&dest, e))?;
        let mut writer = BufWriter::with_capacity(WRITE_BUFFER_SIZE, file);
        let mut total: u64 = 0;

        for part in ordered_parts {
            let mut reader = File::open(part)
                .await
                .map_err(|e| DownloadError::merge(part, e))?;
            let copied = tokio::io::copy(&mut reader, &mut writer)
                .await
                .map_err(|e| DownloadError::merge(part, e))?;
            debug!(part = %part.display(), bytes = copied, "appended part");
            total += copied;
        }

        writer
            .flush()
            .await
            .map_err(|e| DownloadError::merge(&dest, e))?;

        debug!(dest = %dest.display(), bytes = total, "merge complete");
        Ok(dest)
    }

    async fn exists(&self, path: &Path) -> bool {
        fs::try_exists(path).await.unwrap_or(false)
    }
}
