//! Error types for the download module.
//!
//! This module defines structured errors for every stage of a download:
//! input validation, transfer, part-file I/O, merging, and the fan-out
//! wrapper that identifies which part failed.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while planning, fetching, writing, or merging a download.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The caller supplied input the pipeline cannot work with (empty URL,
    /// URL without a file name, concurrency out of range, ...).
    #[error("{reason}")]
    InvalidInput {
        /// Human-readable description of what was wrong.
        reason: String,
    },

    /// Network-level error (DNS resolution, connection refused, TLS, broken body stream).
    #[error("network error requesting {url}: {source}")]
    Network {
        /// The URL being requested.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// Non-success HTTP response to a ranged GET.
    #[error("HTTP {status} requesting {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The server ignored a bounded `Range` header and sent the full body.
    #[error("server ignored range {range} for {url}")]
    RangeIgnored {
        /// The URL being requested.
        url: String,
        /// The `Range` header value that was sent.
        range: String,
    },

    /// File system error (create, stat, open, write, remove).
    #[error("IO error on {path}: {source}")]
    Io {
        /// The file path where the error occurred.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A part file holds a different number of bytes than its range covers.
    #[error(
        "integrity check failed for {path}: expected {expected_bytes} bytes, got {actual_bytes}"
    )]
    Integrity {
        /// The part file that failed verification.
        path: PathBuf,
        /// Bytes the planned range covers.
        expected_bytes: u64,
        /// Bytes actually written.
        actual_bytes: u64,
    },

    /// Failure while concatenating part files into the destination.
    #[error("unable to merge parts into {path}: {source}")]
    Merge {
        /// The file (destination or part) involved when the merge failed.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// A concurrent part task failed; wraps the task's own error.
    #[error("unable to download filepart: {source}")]
    FilePart {
        /// Plan index of the failed part.
        index: usize,
        /// The error the part task reported.
        #[source]
        source: Box<DownloadError>,
    },

    /// A part task ended without reporting (panicked or was cancelled).
    #[error("download task {index} aborted: {reason}")]
    TaskAborted {
        /// Plan index of the aborted task.
        index: usize,
        /// Description of the join failure.
        reason: String,
    },
}

impl DownloadError {
    /// Creates an invalid-input error.
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Creates a network error from a reqwest error.
    pub fn network(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Network {
            url: url.into(),
            source,
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a range-ignored error.
    pub fn range_ignored(url: impl Into<String>, range: impl Into<String>) -> Self {
        Self::RangeIgnored {
            url: url.into(),
            range: range.into(),
        }
    }

    /// Creates an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Creates an integrity mismatch error.
    pub fn integrity(path: impl Into<PathBuf>, expected_bytes: u64, actual_bytes: u64) -> Self {
        Self::Integrity {
            path: path.into(),
            expected_bytes,
            actual_bytes,
        }
    }

    /// Creates a merge error.
    pub fn merge(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Merge {
            path: path.into(),
            source,
        }
    }

    /// Wraps the error reported by the part task at `index`.
    #[must_use]
    pub fn file_part(index: usize, source: DownloadError) -> Self {
        Self::FilePart {
            index,
            source: Box::new(source),
        }
    }

    /// Creates a task-aborted error.
    pub fn task_aborted(index: usize, reason: impl Into<String>) -> Self {
        Self::TaskAborted {
            index,
            reason: reason.into(),
        }
    }
}

// Variants carry the url/path context that `reqwest::Error` and `io::Error`
// lack, so there are no `From` impls; use the constructors above.
