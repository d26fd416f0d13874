//! Range planning: split a resource into contiguous byte ranges.
//!
//! A [`DownloadPlan`] is the ordered list of [`ByteRange`]s for one download.
//! The index of a range in the plan is the identity of the task that fetches
//! it and the ordering key used when its part file is merged.
//!
//! # Remainder policy
//!
//! The remaining length is divided by the concurrency. Every worker gets
//! `remaining / concurrency` bytes; when the division leaves a remainder,
//! it becomes one extra trailing range instead of being folded into the last
//! fixed-size range. A plan therefore holds `concurrency` or
//! `concurrency + 1` ranges, and callers size their task set from
//! [`DownloadPlan::len`].
//!
//! ```
//! use rangeload_core::download::DownloadPlan;
//!
//! let plan = DownloadPlan::split(13, 2, 0).unwrap();
//! let headers: Vec<String> = plan.iter().map(|r| r.header_value()).collect();
//! assert_eq!(headers, ["bytes=0-5", "bytes=6-11", "bytes=12-12"]);
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use super::DownloadError;

/// One `Range: bytes=start-end` segment. `end` is inclusive; `None` means
/// "through the end of the resource".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ByteRange {
    start: u64,
    end: Option<u64>,
}

impl ByteRange {
    /// Creates the inclusive range `start..=end`.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `end < start`.
    #[must_use]
    pub fn bounded(start: u64, end: u64) -> Self {
        debug_assert!(end >= start, "byte range end {end} precedes start {start}");
        Self {
            start,
            end: Some(end),
        }
    }

    /// Creates an open-ended range starting at `start`.
    #[must_use]
    pub fn open(start: u64) -> Self {
        Self { start, end: None }
    }

    /// First byte offset of the range.
    #[must_use]
    pub fn start(&self) -> u64 {
        self.start
    }

    /// Last byte offset of the range (inclusive), if bounded.
    #[must_use]
    pub fn end(&self) -> Option<u64> {
        self.end
    }

    /// Number of bytes covered, if bounded.
    #[must_use]
    pub fn len(&self) -> Option<u64> {
        self.end.map(|end| end - self.start + 1)
    }

    /// Returns true for an open-ended range.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// Formats the value of the HTTP `Range` request header.
    #[must_use]
    pub fn header_value(&self) -> String {
        format!("bytes={self}")
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) => write!(f, "{}-{}", self.start, end),
            None => write!(f, "{}-", self.start),
        }
    }
}

/// Ordered, contiguous, non-overlapping ranges for one download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadPlan {
    ranges: Vec<ByteRange>,
}

impl DownloadPlan {
    /// Splits `[start_offset, content_length)` into ranges for `concurrency` workers.
    ///
    /// When fewer bytes remain than workers requested, each byte gets its own
    /// range so that no range is empty. When nothing remains (including a
    /// zero-length resource), the plan is a single open-ended range at
    /// `start_offset`, which fetches whatever the server still has.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::InvalidInput`] if `concurrency` is zero or
    /// `start_offset` lies beyond `content_length`.
    pub fn split(
        content_length: u64,
        concurrency: u64,
        start_offset: u64,
    ) -> Result<Self, DownloadError> {
        if concurrency == 0 {
            return Err(DownloadError::invalid_input(
                "concurrency must be at least 1",
            ));
        }
        if start_offset > content_length {
            return Err(DownloadError::invalid_input(format!(
                "start offset {start_offset} exceeds content length {content_length}"
            )));
        }

        let remaining = content_length - start_offset;
        if remaining == 0 {
            return Ok(Self::single_stream(start_offset));
        }

        let workers = concurrency.min(remaining);
        let chunk_size = remaining / workers;
        let remainder = remaining % workers;

        let mut ranges = Vec::with_capacity(usize::try_from(workers + 1).unwrap_or(0));
        for worker in 0..workers {
            let start = start_offset + worker * chunk_size;
            ranges.push(ByteRange::bounded(start, start + chunk_size - 1));
        }
        if remainder > 0 {
            let start = start_offset + workers * chunk_size;
            ranges.push(ByteRange::bounded(start, content_length - 1));
        }

        Ok(Self { ranges })
    }

    /// A one-range plan for a resumable single-stream download: only the
    /// start offset is known.
    #[must_use]
    pub fn single_stream(start_offset: u64) -> Self {
        Self {
            ranges: vec![ByteRange::open(start_offset)],
        }
    }

    /// The planned ranges in index order.
    #[must_use]
    pub fn ranges(&self) -> &[ByteRange] {
        &self.ranges
    }

    /// Iterates over the planned ranges in index order.
    pub fn iter(&self) -> std::slice::Iter<'_, ByteRange> {
        self.ranges.iter()
    }

    /// Number of ranges, which is the number of tasks to run.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Returns true if the plan has no ranges. Plans built by this module never are.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Total bytes covered, or `None` if any range is open-ended.
    #[must_use]
    pub fn total_len(&self) -> Option<u64> {
        self.ranges.iter().map(ByteRange::len).sum()
    }
}

impl<'a> IntoIterator for &'a DownloadPlan {
    type Item = &'a ByteRange;
    type IntoIter = std::slice::Iter<'a, ByteRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.iter()
    }
}

/// A part file holding the bytes of one planned range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    /// Plan index of the range; the merge ordering key.
    pub index: usize,
    /// Location of the part file.
    pub path: PathBuf,
}

impl FilePart {
    /// Builds the part for `index` of `file_name` inside `dir`: `<dir>/<index>-<file_name>`.
    #[must_use]
    pub fn new(dir: &Path, index: usize, file_name: &str) -> Self {
        Self {
            index,
            path: dir.join(part_file_name(index, file_name)),
        }
    }
}

/// File name of the part at `index`: `<index>-<file_name>`.
#[must_use]
pub fn part_file_name(index: usize, file_name: &str) -> String {
    format!("{index}-{file_name}")
}
