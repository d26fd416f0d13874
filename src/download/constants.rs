//! Constants for the download module (timeouts, buffers, concurrency bounds).

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Buffer size used when appending a response stream to a part file (64 KiB).
pub const WRITE_BUFFER_SIZE: usize = 64 * 1024;

/// Minimum allowed concurrency value.
pub const MIN_CONCURRENCY: u64 = 1;

/// Maximum allowed concurrency value.
pub const MAX_CONCURRENCY: u64 = 100;

/// Default number of concurrent range requests.
pub const DEFAULT_CONCURRENCY: u64 = 4;
