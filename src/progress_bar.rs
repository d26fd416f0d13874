//! Progress UI (byte bar) for download runs.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use rangeload_core::ProgressObserver;

const BAR_TEMPLATE: &str =
    "{spinner} [{elapsed_precise}] [{wide_bar}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";
const SPINNER_TEMPLATE: &str = "{spinner} [{elapsed_precise}] {bytes} ({bytes_per_sec})";

/// Draws transfer progress on stderr.
///
/// Starts as a spinner and switches to a bar once the downloader reports a
/// non-zero total.
#[derive(Debug)]
pub(crate) struct TransferProgress {
    bar: ProgressBar,
}

impl TransferProgress {
    /// Creates the progress display; a hidden one when `visible` is false.
    pub(crate) fn new(visible: bool) -> Self {
        let bar = ProgressBar::new_spinner();
        if visible {
            bar.set_style(
                ProgressStyle::with_template(SPINNER_TEMPLATE)
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            bar.enable_steady_tick(Duration::from_millis(100));
        } else {
            bar.set_draw_target(ProgressDrawTarget::hidden());
        }
        Self { bar }
    }

    /// Removes the bar so the result lines print on a clean terminal.
    pub(crate) fn finish(&self) {
        self.bar.finish_and_clear();
    }

    #[cfg(test)]
    fn position(&self) -> u64 {
        self.bar.position()
    }

    #[cfg(test)]
    fn length(&self) -> Option<u64> {
        self.bar.length()
    }
}

impl ProgressObserver for TransferProgress {
    fn on_total(&self, total_bytes: u64) {
        if total_bytes == 0 {
            return;
        }
        self.bar.set_length(total_bytes);
        self.bar.set_style(
            ProgressStyle::with_template(BAR_TEMPLATE)
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
    }

    fn on_bytes(&self, bytes: u64) {
        self.bar.inc(bytes);
    }
}
