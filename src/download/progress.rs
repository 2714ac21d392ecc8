//! Byte progress bar for a single transfer.

use indicatif::{ProgressBar, ProgressStyle};

/// Progress indicator keyed by bytes transferred out of the expected total.
///
/// The bar is hidden when display is disabled or when the expected total is
/// unknown or zero; updates still succeed so strategies never branch on it.
#[derive(Debug, Clone)]
pub struct TransferProgress {
    bar: ProgressBar,
}

impl TransferProgress {
    /// Creates a progress bar for `display_name`.
    #[must_use]
    pub fn new(display_name: &str, expected_total: Option<u64>, enabled: bool) -> Self {
        let total = expected_total.unwrap_or(0);
        if !enabled || total == 0 {
            return Self::hidden();
        }

        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::with_template(
                "{msg} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
        );
        bar.set_message(display_name.to_string());
        Self { bar }
    }

    /// Creates a progress indicator that draws nothing.
    #[must_use]
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    /// Records `bytes` more bytes transferred.
    pub fn advance(&self, bytes: u64) {
        self.bar.inc(bytes);
    }

    /// Returns the bytes recorded so far.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    /// Returns true when the bar draws nothing.
    #[must_use]
    pub fn is_hidden(&self) -> bool {
        self.bar.is_hidden()
    }

    /// Clears the bar after a transfer ends (success or failure).
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
