//! Progress display for multi-attempt solves

use crate::io::configuration::PROGRESS_BAR_WIDTH;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::LazyLock;
use std::sync::atomic::{AtomicUsize, Ordering};

static ATTEMPT_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template(&format!(
            "[{{elapsed_precise}}] Attempts: [{{bar:{PROGRESS_BAR_WIDTH}.cyan/blue}}] {{pos}}/{{len}} {{msg}}"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

/// Tracks finished attempts across worker threads
///
/// Attempts report from the rayon pool, so every method takes `&self`.
pub struct ProgressManager {
    bar: ProgressBar,
    succeeded: AtomicUsize,
    failed: AtomicUsize,
}

impl ProgressManager {
    /// Progress bar over `attempts` attempts
    pub fn new(attempts: usize) -> Self {
        let bar = ProgressBar::new(attempts as u64);
        bar.set_style(ATTEMPT_STYLE.clone());
        Self {
            bar,
            succeeded: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
        }
    }

    /// Manager that counts without drawing anything
    pub fn hidden(attempts: usize) -> Self {
        let bar = ProgressBar::hidden();
        bar.set_length(attempts as u64);
        Self {
            bar,
            succeeded: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
        }
    }

    /// Record one finished attempt
    pub fn complete_attempt(&self, succeeded: bool) {
        if succeeded {
            self.succeeded.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
        self.bar.set_message(self.summary());
        self.bar.inc(1);
    }

    /// Attempts reported so far
    pub fn completed(&self) -> usize {
        self.succeeded.load(Ordering::Relaxed) + self.failed.load(Ordering::Relaxed)
    }

    /// Successful attempts reported so far
    pub fn succeeded(&self) -> usize {
        self.succeeded.load(Ordering::Relaxed)
    }

    fn summary(&self) -> String {
        format!(
            "{} solved, {} failed",
            self.succeeded.load(Ordering::Relaxed),
            self.failed.load(Ordering::Relaxed)
        )
    }

    /// Clean up the display
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
