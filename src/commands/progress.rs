// src/commands/progress.rs
//! Terminal progress bar for conversions
//!
//! Bridges the library's `ProgressTracker` trait to an indicatif bar with a
//! status line showing the file being converted.

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use next2expo::progress::ProgressTracker;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Overall bar plus a spinner status line
pub struct CliProgress {
    _multi: MultiProgress,
    overall: ProgressBar,
    status: ProgressBar,
    finished: AtomicBool,
}

impl CliProgress {
    pub fn new(operation: &str) -> Self {
        let multi = MultiProgress::new();

        let overall = ProgressBar::new(0);
        overall.set_style(
            ProgressStyle::default_bar()
                .template("{prefix} ({pos}/{len}) [{bar:40.green/dim}] {percent}% {msg}")
                .expect("Invalid progress bar template")
                .progress_chars("##-"),
        );
        overall.set_prefix(operation.to_string());

        let status = ProgressBar::new_spinner();
        status.set_style(
            ProgressStyle::default_spinner()
                .template("  {spinner:.cyan} {msg}")
                .expect("Invalid spinner template"),
        );
        status.enable_steady_tick(Duration::from_millis(100));

        let overall = multi.add(overall);
        let status = multi.add(status);

        Self {
            _multi: multi,
            overall,
            status,
            finished: AtomicBool::new(false),
        }
    }
}

impl ProgressTracker for CliProgress {
    fn set_message(&self, message: &str) {
        self.status.set_message(message.to_string());
    }

    fn increment(&self, amount: u64) {
        self.overall.inc(amount);
    }

    fn set_length(&self, length: u64) {
        self.overall.set_length(length);
    }

    fn position(&self) -> u64 {
        self.overall.position()
    }

    fn length(&self) -> u64 {
        self.overall.length().unwrap_or(0)
    }

    fn finish_with_message(&self, message: &str) {
        self.finished.store(true, Ordering::Relaxed);
        self.status.finish_and_clear();
        self.overall.finish_with_message(message.to_string());
    }

    fn finish_with_error(&self, message: &str) {
        self.finished.store(true, Ordering::Relaxed);
        self.status.finish_and_clear();
        self.overall.abandon_with_message(message.to_string());
    }

    fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Relaxed)
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        if !self.is_finished() {
            self.status.finish_and_clear();
            self.overall.finish_and_clear();
        }
    }
}
