// src/progress.rs

//! Progress reporting for long-running conversions
//!
//! The converter reports through the `ProgressTracker` trait so the same
//! pipeline can drive a terminal progress bar, log lines, or nothing at
//! all. Implementations here:
//! - `SilentProgress`: no output
//! - `LogProgress`: logs to tracing, used when stderr is not a terminal
//!
//! The binary adds an indicatif-backed tracker for interactive runs.
//!
//! # Example
//!
//! ```
//! use next2expo::progress::{LogProgress, ProgressTracker};
//!
//! let files = ["pages/index.tsx", "components/Nav.tsx"];
//! let progress = LogProgress::new("Converting", files.len() as u64);
//! for file in files {
//!     progress.set_message(file);
//!     progress.increment(1);
//! }
//! progress.finish_with_message("done");
//! assert!(progress.is_finished());
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::{info, warn};

/// Core trait for progress tracking
pub trait ProgressTracker: Send + Sync {
    /// Set the current status message
    fn set_message(&self, message: &str);

    /// Increment progress by the given amount
    fn increment(&self, amount: u64);

    /// Set the total (length) of the progress
    fn set_length(&self, length: u64);

    fn position(&self) -> u64;

    fn length(&self) -> u64;

    /// Finish progress successfully with a message
    fn finish_with_message(&self, message: &str);

    /// Finish progress with an error message
    fn finish_with_error(&self, message: &str);

    fn is_finished(&self) -> bool;
}

/// Silent progress tracker (no-op)
#[derive(Debug, Default)]
pub struct SilentProgress {
    position: AtomicU64,
    length: AtomicU64,
    finished: AtomicBool,
}

impl SilentProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ProgressTracker for SilentProgress {
    fn set_message(&self, _message: &str) {}

    fn increment(&self, amount: u64) {
        self.position.fetch_add(amount, Ordering::Relaxed);
    }

    fn set_length(&self, length: u64) {
        self.length.store(length, Ordering::Relaxed);
    }

    fn position(&self) -> u64 {
        self.position.load(Ordering::Relaxed)
    }

    fn length(&self) -> u64 {
        self.length.load(Ordering::Relaxed)
    }

    fn finish_with_message(&self, _message: &str) {
        self.finished.store(true, Ordering::Relaxed);
    }

    fn finish_with_error(&self, _message: &str) {
        self.finished.store(true, Ordering::Relaxed);
    }

    fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Relaxed)
    }
}

/// Logging progress tracker
///
/// Messages and every `log_interval` increments go to tracing at info level.
/// Without an explicit interval, roughly ten lines are logged over the
/// current length, so a length set after construction is honored.
#[derive(Debug)]
pub struct LogProgress {
    name: String,
    position: AtomicU64,
    length: AtomicU64,
    finished: AtomicBool,
    log_interval: Option<u64>,
}

impl LogProgress {
    pub fn new(name: impl Into<String>, length: u64) -> Self {
        Self {
            name: name.into(),
            position: AtomicU64::new(0),
            length: AtomicU64::new(length),
            finished: AtomicBool::new(false),
            log_interval: None,
        }
    }

    pub fn with_log_interval(mut self, interval: u64) -> Self {
        self.log_interval = Some(interval);
        self
    }

    fn log_interval(&self, length: u64) -> u64 {
        self.log_interval.unwrap_or_else(|| std::cmp::max(1, length / 10))
    }
}

impl ProgressTracker for LogProgress {
    fn set_message(&self, message: &str) {
        info!("{}: {}", self.name, message);
    }

    fn increment(&self, amount: u64) {
        let old_pos = self.position.fetch_add(amount, Ordering::Relaxed);
        let new_pos = old_pos + amount;
        let length = self.length.load(Ordering::Relaxed);

        let interval = self.log_interval(length);
        if length > 0 && interval > 0 {
            let old_interval = old_pos / interval;
            let new_interval = new_pos / interval;
            if new_interval > old_interval {
                let percent = (new_pos * 100) / length;
                info!("{}: {}% ({}/{})", self.name, percent, new_pos, length);
            }
        }
    }

    fn set_length(&self, length: u64) {
        self.length.store(length, Ordering::Relaxed);
    }

    fn position(&self) -> u64 {
        self.position.load(Ordering::Relaxed)
    }

    fn length(&self) -> u64 {
        self.length.load(Ordering::Relaxed)
    }

    fn finish_with_message(&self, message: &str) {
        self.finished.store(true, Ordering::Relaxed);
        info!("{}: {}", self.name, message);
    }

    fn finish_with_error(&self, message: &str) {
        self.finished.store(true, Ordering::Relaxed);
        warn!("{}: {}", self.name, message);
    }

    fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silent_progress() {
        let progress = SilentProgress::new();
        progress.set_length(4);
        progress.increment(3);
        assert_eq!(progress.position(), 3);
        assert_eq!(progress.length(), 4);
        assert!(!progress.is_finished());
        progress.finish_with_message("done");
        assert!(progress.is_finished());
    }

    #[test]
    fn test_log_progress_tracks_position() {
        let progress = LogProgress::new("Converting", 20).with_log_interval(5);
        for _ in 0..7 {
            progress.increment(1);
        }
        assert_eq!(progress.position(), 7);
        progress.finish_with_message("ok");
        assert!(progress.is_finished());
    }

    #[test]
    fn test_log_interval_follows_late_length() {
        let progress = LogProgress::new("Converting", 0);
        assert_eq!(progress.log_interval(0), 1);
        progress.set_length(40);
        assert_eq!(progress.log_interval(progress.length()), 4);
        for _ in 0..40 {
            progress.increment(1);
        }
        assert_eq!(progress.position(), 40);

        let fixed = LogProgress::new("Converting", 40).with_log_interval(5);
        assert_eq!(fixed.log_interval(40), 5);
    }
}
