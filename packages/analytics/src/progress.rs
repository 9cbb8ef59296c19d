//! Progress reporting for registry enumeration and bulk loads.
//!
//! Library code reports through [`ProgressCallback`] and never draws
//! anything itself. The terminal spinners live in `crime_rate_cli_utils`;
//! [`LogProgress`] reports milestones through `log` instead.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Receives progress updates from a long-running operation.
pub trait ProgressCallback: Send + Sync {
    /// Announces how many units the operation will process.
    fn set_total(&self, total: u64);

    /// Records `delta` more units as done.
    fn inc(&self, delta: u64);

    /// Describes the current phase.
    fn set_message(&self, msg: String);

    /// Ends the operation, leaving `msg` behind.
    fn finish(&self, msg: String);

    /// Ends the operation without leaving a trace.
    fn finish_and_clear(&self);
}

/// Ignores every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
    fn finish_and_clear(&self) {}
}

/// Returns a shared [`NullProgress`].
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}

/// Logs phase changes at `info` and a running count at `debug` every
/// `every` units.
pub struct LogProgress {
    label: String,
    every: u64,
    done: AtomicU64,
}

impl LogProgress {
    /// Creates a logger-backed progress reporter.
    #[must_use]
    pub fn new(label: impl Into<String>, every: u64) -> Arc<dyn ProgressCallback> {
        Arc::new(Self {
            label: label.into(),
            every: every.max(1),
            done: AtomicU64::new(0),
        })
    }
}

impl ProgressCallback for LogProgress {
    fn set_total(&self, total: u64) {
        self.done.store(0, Ordering::Relaxed);
        log::debug!("{}: {total} to process", self.label);
    }

    fn inc(&self, delta: u64) {
        let before = self.done.fetch_add(delta, Ordering::Relaxed);
        let after = before + delta;
        if after / self.every > before / self.every {
            log::debug!("{}: {after} processed", self.label);
        }
    }

    fn set_message(&self, msg: String) {
        log::info!("{}: {msg}", self.label);
    }

    fn finish(&self, msg: String) {
        log::info!("{}: {msg}", self.label);
    }

    fn finish_and_clear(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_progress_counts_units() {
        let progress = LogProgress {
            label: "test".to_string(),
            every: 10,
            done: AtomicU64::new(0),
        };
        progress.set_total(25);
        progress.inc(7);
        progress.inc(7);
        assert_eq!(progress.done.load(Ordering::Relaxed), 14);
        progress.set_total(3);
        assert_eq!(progress.done.load(Ordering::Relaxed), 0);
    }
}
