//! Progress reporting
//!
//! Observability side channel for collection runs. Sinks only observe; they
//! never influence when a run stops.

use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

/// Receives item-count deltas as pages are merged
pub trait ProgressSink: Send + Sync {
    /// `delta` items were added; `total` is the expected total, if known
    fn advance(&self, delta: u64, total: Option<u64>);
}

/// Discards all progress
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn advance(&self, _delta: u64, _total: Option<u64>) {}
}

/// Logs progress through `tracing`
#[derive(Debug)]
pub struct LogProgress {
    label: String,
    done: AtomicU64,
}

impl LogProgress {
    /// Create a sink that prefixes log lines with `label`
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            done: AtomicU64::new(0),
        }
    }

    /// Items reported so far
    pub fn done(&self) -> u64 {
        self.done.load(Ordering::Relaxed)
    }
}

impl ProgressSink for LogProgress {
    fn advance(&self, delta: u64, total: Option<u64>) {
        let done = self.done.fetch_add(delta, Ordering::Relaxed) + delta;
        match total {
            Some(total) if total > 0 => {
                let percent = (done.min(total) as f64 / total as f64) * 100.0;
                info!(
                    label = self.label.as_str(),
                    done,
                    total,
                    "{percent:.1}% collected"
                );
            }
            _ => info!(label = self.label.as_str(), done, "collected"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_progress_accumulates() {
        let sink = LogProgress::new("posts");
        sink.advance(100, Some(250));
        sink.advance(100, Some(250));
        sink.advance(0, None);
        assert_eq!(sink.done(), 200);
    }

    #[test]
    fn test_no_progress_is_silent() {
        NoProgress.advance(5, Some(5));
    }
}
