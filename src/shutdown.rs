//! Cooperative shutdown.
//!
//! A [`ShutdownSignal`] is checked by the collector between pages; an
//! in-flight call is never interrupted.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;

/// Shared flag requesting that collection stop between pages
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    requested: Arc<AtomicBool>,
}

impl ShutdownSignal {
    /// Create a new, unset signal
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown
    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    /// Whether shutdown has been requested
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Set the signal when the process receives Ctrl+C
    pub fn listen_for_ctrl_c(&self) -> tokio::task::JoinHandle<()> {
        let signal = self.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Shutdown requested, finishing current page");
                signal.request();
            }
        })
    }
}
