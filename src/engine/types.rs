//! Engine types
//!
//! Run states, stop reasons and the result handed back by a collector.

use crate::error::{Error, Result};
use crate::pagination::Aggregate;
use crate::resource::ResourceKind;
use crate::store::Store;
use crate::types::JsonValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// State of a collector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// Identity not yet resolved, total not yet probed
    Init,
    /// Fetching pages
    Running,
    /// Stopped on a termination condition
    Done,
    /// Stopped early on an error or cancellation; data so far is kept
    Partial,
    /// Configuration error before any call; carries no data
    Failed,
}

impl RunState {
    /// Whether no further steps will change the collector
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Partial | Self::Failed)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::Running => "running",
            Self::Done => "done",
            Self::Partial => "partial",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Why a run reached its terminal state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Item target or authoritative total reached
    TargetReached,
    /// Date cutoff crossed; aggregate pruned to the cutoff
    DateBoundary,
    /// A page added no items
    Exhausted,
    /// The remote API returned an error object
    RemoteError,
    /// The transport or response decoding failed
    TransportError,
    /// The caller stopped the run between pages
    Cancelled,
    /// Missing or ambiguous configuration
    InvalidConfiguration,
}

/// Tunables for a collector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectorConfig {
    /// Consecutive zero-growth pages that end the run
    pub stall_limit: u32,
    /// Override the kind's default page size
    pub page_size: Option<u64>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            stall_limit: 1,
            page_size: None,
        }
    }
}

impl CollectorConfig {
    /// Create a new collector config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the stall limit (minimum 1)
    #[must_use]
    pub fn with_stall_limit(mut self, limit: u32) -> Self {
        self.stall_limit = limit.max(1);
        self
    }

    /// Set the page size
    #[must_use]
    pub fn with_page_size(mut self, size: u64) -> Self {
        self.page_size = Some(size);
        self
    }
}

/// Statistics from a collection run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionStats {
    /// Calls issued, probes included
    pub calls: usize,
    /// Pages merged
    pub pages: usize,
    /// Zero-growth pages seen
    pub stalls: usize,
    /// Records skipped for lacking a usable timestamp
    pub malformed_records: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

/// Result of a collection run
#[derive(Debug)]
pub struct Collection {
    /// Resource kind collected
    pub kind: ResourceKind,
    /// Terminal state reached
    pub state: RunState,
    /// Why the run stopped
    pub stop_reason: StopReason,
    /// Everything collected
    pub aggregate: Aggregate,
    /// Error that ended a partial run
    pub error: Option<Error>,
    /// Run statistics
    pub stats: CollectionStats,
}

impl Collection {
    /// Whether the run ended on a termination condition
    pub fn is_complete(&self) -> bool {
        self.state == RunState::Done
    }

    /// Take the aggregate
    pub fn into_aggregate(self) -> Aggregate {
        self.aggregate
    }

    /// JSON record of the run: state, stop reason, error and data
    pub fn to_record(&self) -> Result<JsonValue> {
        Ok(serde_json::json!({
            "kind": self.kind,
            "state": self.state,
            "stop_reason": self.stop_reason,
            "error": self.error.as_ref().map(ToString::to_string),
            "stats": self.stats,
            "data": self.aggregate.to_json()?,
        }))
    }

    /// Persist the run record under `key`
    pub async fn save(&self, store: &dyn Store, key: &str) -> Result<()> {
        store.save(key, &self.to_record()?).await
    }
}
