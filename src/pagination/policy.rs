//! Termination policy
//!
//! Two stopping rules, which may be combined:
//!
//! - **Count bound**: stop once `loaded >= target`, or once the aggregate
//!   holds the whole authoritative total.
//! - **Date bound**: for newest-first streams, stop once the oldest dated
//!   item of a freshly merged page predates the cutoff.

use super::types::{item_timestamp, Aggregate};
use crate::types::JsonValue;
use chrono::{DateTime, Utc};

/// Outcome of evaluating the policy after a merge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopResult {
    /// Keep paginating
    Continue,
    /// Item target or authoritative total reached
    TargetReached,
    /// The fresh page crossed the date cutoff; the aggregate must be pruned
    DateBoundary,
}

/// Result of inspecting a page against the date cutoff
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryCheck {
    /// No cutoff configured or the page is empty
    NotApplicable,
    /// Oldest dated item on the page is within range
    Within,
    /// Oldest dated item on the page predates the cutoff
    Crossed,
    /// No item on the page has a readable timestamp
    Unreadable,
}

/// Stopping rule for a collection run, fixed at construction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TerminationPolicy {
    count: Option<u64>,
    since: Option<DateTime<Utc>>,
}

impl TerminationPolicy {
    /// Policy bounded only by the authoritative total (if any)
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Stop after at least `target` items
    pub fn count(target: u64) -> Self {
        Self::unbounded().with_count(target)
    }

    /// Stop once items older than `cutoff` are reached
    pub fn since(cutoff: DateTime<Utc>) -> Self {
        Self::unbounded().with_since(cutoff)
    }

    /// Add an item target. A target of 0 means "no explicit target".
    #[must_use]
    pub fn with_count(mut self, target: u64) -> Self {
        self.count = (target > 0).then_some(target);
        self
    }

    /// Add a date cutoff
    #[must_use]
    pub fn with_since(mut self, cutoff: DateTime<Utc>) -> Self {
        self.since = Some(cutoff);
        self
    }

    /// Explicit item target
    pub fn target(&self) -> Option<u64> {
        self.count
    }

    /// Date cutoff
    pub fn cutoff(&self) -> Option<DateTime<Utc>> {
        self.since
    }

    /// Whether the count bound is satisfied
    pub fn count_reached(&self, aggregate: &Aggregate) -> bool {
        let loaded = aggregate.loaded_count;
        self.count.is_some_and(|target| loaded >= target)
            || aggregate.total_count.is_some_and(|total| loaded >= total)
    }

    /// Inspect a fresh page, newest first, against the cutoff.
    ///
    /// The page is judged by its oldest item with a readable `date`, so a
    /// malformed last item cannot hide a crossed boundary.
    pub fn check_boundary(&self, page_items: &[JsonValue]) -> BoundaryCheck {
        let Some(cutoff) = self.since else {
            return BoundaryCheck::NotApplicable;
        };
        if page_items.is_empty() {
            return BoundaryCheck::NotApplicable;
        }
        match page_items.iter().rev().find_map(item_timestamp) {
            Some(date) if date < cutoff => BoundaryCheck::Crossed,
            Some(_) => BoundaryCheck::Within,
            None => BoundaryCheck::Unreadable,
        }
    }

    /// Combine the boundary check of the fresh page with the count bound of
    /// the aggregate it was merged into
    pub fn evaluate(&self, boundary: BoundaryCheck, aggregate: &Aggregate) -> StopResult {
        if boundary == BoundaryCheck::Crossed {
            return StopResult::DateBoundary;
        }
        if self.count_reached(aggregate) {
            return StopResult::TargetReached;
        }
        StopResult::Continue
    }
}
