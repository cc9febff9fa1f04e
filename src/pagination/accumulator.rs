//! Page accumulation
//!
//! The [`Accumulator`] owns the growing [`Aggregate`] for a single run.

use super::types::{item_timestamp, Aggregate, Page};
use chrono::{DateTime, Utc};
use tracing::warn;

/// Owns the aggregate of one run and merges pages into it
#[derive(Debug, Clone)]
pub struct Accumulator {
    aggregate: Aggregate,
    /// Whether page counts are authoritative totals for this resource
    track_total: bool,
    consecutive_stalls: u32,
}

impl Accumulator {
    /// Create an accumulator.
    ///
    /// `side_lists` enables `profiles`/`groups` collection; `track_total`
    /// makes each page's `count` overwrite the aggregate total.
    pub fn new(side_lists: bool, track_total: bool) -> Self {
        Self {
            aggregate: Aggregate::new(side_lists),
            track_total,
            consecutive_stalls: 0,
        }
    }

    /// Seed the total before the first page (from an amount probe)
    pub fn seed_total(&mut self, total: u64) {
        self.aggregate.total_count = Some(total);
    }

    /// Merge a page and return how many items it added
    pub fn merge(&mut self, page: Page) -> usize {
        let Page {
            count,
            items,
            profiles,
            groups,
        } = page;

        if self.track_total {
            if let Some(count) = count {
                self.aggregate.total_count = Some(count);
            }
        }

        let before = self.aggregate.items.len();
        self.aggregate.items.extend(items);

        if let Some(side) = self.aggregate.profiles.as_mut() {
            side.extend(profiles.unwrap_or_default());
        }
        if let Some(side) = self.aggregate.groups.as_mut() {
            side.extend(groups.unwrap_or_default());
        }

        self.aggregate.sync_loaded_count();
        let growth = self.aggregate.items.len() - before;

        if growth == 0 {
            self.consecutive_stalls += 1;
        } else {
            self.consecutive_stalls = 0;
        }
        growth
    }

    /// Number of zero-growth merges in a row
    pub fn consecutive_stalls(&self) -> u32 {
        self.consecutive_stalls
    }

    /// Drop every item older than `cutoff`.
    ///
    /// Items without a readable timestamp are dropped too. Returns how many
    /// of those malformed records were skipped.
    pub fn prune_before(&mut self, cutoff: DateTime<Utc>) -> usize {
        let mut malformed = 0;
        self.aggregate.items.retain(|item| match item_timestamp(item) {
            Some(date) => date >= cutoff,
            None => {
                warn!(record = %item, "Skipping record without a valid date");
                malformed += 1;
                false
            }
        });
        self.aggregate.sync_loaded_count();
        malformed
    }

    /// Borrow the aggregate collected so far
    pub fn aggregate(&self) -> &Aggregate {
        &self.aggregate
    }

    /// Number of items collected so far
    pub fn loaded_count(&self) -> u64 {
        self.aggregate.loaded_count
    }

    /// Hand the aggregate over to the caller
    pub fn into_aggregate(self) -> Aggregate {
        self.aggregate
    }
}
