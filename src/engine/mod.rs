//! Collection engine module
//!
//! Drives one paginated collection from start to a terminal state.
//!
//! # Overview
//!
//! The engine module provides:
//! - `Collector` - resumable state machine `Init -> Running -> {Done, Partial, Failed}`
//! - `CollectorConfig` - stall limit and page size tunables
//! - `Collection` - terminal state, stop reason, aggregate and stats

mod types;

pub use types::{Collection, CollectionStats, CollectorConfig, RunState, StopReason};

use crate::error::{Error, Result};
use crate::fetch::{PageFetcher, PageRequest, RESERVED_PARAMS};
use crate::pagination::{item_timestamp, Accumulator, Aggregate, StopResult, TerminationPolicy};
use crate::progress::{NoProgress, ProgressSink};
use crate::resource::{ResourceConfig, ResourceKind, Target, TotalSource};
use crate::shutdown::ShutdownSignal;
use crate::types::{JsonValue, ParamValue, Params};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Collects one resource into an [`Aggregate`]
pub struct Collector {
    fetcher: PageFetcher,
    resource: ResourceConfig,
    target: Target,
    policy: TerminationPolicy,
    overrides: Params,
    extended: bool,
    config: CollectorConfig,
    progress: Arc<dyn ProgressSink>,

    identity: Params,
    accumulator: Accumulator,
    offset: u64,
    state: RunState,
    stop_reason: Option<StopReason>,
    error: Option<Error>,
    stats: CollectionStats,
    started: Option<Instant>,
}

impl Collector {
    /// Create a collector for `kind` identified by `target`
    pub fn new(fetcher: PageFetcher, kind: ResourceKind, target: Target) -> Self {
        let resource = kind.config();
        let extended = resource.extended_default;
        Self {
            fetcher,
            accumulator: Accumulator::new(extended && resource.side_lists, resource.tracks_total()),
            resource,
            target,
            policy: TerminationPolicy::unbounded(),
            overrides: Params::new(),
            extended,
            config: CollectorConfig::default(),
            progress: Arc::new(NoProgress),
            identity: Params::new(),
            offset: 0,
            state: RunState::Init,
            stop_reason: None,
            error: None,
            stats: CollectionStats::default(),
            started: None,
        }
    }

    /// Set the termination policy
    #[must_use]
    pub fn with_policy(mut self, policy: TerminationPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Stop after at least `target` items (0 means no explicit target)
    #[must_use]
    pub fn with_count(mut self, target: u64) -> Self {
        self.policy = self.policy.with_count(target);
        self
    }

    /// Stop at items older than `cutoff` (posts only)
    #[must_use]
    pub fn with_since(mut self, cutoff: DateTime<Utc>) -> Self {
        self.policy = self.policy.with_since(cutoff);
        self
    }

    /// Request or suppress extended mode
    #[must_use]
    pub fn with_extended(mut self, extended: bool) -> Self {
        self.extended = extended;
        self
    }

    /// Add a caller parameter override
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.overrides.insert(key.into(), value.into());
        self
    }

    /// Add several caller parameter overrides
    #[must_use]
    pub fn with_params(mut self, params: Params) -> Self {
        self.overrides.extend(params);
        self
    }

    /// Set the progress sink
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    /// Set collector configuration
    #[must_use]
    pub fn with_config(mut self, config: CollectorConfig) -> Self {
        self.config = config;
        self
    }

    /// Current state
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Resource kind being collected
    pub fn kind(&self) -> ResourceKind {
        self.resource.kind
    }

    /// Aggregate collected so far
    pub fn aggregate(&self) -> &Aggregate {
        self.accumulator.aggregate()
    }

    /// Offset of the next page request
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Statistics so far
    pub fn stats(&self) -> &CollectionStats {
        &self.stats
    }

    /// Advance the state machine by one transition.
    ///
    /// `Init` resolves identity and probes the total; `Running` fetches and
    /// merges one page. Terminal states are left unchanged. Returns `Err`
    /// only for configuration errors, which leave the collector `Failed`.
    pub async fn step(&mut self) -> Result<RunState> {
        match self.state {
            RunState::Init => self.init().await?,
            RunState::Running => self.fetch_next().await,
            RunState::Done | RunState::Partial | RunState::Failed => {}
        }
        Ok(self.state)
    }

    /// Drive the collector to a terminal state
    pub async fn run(mut self) -> Result<Collection> {
        while !self.state.is_terminal() {
            self.step().await?;
        }
        Ok(self.finish())
    }

    /// Drive the collector, stopping between pages once `signal` is set
    pub async fn run_until_shutdown(mut self, signal: &ShutdownSignal) -> Result<Collection> {
        while !self.state.is_terminal() {
            if signal.is_requested() {
                return Ok(self.cancel());
            }
            self.step().await?;
        }
        Ok(self.finish())
    }

    /// Stop between pages, keeping everything merged so far
    pub fn cancel(mut self) -> Collection {
        if !self.state.is_terminal() {
            self.apply_cutoff();
            info!(kind = %self.resource.kind, loaded = self.accumulator.loaded_count(), "Collection cancelled");
            self.state = RunState::Partial;
            self.stop_reason = Some(StopReason::Cancelled);
        }
        self.finish()
    }

    /// Hand the result over. A collector that has not reached a terminal
    /// state is reported as cancelled.
    pub fn finish(mut self) -> Collection {
        if !self.state.is_terminal() {
            return self.cancel();
        }
        if let Some(started) = self.started {
            self.stats.duration_ms = started.elapsed().as_millis() as u64;
        }
        Collection {
            kind: self.resource.kind,
            state: self.state,
            stop_reason: self.stop_reason.unwrap_or(StopReason::InvalidConfiguration),
            aggregate: self.accumulator.into_aggregate(),
            error: self.error,
            stats: self.stats,
        }
    }

    // ========================================================================
    // Init
    // ========================================================================

    async fn init(&mut self) -> Result<()> {
        self.started = Some(Instant::now());
        let identity = match self.validate() {
            Ok(identity) => identity,
            Err(e) => {
                warn!(kind = %self.resource.kind, error = %e, "Invalid collection configuration");
                self.state = RunState::Failed;
                self.stop_reason = Some(StopReason::InvalidConfiguration);
                return Err(e);
            }
        };
        self.identity = identity;
        self.accumulator = Accumulator::new(
            self.extended && self.resource.side_lists,
            self.resource.tracks_total(),
        );

        info!(
            kind = %self.resource.kind,
            target = ?self.policy.target(),
            since = ?self.policy.cutoff(),
            "Starting collection"
        );

        match self.probe_total().await {
            Ok(Some(total)) => {
                debug!(kind = %self.resource.kind, total, "Probed total");
                self.accumulator.seed_total(total);
            }
            Ok(None) => {}
            Err(e) => {
                self.finish_partial(e);
                return Ok(());
            }
        }

        if self.policy.count_reached(self.accumulator.aggregate()) {
            self.finish_done(StopReason::TargetReached);
        } else {
            self.state = RunState::Running;
        }
        Ok(())
    }

    fn validate(&self) -> Result<Params> {
        let kind = self.resource.kind;
        let identity = self.target.resolve(kind)?;

        if self.policy.cutoff().is_some() && !self.resource.date_ordered {
            return Err(Error::config(format!(
                "date cutoff is only supported for posts, not {kind}"
            )));
        }
        if self.config.page_size == Some(0) {
            return Err(Error::config("page size must be positive"));
        }
        if let Some(key) = self
            .overrides
            .keys()
            .find(|key| RESERVED_PARAMS.contains(&key.as_str()))
        {
            return Err(Error::config(format!(
                "parameter '{key}' is managed by the collector and cannot be overridden"
            )));
        }
        Ok(identity)
    }

    async fn probe_total(&mut self) -> Result<Option<u64>> {
        match self.resource.total_source {
            TotalSource::None => Ok(None),
            TotalSource::AmountProbe => {
                let mut params = self.identity.clone();
                params.insert("count".into(), 1_u64.into());
                self.stats.calls += 1;
                let page = self
                    .fetcher
                    .fetch_page(self.resource.method, &params, &Params::new())
                    .await?;
                if page.is_empty() {
                    return Ok(Some(page.count.unwrap_or(0)));
                }
                Ok(page.count)
            }
            TotalSource::GroupMembersCount => {
                let mut params = Params::new();
                if let Some(group_id) = self.identity.get("group_id") {
                    params.insert("group_id".into(), group_id.clone());
                }
                params.insert("fields".into(), "members_count".into());
                self.stats.calls += 1;
                let value = self
                    .fetcher
                    .fetch_value("groups.getById", &params, &Params::new())
                    .await?;
                first_record_count(&value, "groups", "members_count").map(Some)
            }
            TotalSource::UserFollowersCount => {
                let mut params = Params::new();
                if let Some(user_id) = self.identity.get("user_id") {
                    params.insert("user_ids".into(), user_id.clone());
                }
                params.insert("fields".into(), "followers_count".into());
                self.stats.calls += 1;
                let value = self
                    .fetcher
                    .fetch_value("users.get", &params, &Params::new())
                    .await?;
                first_record_count(&value, "users", "followers_count").map(Some)
            }
        }
    }

    // ========================================================================
    // Running
    // ========================================================================

    async fn fetch_next(&mut self) {
        let page_size = self.config.page_size.unwrap_or(self.resource.page_size);
        let defaults = PageRequest {
            config: &self.resource,
            offset: self.offset,
            page_size,
            extended: self.extended,
            identity: &self.identity,
        }
        .to_params();

        self.stats.calls += 1;
        let page = match self
            .fetcher
            .fetch_page(self.resource.method, &defaults, &self.overrides)
            .await
        {
            Ok(page) => page,
            Err(e) => {
                self.finish_partial(e);
                return;
            }
        };

        self.stats.pages += 1;
        let boundary = self.policy.check_boundary(&page.items);
        if self.policy.cutoff().is_some()
            && page.last_item().is_some_and(|item| item_timestamp(item).is_none())
        {
            warn!(
                kind = %self.resource.kind,
                offset = self.offset,
                boundary = ?boundary,
                "Last item of page has no date; checking cutoff against the oldest dated item"
            );
        }
        let growth = self.accumulator.merge(page) as u64;
        self.progress.advance(growth, self.expected_total());
        self.offset += page_size;

        let aggregate = self.accumulator.aggregate();
        debug!(
            kind = %self.resource.kind,
            growth,
            loaded = aggregate.loaded_count,
            total = ?aggregate.total_count,
            next_offset = self.offset,
            "Merged page"
        );
        if growth == 0 {
            self.stats.stalls += 1;
        }

        match self.policy.evaluate(boundary, aggregate) {
            StopResult::DateBoundary => self.finish_done(StopReason::DateBoundary),
            StopResult::TargetReached => self.finish_done(StopReason::TargetReached),
            StopResult::Continue => {
                if self.accumulator.consecutive_stalls() >= self.config.stall_limit {
                    self.finish_done(StopReason::Exhausted);
                }
            }
        }
    }

    fn expected_total(&self) -> Option<u64> {
        let total = self.accumulator.aggregate().total_count;
        match (self.policy.target(), total) {
            (Some(target), Some(total)) => Some(target.min(total)),
            (target, total) => target.or(total),
        }
    }

    /// Drop everything older than the cutoff, and every record without a
    /// readable date. Runs once, on the transition to a terminal state.
    fn apply_cutoff(&mut self) {
        if let Some(cutoff) = self.policy.cutoff() {
            let before = self.accumulator.loaded_count();
            self.stats.malformed_records += self.accumulator.prune_before(cutoff);
            debug!(
                kind = %self.resource.kind,
                dropped = before - self.accumulator.loaded_count(),
                "Applied date cutoff"
            );
        }
    }

    fn finish_done(&mut self, reason: StopReason) {
        self.apply_cutoff();
        info!(
            kind = %self.resource.kind,
            loaded = self.accumulator.loaded_count(),
            reason = ?reason,
            "Collection done"
        );
        self.state = RunState::Done;
        self.stop_reason = Some(reason);
    }

    fn finish_partial(&mut self, error: Error) {
        let reason = match error {
            Error::Remote { .. } => StopReason::RemoteError,
            _ => StopReason::TransportError,
        };
        warn!(
            kind = %self.resource.kind,
            loaded = self.accumulator.loaded_count(),
            error = %error,
            "Collection stopped early"
        );
        self.apply_cutoff();
        self.state = RunState::Partial;
        self.stop_reason = Some(reason);
        self.error = Some(error);
    }
}

impl std::fmt::Debug for Collector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collector")
            .field("kind", &self.resource.kind)
            .field("state", &self.state)
            .field("offset", &self.offset)
            .field("loaded", &self.accumulator.loaded_count())
            .finish_non_exhaustive()
    }
}

/// Read `field` from the first record of a profile list.
///
/// Accepts both a bare array and an object wrapping the array in `wrapper`.
fn first_record_count(value: &JsonValue, wrapper: &str, field: &str) -> Result<u64> {
    let records = value
        .as_array()
        .or_else(|| value.get(wrapper).and_then(JsonValue::as_array))
        .ok_or_else(|| Error::decode(format!("expected a list of {wrapper}")))?;
    records
        .first()
        .and_then(|record| record.get(field))
        .and_then(JsonValue::as_u64)
        .ok_or_else(|| Error::decode(format!("{wrapper} record has no {field}")))
}
