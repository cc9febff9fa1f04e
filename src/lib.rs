// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]

//! # vk-harvest
//!
//! Collects offset-paginated collections from the VK API (wall posts,
//! comments, community members, followers, likes) into a single in-memory
//! aggregate, under the platform's per-token call-rate ceiling.
//!
//! ## Features
//!
//! - **Sequential Pagination**: one call in flight, fixed post-call delay
//! - **Authoritative Totals**: amount probes before the first page
//! - **Termination Policies**: item count target and date cutoff (posts)
//! - **Partial Results**: remote or transport errors keep the data so far
//! - **Pluggable Seams**: transport, credentials, progress and storage are traits
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use vk_harvest::{Collector, EnvToken, HttpApiClient, PageFetcher, ResourceKind, Target};
//!
//! #[tokio::main]
//! async fn main() -> vk_harvest::Result<()> {
//!     let client = Arc::new(HttpApiClient::new()?);
//!     let fetcher = PageFetcher::new(client, Arc::new(EnvToken::default()));
//!
//!     let collection = Collector::new(fetcher, ResourceKind::Posts, Target::domain("apiclub"))
//!         .with_count(250)
//!         .run()
//!         .await?;
//!
//!     println!("{} posts ({})", collection.aggregate.loaded_count, collection.state);
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │   Collector: Init ─► Running ─► {Done, Partial, Failed}      │
//! │   TerminationPolicy · Accumulator · ProgressSink             │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │ one page at a time
//! ┌──────────────┬───────────────┴──────────────┬────────────────┐
//! │ ResourceKind │ PageFetcher                  │ Store          │
//! ├──────────────┼──────────────────────────────┼────────────────┤
//! │ method       │ params + token + version     │ Memory         │
//! │ page size    │ ApiClient call               │ JSON files     │
//! │ total source │ delay · classify             │                │
//! └──────────────┴──────────────────────────────┴────────────────┘
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Access token providers
pub mod auth;

/// HTTP transport with rate limiting
pub mod http;

/// Per-kind resource configuration and target identity
pub mod resource;

/// Page fetching, parameter building and response classification
pub mod fetch;

/// Pages, aggregates and termination policies
pub mod pagination;

/// Collection state machine
pub mod engine;

/// Progress reporting
pub mod progress;

/// Cooperative shutdown
pub mod shutdown;

/// Result persistence
pub mod store;

/// Runtime settings
pub mod config;

/// Command-line interface
pub mod cli;

#[cfg(test)]
mod test_support;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use auth::{AuthProvider, EnvToken, StaticToken};
pub use config::Settings;
pub use engine::{Collection, Collector, CollectorConfig, RunState, StopReason};
pub use fetch::{FetcherConfig, PageFetcher};
pub use http::{ApiClient, HttpApiClient, HttpClientConfig};
pub use pagination::{Aggregate, TerminationPolicy};
pub use progress::{LogProgress, NoProgress, ProgressSink};
pub use resource::{ResourceKind, Target};
pub use shutdown::ShutdownSignal;
pub use store::{JsonFileStore, MemoryStore, Store};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
