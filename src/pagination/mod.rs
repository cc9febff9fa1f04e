//! Pagination module
//!
//! Accumulation and termination for offset-paginated collections.
//!
//! # Overview
//!
//! - [`Page`] - one parsed fetch result
//! - [`Aggregate`] - append-only state across a run
//! - [`Accumulator`] - merges pages, counts growth and stalls
//! - [`TerminationPolicy`] - count-bound and date-bound stopping rules

mod accumulator;
mod policy;
mod types;

pub use accumulator::Accumulator;
pub use policy::{BoundaryCheck, StopResult, TerminationPolicy};
pub use types::{item_timestamp, Aggregate, Page, DATE_FIELD};
