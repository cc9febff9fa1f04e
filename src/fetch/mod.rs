//! Fetch module
//!
//! One bounded call against a named remote method.
//!
//! # Overview
//!
//! - [`classify`] - maps a raw response body to a typed [`Classification`]
//! - [`build_params`] - pure merge of defaults, overrides and base params
//! - [`PageRequest`] - per-call request record for a resource kind
//! - [`PageFetcher`] - performs the call and enforces the post-call delay

mod classifier;
mod fetcher;
mod params;

pub use classifier::{classify, Classification, Payload};
pub use fetcher::{FetcherConfig, PageFetcher, DEFAULT_API_VERSION, DEFAULT_CALL_DELAY};
pub use params::{build_params, PageRequest, RESERVED_PARAMS};

#[cfg(test)]
mod tests;
