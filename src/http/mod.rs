//! HTTP transport module
//!
//! Provides the [`ApiClient`] seam used by the fetcher and a reqwest-backed
//! implementation for `method/<name>` style APIs.
//!
//! # Features
//!
//! - **Single-shot calls**: one request per call, no retries or caching
//! - **Rate Limiting**: Optional token bucket ceiling using governor
//! - **Status Mapping**: Non-2xx responses surface as typed errors

mod client;
mod rate_limit;

pub use client::{
    ApiClient, HttpApiClient, HttpClientConfig, HttpClientConfigBuilder, DEFAULT_BASE_URL,
};
pub use rate_limit::{RateLimiter, RateLimiterConfig};

#[cfg(test)]
mod tests;
