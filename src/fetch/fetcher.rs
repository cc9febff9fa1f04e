//! Page fetcher
//!
//! Performs exactly one call per invocation and then waits a fixed minimum
//! delay, whatever the outcome. The remote side rejects callers that exceed
//! its call-rate ceiling, so the delay is part of the contract.

use super::classifier::{classify, Classification, Payload};
use super::params::build_params;
use crate::auth::AuthProvider;
use crate::error::{Error, Result};
use crate::http::ApiClient;
use crate::pagination::Page;
use crate::types::{JsonValue, Params};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Default pause after every call
pub const DEFAULT_CALL_DELAY: Duration = Duration::from_millis(330);

/// Default API version sent as `v`
pub const DEFAULT_API_VERSION: &str = "5.131";

/// Configuration for the page fetcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetcherConfig {
    /// Minimum pause after every call
    pub delay: Duration,
    /// API version sent with every call
    pub api_version: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            delay: DEFAULT_CALL_DELAY,
            api_version: DEFAULT_API_VERSION.to_string(),
        }
    }
}

impl FetcherConfig {
    /// Create a new fetcher config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the post-call delay
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Set the API version
    #[must_use]
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }
}

/// Issues single calls against the API
#[derive(Clone)]
pub struct PageFetcher {
    client: Arc<dyn ApiClient>,
    auth: Arc<dyn AuthProvider>,
    config: FetcherConfig,
}

impl PageFetcher {
    /// Create a fetcher with default configuration
    pub fn new(client: Arc<dyn ApiClient>, auth: Arc<dyn AuthProvider>) -> Self {
        Self {
            client,
            auth,
            config: FetcherConfig::default(),
        }
    }

    /// Set fetcher configuration
    #[must_use]
    pub fn with_config(mut self, config: FetcherConfig) -> Self {
        self.config = config;
        self
    }

    /// Get the fetcher configuration
    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    /// Perform one call and classify the response.
    ///
    /// The configured delay elapses after the call returns, including when
    /// it fails.
    pub async fn call(
        &self,
        method: &str,
        defaults: &Params,
        overrides: &Params,
    ) -> Result<Classification> {
        let token = self.auth.token().await?;
        let params = build_params(defaults, overrides, &token, &self.config.api_version);

        debug!(
            method,
            offset = params.get("offset").and_then(|v| v.as_i64()),
            "Calling API"
        );
        let response = self.client.call(method, &params).await;
        tokio::time::sleep(self.config.delay).await;

        let classification = classify(response?)?;
        if let Classification::RemoteError { code, message } = &classification {
            warn!(method, code, message = message.as_str(), "Remote error");
        }
        Ok(classification)
    }

    /// Fetch one page of items.
    ///
    /// An empty page is returned as a page with zero items; a remote error
    /// becomes [`Error::Remote`].
    pub async fn fetch_page(
        &self,
        method: &str,
        defaults: &Params,
        overrides: &Params,
    ) -> Result<Page> {
        match self.call(method, defaults, overrides).await? {
            Classification::Success(Payload::Page(page)) => Ok(page),
            Classification::EmptyPage { count } => Ok(Page::empty(count)),
            Classification::RemoteError { code, message } => Err(Error::remote(code, message)),
            Classification::Success(Payload::Value(_)) => Err(Error::decode(format!(
                "{method} did not return a page of items"
            ))),
        }
    }

    /// Fetch a non-paginated value, e.g. a profile list used as a count probe.
    ///
    /// A page payload is returned in its `{count, items}` shape.
    pub async fn fetch_value(
        &self,
        method: &str,
        defaults: &Params,
        overrides: &Params,
    ) -> Result<JsonValue> {
        match self.call(method, defaults, overrides).await? {
            Classification::Success(Payload::Value(value)) => Ok(value),
            Classification::Success(Payload::Page(page)) => Ok(serde_json::json!({
                "count": page.count,
                "items": page.items,
            })),
            Classification::EmptyPage { count } => Ok(serde_json::json!({
                "count": count,
                "items": [],
            })),
            Classification::RemoteError { code, message } => Err(Error::remote(code, message)),
        }
    }
}

impl std::fmt::Debug for PageFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageFetcher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
