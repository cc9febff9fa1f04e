//! Runtime settings
//!
//! Settings are read from an optional YAML file. Every field has a default,
//! so an empty file (or no file) yields a working configuration.
//!
//! ```yaml
//! api:
//!   base_url: https://api.vk.com
//!   version: "5.131"
//!   timeout_secs: 30
//!   requests_per_second: 3
//! fetch:
//!   delay_ms: 330
//!   stall_limit: 1
//! output:
//!   dir: output
//! ```

use crate::auth::{AuthProvider, EnvToken, StaticToken};
use crate::engine::CollectorConfig;
use crate::error::{Error, Result, ResultExt};
use crate::fetch::{FetcherConfig, DEFAULT_API_VERSION, DEFAULT_CALL_DELAY};
use crate::http::{HttpClientConfig, RateLimiterConfig, DEFAULT_BASE_URL};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// Top-Level Settings
// ============================================================================

/// Complete runtime settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Remote API settings
    #[serde(default)]
    pub api: ApiSettings,

    /// Fetch loop settings
    #[serde(default)]
    pub fetch: FetchSettings,

    /// Output settings
    #[serde(default)]
    pub output: OutputSettings,
}

impl Settings {
    /// Load settings from `path`, or defaults when no path is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Load settings from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file '{}'", path.display()))?;
        Self::from_yaml_str(&content)
    }

    /// Parse settings from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        // An empty document deserializes as null
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Self = serde_yaml::from_str(yaml)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.api.base_url.trim().is_empty() {
            return Err(Error::config("api.base_url cannot be empty"));
        }
        url::Url::parse(&self.api.base_url)?;
        if self.api.version.trim().is_empty() {
            return Err(Error::config("api.version cannot be empty"));
        }
        if self.api.timeout_secs == 0 {
            return Err(Error::config("api.timeout_secs must be positive"));
        }
        if self.fetch.delay_ms == 0 {
            return Err(Error::config("fetch.delay_ms must be positive"));
        }
        if self.fetch.stall_limit == 0 {
            return Err(Error::config("fetch.stall_limit must be at least 1"));
        }
        Ok(())
    }

    /// HTTP client configuration derived from the `api` section
    pub fn http_client_config(&self) -> HttpClientConfig {
        let builder = HttpClientConfig::builder()
            .base_url(&self.api.base_url)
            .timeout(Duration::from_secs(self.api.timeout_secs));
        let builder = match self.api.requests_per_second {
            0 => builder.no_rate_limit(),
            rps => builder.rate_limit(RateLimiterConfig::new(rps, 1)),
        };
        builder.build()
    }

    /// Fetcher configuration derived from the `api` and `fetch` sections
    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig::new()
            .with_delay(Duration::from_millis(self.fetch.delay_ms))
            .with_api_version(&self.api.version)
    }

    /// Collector configuration derived from the `fetch` section
    pub fn collector_config(&self) -> CollectorConfig {
        CollectorConfig::new().with_stall_limit(self.fetch.stall_limit)
    }
}

/// Pick the credential source: an explicit token wins over the environment
pub fn auth_provider(token: Option<&str>) -> Arc<dyn AuthProvider> {
    match token.filter(|t| !t.is_empty()) {
        Some(token) => Arc::new(StaticToken::new(token)),
        None => Arc::new(EnvToken::default()),
    }
}

// ============================================================================
// Sections
// ============================================================================

/// Remote API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiSettings {
    /// Scheme and host of the API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API version sent as `v`
    #[serde(default = "default_version")]
    pub version: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Transport-side ceiling; 0 disables the limiter
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            version: default_version(),
            timeout_secs: default_timeout_secs(),
            requests_per_second: default_requests_per_second(),
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_requests_per_second() -> u32 {
    3
}

/// Fetch loop settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FetchSettings {
    /// Pause after every call, in milliseconds. Must be at least 1.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Consecutive zero-growth pages that end a run
    #[serde(default = "default_stall_limit")]
    pub stall_limit: u32,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            stall_limit: default_stall_limit(),
        }
    }
}

fn default_delay_ms() -> u64 {
    DEFAULT_CALL_DELAY.as_millis() as u64
}

fn default_stall_limit() -> u32 {
    1
}

/// Output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputSettings {
    /// Directory receiving `<key>.json` records
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
        }
    }
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}
