//! Access token providers

use crate::error::{Error, Result};
use async_trait::async_trait;

/// Environment variable consulted by [`EnvToken::default`]
pub const DEFAULT_TOKEN_ENV: &str = "VK_ACCESS_TOKEN";

/// Source of the opaque access token sent with every call
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Return the current access token
    async fn token(&self) -> Result<String>;
}

/// A fixed, pre-issued access token
#[derive(Clone)]
pub struct StaticToken {
    token: String,
}

impl StaticToken {
    /// Wrap an already-issued token
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticToken")
            .field("token", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl AuthProvider for StaticToken {
    async fn token(&self) -> Result<String> {
        if self.token.is_empty() {
            return Err(Error::auth("access token is empty"));
        }
        Ok(self.token.clone())
    }
}

/// Reads the token from an environment variable on every call
#[derive(Debug, Clone)]
pub struct EnvToken {
    var: String,
}

impl EnvToken {
    /// Read the token from `var`
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }

    /// Name of the variable consulted
    pub fn var(&self) -> &str {
        &self.var
    }
}

impl Default for EnvToken {
    fn default() -> Self {
        Self::new(DEFAULT_TOKEN_ENV)
    }
}

#[async_trait]
impl AuthProvider for EnvToken {
    async fn token(&self) -> Result<String> {
        match std::env::var(&self.var) {
            Ok(token) if !token.is_empty() => Ok(token),
            _ => Err(Error::auth(format!(
                "environment variable {} is not set",
                self.var
            ))),
        }
    }
}
