//! Authentication module
//!
//! Supplies the bearer credential that is injected into every API call.
//!
//! Token acquisition (password grant, OAuth handshakes) happens outside this
//! crate; providers here only hand out an already-issued access token.

mod provider;

pub use provider::{AuthProvider, EnvToken, StaticToken, DEFAULT_TOKEN_ENV};
