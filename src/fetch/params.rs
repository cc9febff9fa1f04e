//! Request parameter construction

use crate::resource::ResourceConfig;
use crate::types::Params;

/// Parameters owned by the engine or the fetcher; callers may not override them
pub const RESERVED_PARAMS: &[&str] = &["offset", "count", "access_token", "v"];

/// Merge request parameters.
///
/// `overrides` replace `defaults`; the access token and API version are set
/// last and always win.
pub fn build_params(defaults: &Params, overrides: &Params, token: &str, version: &str) -> Params {
    let mut params = defaults.clone();
    params.extend(overrides.iter().map(|(k, v)| (k.clone(), v.clone())));
    params.insert("access_token".into(), token.into());
    params.insert("v".into(), version.into());
    params
}

/// One page request. Built fresh for every call.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest<'a> {
    /// Resource configuration
    pub config: &'a ResourceConfig,
    /// Cursor offset
    pub offset: u64,
    /// Items per page
    pub page_size: u64,
    /// Extended mode flag
    pub extended: bool,
    /// Resolved identity parameters
    pub identity: &'a Params,
}

impl PageRequest<'_> {
    /// Default parameters for this request, before caller overrides
    pub fn to_params(&self) -> Params {
        let mut params = self.config.defaults();
        params.extend(self.identity.iter().map(|(k, v)| (k.clone(), v.clone())));
        if self.config.supports_extended() {
            params.insert("extended".into(), self.extended.into());
        }
        params.insert("count".into(), self.page_size.into());
        params.insert("offset".into(), self.offset.into());
        params
    }
}
