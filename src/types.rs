//! Common types used throughout vk-harvest
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// Request parameters for a single API call.
///
/// Ordered so that identical runs produce identical query strings.
pub type Params = BTreeMap<String, ParamValue>;

// ============================================================================
// Parameter Values
// ============================================================================

/// A single request parameter value (string or integer)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// Integer parameter (ids, offsets, counts, flags)
    Int(i64),
    /// String parameter (domains, field lists, versions)
    Str(String),
}

impl ParamValue {
    /// Integer view of the value, parsing strings when possible
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            Self::Str(s) => s.parse().ok(),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u64> for ParamValue {
    fn from(value: u64) -> Self {
        Self::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<u32> for ParamValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// Render params as string pairs for a query string
pub fn to_query_pairs(params: &Params) -> Vec<(String, String)> {
    params
        .iter()
        .map(|(key, value)| (key.clone(), value.to_string()))
        .collect()
}

/// Parse a `key=value` override, keeping integers as integers
pub fn parse_param_override(raw: &str) -> Option<(String, ParamValue)> {
    let (key, value) = raw.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    let value = value.trim();
    let value = match value.parse::<i64>() {
        Ok(n) => ParamValue::Int(n),
        Err(_) => ParamValue::Str(value.to_string()),
    };
    Some((key.to_string(), value))
}
