//! Pagination data types
//!
//! A [`Page`] is the parsed result of one fetch; an [`Aggregate`] is the
//! append-only state accumulated across a whole collection run.

use crate::error::{Error, Result};
use crate::types::JsonValue;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Name of the per-item timestamp field (unix seconds)
pub const DATE_FIELD: &str = "date";

/// One page of results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    /// Authoritative total reported by this page, if any
    pub count: Option<u64>,
    /// Item records in remote order
    pub items: Vec<JsonValue>,
    /// Profile side-records (extended mode)
    pub profiles: Option<Vec<JsonValue>>,
    /// Group side-records (extended mode)
    pub groups: Option<Vec<JsonValue>>,
}

impl Page {
    /// A page with no items, as returned once pagination is exhausted
    pub fn empty(count: Option<u64>) -> Self {
        Self {
            count,
            ..Self::default()
        }
    }

    /// Parse the `response` object of a paginated call.
    ///
    /// Only `count`, `items`, `profiles` and `groups` are read.
    pub fn from_response(response: &JsonValue) -> Result<Self> {
        let items = response
            .get("items")
            .and_then(JsonValue::as_array)
            .ok_or_else(|| Error::decode("response has no items array"))?
            .clone();

        Ok(Self {
            count: response.get("count").and_then(JsonValue::as_u64),
            items,
            profiles: side_list(response, "profiles"),
            groups: side_list(response, "groups"),
        })
    }

    /// Number of items on this page
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether this page carries no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Last (oldest, for newest-first streams) item of the page
    pub fn last_item(&self) -> Option<&JsonValue> {
        self.items.last()
    }
}

fn side_list(response: &JsonValue, key: &str) -> Option<Vec<JsonValue>> {
    response.get(key).and_then(JsonValue::as_array).cloned()
}

/// Read the timestamp of an item, if it has a valid integer `date`
pub fn item_timestamp(item: &JsonValue) -> Option<DateTime<Utc>> {
    let secs = item.get(DATE_FIELD)?.as_i64()?;
    DateTime::from_timestamp(secs, 0)
}

/// Accumulated result of a collection run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    /// Last-seen authoritative total, if the resource reports one
    pub total_count: Option<u64>,
    /// Number of items collected; always equals `items.len()`
    pub loaded_count: u64,
    /// Items in remote page order
    pub items: Vec<JsonValue>,
    /// Profile side-records, present only in extended mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profiles: Option<Vec<JsonValue>>,
    /// Group side-records, present only in extended mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<Vec<JsonValue>>,
}

impl Aggregate {
    /// Create an empty aggregate, with side lists when `side_lists` is set
    pub fn new(side_lists: bool) -> Self {
        Self {
            profiles: side_lists.then(Vec::new),
            groups: side_lists.then(Vec::new),
            ..Self::default()
        }
    }

    /// Whether the aggregate holds no items
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Serialize to a JSON value for persistence
    pub fn to_json(&self) -> Result<JsonValue> {
        Ok(serde_json::to_value(self)?)
    }

    pub(crate) fn sync_loaded_count(&mut self) {
        self.loaded_count = self.items.len() as u64;
    }
}
