//! Scripted collaborators for unit tests

use crate::auth::StaticToken;
use crate::error::{Error, Result};
use crate::fetch::{FetcherConfig, PageFetcher};
use crate::http::ApiClient;
use crate::progress::ProgressSink;
use crate::types::{JsonValue, Params};
use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A response queued on a [`ScriptedClient`]
#[derive(Debug, Clone)]
pub enum Scripted {
    Body(JsonValue),
    HttpStatus(u16),
}

/// One recorded call
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: String,
    pub params: Params,
}

impl RecordedCall {
    pub fn param(&self, key: &str) -> Option<String> {
        self.params.get(key).map(ToString::to_string)
    }
}

/// Replays queued responses in order and records every call
#[derive(Debug, Default)]
pub struct ScriptedClient {
    responses: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedClient {
    pub fn new(responses: impl IntoIterator<Item = JsonValue>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into_iter().map(Scripted::Body).collect()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn with_script(script: impl IntoIterator<Item = Scripted>) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(script.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ApiClient for ScriptedClient {
    async fn call(&self, method: &str, params: &Params) -> Result<JsonValue> {
        self.calls.lock().unwrap().push(RecordedCall {
            method: method.to_string(),
            params: params.clone(),
        });
        match self.responses.lock().unwrap().pop_front() {
            Some(Scripted::Body(body)) => Ok(body),
            Some(Scripted::HttpStatus(status)) => Err(Error::http_status(status, "scripted")),
            None => Err(Error::Other(format!("no scripted response for {method}"))),
        }
    }
}

/// Records every progress report
#[derive(Debug, Default)]
pub struct RecordingProgress {
    pub reports: Mutex<Vec<(u64, Option<u64>)>>,
}

impl ProgressSink for RecordingProgress {
    fn advance(&self, delta: u64, total: Option<u64>) {
        self.reports.lock().unwrap().push((delta, total));
    }
}

/// A fetcher over `client` with no post-call delay
pub fn fetcher(client: Arc<ScriptedClient>) -> PageFetcher {
    PageFetcher::new(client, Arc::new(StaticToken::new("test-token")))
        .with_config(FetcherConfig::new().with_delay(Duration::ZERO))
}

/// `{"response": {"count": total, "items": [...]}}` with ids `start..end`
pub fn page_body(total: u64, start: u64, end: u64) -> JsonValue {
    let items: Vec<_> = (start..end).map(|id| json!({ "id": id })).collect();
    json!({ "response": { "count": total, "items": items } })
}

/// A page of posts with descending `date` values
pub fn dated_page_body(total: u64, posts: &[(u64, i64)]) -> JsonValue {
    let items: Vec<_> = posts
        .iter()
        .map(|(id, date)| json!({ "id": id, "date": date }))
        .collect();
    json!({ "response": { "count": total, "items": items } })
}

/// `{"response": {"count": total, "items": []}}`
pub fn empty_body(total: u64) -> JsonValue {
    json!({ "response": { "count": total, "items": [] } })
}

/// `{"error": {...}}`
pub fn error_body(code: i64, message: &str) -> JsonValue {
    json!({ "error": { "error_code": code, "error_msg": message } })
}
