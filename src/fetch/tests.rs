//! Tests for fetch module

use super::*;
use crate::auth::StaticToken;
use crate::error::Error;
use crate::resource::ResourceKind;
use crate::test_support::{
    empty_body, error_body, fetcher, page_body, Scripted, ScriptedClient,
};
use crate::types::{ParamValue, Params};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

// ============================================================================
// Classifier Tests
// ============================================================================

#[test]
fn test_classify_page() {
    let result = classify(page_body(10, 0, 3)).unwrap();
    match result {
        Classification::Success(Payload::Page(page)) => {
            assert_eq!(page.count, Some(10));
            assert_eq!(page.len(), 3);
        }
        other => panic!("unexpected classification: {other:?}"),
    }
}

#[test]
fn test_classify_scalar() {
    let result = classify(json!({"response": 17})).unwrap();
    assert_eq!(result, Classification::Success(Payload::Value(json!(17))));

    let result = classify(json!({"response": [{"id": 1, "members_count": 9}]})).unwrap();
    assert!(matches!(result, Classification::Success(Payload::Value(_))));
}

#[test]
fn test_classify_empty_page() {
    let result = classify(empty_body(42)).unwrap();
    assert_eq!(result, Classification::EmptyPage { count: Some(42) });
}

#[test]
fn test_classify_remote_error() {
    let result = classify(error_body(6, "Too many requests per second")).unwrap();
    assert_eq!(
        result,
        Classification::RemoteError {
            code: 6,
            message: "Too many requests per second".to_string()
        }
    );
}

#[test]
fn test_classify_error_wins_over_response() {
    let body = json!({"error": {"error_code": 15}, "response": {"items": [1]}});
    let result = classify(body).unwrap();
    assert_eq!(
        result,
        Classification::RemoteError {
            code: 15,
            message: String::new()
        }
    );
}

#[test]
fn test_classify_malformed() {
    assert!(matches!(
        classify(json!({"unexpected": true})),
        Err(Error::Decode { .. })
    ));
    assert!(matches!(classify(json!([1, 2])), Err(Error::Decode { .. })));
}

// ============================================================================
// Params Tests
// ============================================================================

#[test]
fn test_build_params_precedence() {
    let mut defaults = Params::new();
    defaults.insert("count".into(), 100_u64.into());
    defaults.insert("sort".into(), "asc".into());
    defaults.insert("v".into(), "1.0".into());

    let mut overrides = Params::new();
    overrides.insert("sort".into(), "desc".into());
    overrides.insert("access_token".into(), "spoofed".into());

    let params = build_params(&defaults, &overrides, "tok", "5.131");
    assert_eq!(params.get("count"), Some(&ParamValue::Int(100)));
    assert_eq!(params.get("sort"), Some(&ParamValue::from("desc")));
    assert_eq!(params.get("access_token"), Some(&ParamValue::from("tok")));
    assert_eq!(params.get("v"), Some(&ParamValue::from("5.131")));

    // Inputs are untouched
    assert_eq!(defaults.get("sort"), Some(&ParamValue::from("asc")));
}

#[test]
fn test_page_request_params() {
    let config = ResourceKind::Posts.config();
    let identity: Params = [("domain".to_string(), ParamValue::from("apiclub"))].into();
    let request = PageRequest {
        config: &config,
        offset: 300,
        page_size: 100,
        extended: true,
        identity: &identity,
    };

    let params = request.to_params();
    assert_eq!(params.get("offset"), Some(&ParamValue::Int(300)));
    assert_eq!(params.get("count"), Some(&ParamValue::Int(100)));
    assert_eq!(params.get("extended"), Some(&ParamValue::Int(1)));
    assert_eq!(params.get("domain"), Some(&ParamValue::from("apiclub")));
    assert!(params.contains_key("fields"));
}

#[test]
fn test_page_request_omits_extended_for_members() {
    let config = ResourceKind::Members.config();
    let identity = Params::new();
    let request = PageRequest {
        config: &config,
        offset: 0,
        page_size: 1000,
        extended: true,
        identity: &identity,
    };
    assert!(!request.to_params().contains_key("extended"));
}

// ============================================================================
// PageFetcher Tests
// ============================================================================

#[tokio::test]
async fn test_fetch_page_injects_base_params() {
    let client = ScriptedClient::new([page_body(5, 0, 5)]);
    let fetcher = fetcher(client.clone());

    let mut defaults = Params::new();
    defaults.insert("owner_id".into(), (-1_i64).into());
    let page = fetcher
        .fetch_page("wall.get", &defaults, &Params::new())
        .await
        .unwrap();
    assert_eq!(page.len(), 5);

    let calls = client.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, "wall.get");
    assert_eq!(calls[0].param("access_token").as_deref(), Some("test-token"));
    assert_eq!(calls[0].param("v").as_deref(), Some(DEFAULT_API_VERSION));
    assert_eq!(calls[0].param("owner_id").as_deref(), Some("-1"));
}

#[tokio::test]
async fn test_fetch_page_empty_is_zero_items() {
    let client = ScriptedClient::new([empty_body(100)]);
    let page = fetcher(client)
        .fetch_page("wall.get", &Params::new(), &Params::new())
        .await
        .unwrap();
    assert!(page.is_empty());
    assert_eq!(page.count, Some(100));
}

#[tokio::test]
async fn test_fetch_page_remote_error() {
    let client = ScriptedClient::new([error_body(5, "User authorization failed")]);
    let err = fetcher(client)
        .fetch_page("wall.get", &Params::new(), &Params::new())
        .await
        .unwrap_err();
    match err {
        Error::Remote { code, message } => {
            assert_eq!(code, 5);
            assert_eq!(message, "User authorization failed");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_fetch_page_rejects_scalar() {
    let client = ScriptedClient::new([json!({"response": 3})]);
    let err = fetcher(client)
        .fetch_page("wall.get", &Params::new(), &Params::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Decode { .. }));
}

#[tokio::test]
async fn test_fetch_value() {
    let client = ScriptedClient::new([json!({"response": [{"followers_count": 12}]})]);
    let value = fetcher(client)
        .fetch_value("users.get", &Params::new(), &Params::new())
        .await
        .unwrap();
    assert_eq!(value[0]["followers_count"], 12);
}

#[tokio::test]
async fn test_auth_failure_makes_no_call() {
    let client = ScriptedClient::new([page_body(1, 0, 1)]);
    let fetcher = PageFetcher::new(client.clone(), Arc::new(StaticToken::new("")));
    let err = fetcher
        .fetch_page("wall.get", &Params::new(), &Params::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Auth { .. }));
    assert_eq!(client.call_count(), 0);
}

// ============================================================================
// Delay Tests
// ============================================================================

fn delayed(client: Arc<ScriptedClient>) -> PageFetcher {
    PageFetcher::new(client, Arc::new(StaticToken::new("t")))
        .with_config(FetcherConfig::new().with_delay(Duration::from_millis(330)))
}

#[tokio::test(start_paused = true)]
async fn test_delay_after_success() {
    let fetcher = delayed(ScriptedClient::new([page_body(1, 0, 1)]));
    let start = Instant::now();
    fetcher
        .fetch_page("wall.get", &Params::new(), &Params::new())
        .await
        .unwrap();
    assert!(start.elapsed() >= Duration::from_millis(330));
}

#[tokio::test(start_paused = true)]
async fn test_delay_after_remote_error() {
    let fetcher = delayed(ScriptedClient::new([error_body(6, "flood")]));
    let start = Instant::now();
    let result = fetcher
        .fetch_page("wall.get", &Params::new(), &Params::new())
        .await;
    assert!(result.is_err());
    assert!(start.elapsed() >= Duration::from_millis(330));
}

#[tokio::test(start_paused = true)]
async fn test_delay_after_transport_error() {
    let fetcher = delayed(ScriptedClient::with_script([Scripted::HttpStatus(502)]));
    let start = Instant::now();
    let result = fetcher
        .fetch_page("wall.get", &Params::new(), &Params::new())
        .await;
    assert!(matches!(result, Err(Error::HttpStatus { status: 502, .. })));
    assert!(start.elapsed() >= Duration::from_millis(330));
}

#[tokio::test(start_paused = true)]
async fn test_consecutive_calls_are_spaced() {
    let fetcher = delayed(ScriptedClient::new([
        error_body(6, "flood"),
        error_body(6, "flood"),
        error_body(6, "flood"),
    ]));
    let start = Instant::now();
    for _ in 0..3 {
        let _ = fetcher.call("wall.get", &Params::new(), &Params::new()).await;
    }
    assert!(start.elapsed() >= Duration::from_millis(990));
}

#[test]
fn test_fetcher_config_builder() {
    let config = FetcherConfig::new()
        .with_delay(Duration::from_millis(50))
        .with_api_version("5.199");
    assert_eq!(config.delay, Duration::from_millis(50));
    assert_eq!(config.api_version, "5.199");
    assert_eq!(FetcherConfig::default().delay, DEFAULT_CALL_DELAY);
}
