//! Tests for the HTTP transport module

use super::*;
use crate::types::Params;
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpApiClient {
    let config = HttpClientConfig::builder()
        .base_url(server.uri())
        .no_rate_limit()
        .build();
    HttpApiClient::with_config(config).unwrap()
}

#[test]
fn test_http_client_config_default() {
    let config = HttpClientConfig::default();
    assert_eq!(config.base_url, "https://api.vk.com");
    assert_eq!(config.timeout, Duration::from_secs(30));
    assert_eq!(config.rate_limit, Some(RateLimiterConfig::default()));
    assert!(config.user_agent.starts_with("vk-harvest/"));
}

#[test]
fn test_http_client_config_builder() {
    let config = HttpClientConfig::builder()
        .base_url("https://api.example.com")
        .timeout(Duration::from_secs(60))
        .rate_limit(RateLimiterConfig::new(5, 2))
        .header("X-Custom", "value")
        .user_agent("test-agent/1.0")
        .build();

    assert_eq!(config.base_url, "https://api.example.com");
    assert_eq!(config.timeout, Duration::from_secs(60));
    assert_eq!(config.rate_limit, Some(RateLimiterConfig::new(5, 2)));
    assert_eq!(
        config.default_headers.get("X-Custom"),
        Some(&"value".to_string())
    );
    assert_eq!(config.user_agent, "test-agent/1.0");
}

#[test]
fn test_method_url() {
    let config = HttpClientConfig::builder()
        .base_url("https://api.example.com/")
        .build();
    let client = HttpApiClient::with_config(config).unwrap();

    assert!(client.has_rate_limiter());
    assert_eq!(
        client.method_url("wall.get").unwrap().as_str(),
        "https://api.example.com/method/wall.get"
    );
}

#[tokio::test]
async fn test_call_sends_params_as_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/method/wall.get"))
        .and(query_param("owner_id", "-1"))
        .and(query_param("count", "100"))
        .and(query_param("v", "5.131"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "response": {"count": 1, "items": [{"id": 1}]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let mut params = Params::new();
    params.insert("owner_id".into(), (-1_i64).into());
    params.insert("count".into(), 100_u64.into());
    params.insert("v".into(), "5.131".into());

    let body = client.call("wall.get", &params).await.unwrap();
    assert_eq!(body["response"]["count"], 1);
}

#[tokio::test]
async fn test_call_returns_error_body_untouched() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/method/wall.get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "error": {"error_code": 5, "error_msg": "User authorization failed"}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let body = client.call("wall.get", &Params::new()).await.unwrap();
    assert_eq!(body["error"]["error_code"], 5);
}

#[tokio::test]
async fn test_call_maps_http_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/method/users.get"))
        .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.call("users.get", &Params::new()).await.unwrap_err();
    match err {
        crate::Error::HttpStatus { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "busy");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_call_rejects_non_json_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/method/users.get"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.call("users.get", &Params::new()).await.unwrap_err();
    assert!(matches!(err, crate::Error::JsonParse(_)));
}

#[tokio::test]
async fn test_call_sends_default_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/method/users.get"))
        .and(header("X-Trace", "abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "response": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url(server.uri())
        .header("X-Trace", "abc")
        .no_rate_limit()
        .build();
    let client = HttpApiClient::with_config(config).unwrap();

    let body = client.call("users.get", &Params::new()).await.unwrap();
    assert!(body["response"].is_array());
}
