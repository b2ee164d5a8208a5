//! Common code for integration tests

#![allow(dead_code, reason = "each test crate uses a different subset of these helpers")]

use std::time::Duration;

use anyhow::Error;
use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use keyword_gateway::{
    config::{Config, LogFormat},
    router, AppState,
};
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;
use wiremock::MockServer;

/// The client ID the gateway is configured with in tests.
pub(crate) const CLIENT_ID: &str = "test-client-id";

/// The client secret the gateway is configured with in tests.
pub(crate) const CLIENT_SECRET: &str = "test-client-secret";

/// The path the mock blog search endpoint is mounted at.
pub(crate) const BLOG_SEARCH_PATH: &str = "/v1/search/blog.json";

/// The path the mock DataLab endpoint is mounted at.
pub(crate) const DATALAB_SEARCH_PATH: &str = "/v1/datalab/search";

/// A response from the gateway.
pub(crate) struct TestResponse {
    /// The response status.
    pub(crate) status: StatusCode,

    /// The response headers.
    pub(crate) headers: HeaderMap,

    /// The response body, parsed as JSON.
    pub(crate) body: Value,
}

/// Builds a gateway configuration pointing at a mock Naver server, with the specified credentials.
pub(crate) fn config(
    upstream: &MockServer,
    client_id: Option<&str>,
    client_secret: Option<&str>,
) -> Result<Config, Error> {
    Ok(Config {
        address: "127.0.0.1:0".parse()?,
        client_id: client_id.map(Into::into),
        client_secret: client_secret.map(SecretString::from),
        blog_search_url: format!("{}{BLOG_SEARCH_PATH}", upstream.uri()).parse()?,
        datalab_search_url: format!("{}{DATALAB_SEARCH_PATH}", upstream.uri()).parse()?,
        upstream_timeout: Duration::from_secs(5),
        log_format: LogFormat::Pretty,
    })
}

/// Builds a gateway router pointing at a mock Naver server, with valid test credentials.
pub(crate) fn gateway(upstream: &MockServer) -> Result<Router, Error> {
    gateway_with(config(upstream, Some(CLIENT_ID), Some(CLIENT_SECRET))?)
}

/// Builds a gateway router from a configuration.
pub(crate) fn gateway_with(config: Config) -> Result<Router, Error> {
    Ok(router(AppState::new(config)?))
}

/// Sends a request with a JSON body to the gateway.
pub(crate) async fn send(
    gateway: Router,
    method: Method,
    path: &str,
    body: &Value,
) -> Result<TestResponse, Error> {
    let request = Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body)?))?;

    let response = gateway.oneshot(request).await?;

    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await?;
    let body = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body)?
    };

    Ok(TestResponse {
        status,
        headers,
        body,
    })
}

/// Sends a `POST` request with a JSON body to the gateway.
pub(crate) async fn post(
    gateway: Router,
    path: &str,
    body: &Value,
) -> Result<TestResponse, Error> {
    send(gateway, Method::POST, path, body).await
}
