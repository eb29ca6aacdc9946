#![allow(dead_code)]

//! Shared helpers for the integration suites. Every test drives the full
//! router in-process over the in-memory stores, so no database or network
//! is needed and fault injection is deterministic.

use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::util::ServiceExt;
use uuid::Uuid;

use retail_ops_api::auth::{generate_jwt, Claims, ACCESS_ROOT};
use retail_ops_api::config::GovernorConfig;
use retail_ops_api::handlers::app;
use retail_ops_api::testing::{test_env, test_env_with, TestEnv};

pub fn test_app() -> (Router, TestEnv) {
    let env = test_env();
    let router = app(env.state.clone());
    (router, env)
}

pub fn test_app_with(config: GovernorConfig) -> (Router, TestEnv) {
    let env = test_env_with(config);
    let router = app(env.state.clone());
    (router, env)
}

pub fn token_for(name: &str, access: &str, operator_id: Uuid) -> String {
    let claims = Claims::new(name.to_string(), access.to_string(), operator_id);
    generate_jwt(claims).expect("failed to sign test token")
}

pub fn root_token() -> String {
    token_for("ops-admin", ACCESS_ROOT, Uuid::new_v4())
}

pub async fn request(
    router: &Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("request build"),
        None => builder.body(Body::empty()).expect("request build"),
    };

    let response = router.clone().oneshot(request).await.expect("router call");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("response body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response was not JSON")
    };
    (status, body)
}

pub async fn get(router: &Router, path: &str, token: &str) -> (StatusCode, Value) {
    request(router, "GET", path, Some(token), None).await
}

pub async fn post(router: &Router, path: &str, token: &str, body: Value) -> (StatusCode, Value) {
    request(router, "POST", path, Some(token), Some(body)).await
}

pub async fn delete(
    router: &Router,
    path: &str,
    token: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    request(router, "DELETE", path, Some(token), body).await
}

/// Fetches a fresh one-time confirmation code for a tenant reset.
pub async fn issue_tenant_code(router: &Router, token: &str, tenant: Uuid) -> String {
    let (status, body) = post(
        router,
        &format!("/api/root/reset/tenant/{}/confirmation", tenant),
        token,
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "confirmation issuance failed: {}", body);
    body["data"]["code"].as_str().expect("code in confirmation").to_string()
}

pub async fn issue_system_code(router: &Router, token: &str) -> String {
    let (status, body) =
        post(router, "/api/root/reset/system/confirmation", token, json!({})).await;
    assert_eq!(status, StatusCode::CREATED, "confirmation issuance failed: {}", body);
    body["data"]["code"].as_str().expect("code in confirmation").to_string()
}

/// Polls until `check` passes or the deadline expires. The follow-up
/// dispatcher persists cleanup jobs on a detached task, so tests that
/// assert on them have to wait for the worker to drain.
pub async fn wait_until<F: Fn() -> bool>(check: F, what: &str) {
    for _ in 0..100 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for {}", what);
}
