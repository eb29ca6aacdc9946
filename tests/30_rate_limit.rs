//! Rate limiting of real resets: window enforcement, dry-run exemption,
//! and fail-open behavior when the counting query breaks.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use common::{issue_tenant_code, post, test_app_with, token_for};
use retail_ops_api::auth::ACCESS_ROOT;
use retail_ops_api::governor::LedgerStore;
use retail_ops_api::testing::governor_test_config;

#[tokio::test]
async fn hourly_limit_returns_self_explanatory_429() {
    let mut config = governor_test_config();
    config.tenant_resets_per_hour = 2;
    let (router, env) = test_app_with(config);
    let token = token_for("ops-admin", ACCESS_ROOT, Uuid::new_v4());
    let tenant = env.tenants.add("acme");
    let path = format!("/api/root/reset/tenant/{}", tenant);

    for _ in 0..2 {
        let code = issue_tenant_code(&router, &token, tenant).await;
        let (status, body) = post(&router, &path, &token, json!({ "confirm_code": code })).await;
        assert_eq!(status, StatusCode::OK, "{}", body);
    }

    let code = issue_tenant_code(&router, &token, tenant).await;
    let (status, body) = post(&router, &path, &token, json!({ "confirm_code": code })).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["code"], "RATE_LIMITED");
    assert_eq!(body["window"], "hour");
    assert_eq!(body["observed"], 2);
    assert_eq!(body["limit"], 2);
}

#[tokio::test]
async fn daily_limit_trips_when_hourly_allows() {
    let mut config = governor_test_config();
    config.tenant_resets_per_hour = 10;
    config.tenant_resets_per_day = 1;
    let (router, env) = test_app_with(config);
    let token = token_for("ops-admin", ACCESS_ROOT, Uuid::new_v4());
    let tenant = env.tenants.add("acme");
    let path = format!("/api/root/reset/tenant/{}", tenant);

    let code = issue_tenant_code(&router, &token, tenant).await;
    let (status, _) = post(&router, &path, &token, json!({ "confirm_code": code })).await;
    assert_eq!(status, StatusCode::OK);

    let code = issue_tenant_code(&router, &token, tenant).await;
    let (status, body) = post(&router, &path, &token, json!({ "confirm_code": code })).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["window"], "day");
}

#[tokio::test]
async fn throttled_operators_can_still_preview() {
    let mut config = governor_test_config();
    config.tenant_resets_per_hour = 1;
    let (router, env) = test_app_with(config);
    let token = token_for("ops-admin", ACCESS_ROOT, Uuid::new_v4());
    let tenant = env.tenants.add("acme");
    env.categories.seed(tenant, "orders", 4);
    let path = format!("/api/root/reset/tenant/{}", tenant);

    let code = issue_tenant_code(&router, &token, tenant).await;
    let (status, _) = post(&router, &path, &token, json!({ "confirm_code": code })).await;
    assert_eq!(status, StatusCode::OK);

    let code = issue_tenant_code(&router, &token, tenant).await;
    let (status, _) = post(&router, &path, &token, json!({ "confirm_code": code })).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    // previews stay available while throttled
    let (status, body) = post(&router, &path, &token, json!({ "dry_run": true })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["category_counts"]["orders"], 0);
}

#[tokio::test]
async fn failed_runs_count_against_the_limit() {
    let mut config = governor_test_config();
    config.tenant_resets_per_hour = 1;
    let (router, env) = test_app_with(config);
    let token = token_for("ops-admin", ACCESS_ROOT, Uuid::new_v4());
    let tenant = env.tenants.add("acme");
    env.categories.seed(tenant, "orders", 1);
    env.categories.fail_category("orders");
    let path = format!("/api/root/reset/tenant/{}", tenant);

    let code = issue_tenant_code(&router, &token, tenant).await;
    let (status, body) = post(&router, &path, &token, json!({ "confirm_code": code })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["success"], false);

    let code = issue_tenant_code(&router, &token, tenant).await;
    let (status, _) = post(&router, &path, &token, json!({ "confirm_code": code })).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn concurrent_real_resets_cannot_both_pass_the_gate() {
    let mut config = governor_test_config();
    config.tenant_resets_per_hour = 1;
    let (router, env) = test_app_with(config);
    let token = token_for("ops-admin", ACCESS_ROOT, Uuid::new_v4());
    let tenant = env.tenants.add("acme");
    env.categories.seed(tenant, "orders", 2);
    let path = format!("/api/root/reset/tenant/{}", tenant);

    // The typed phrase is reusable, so nothing but the limiter separates
    // these two in-flight requests.
    let body = json!({ "confirm_code": format!("RESET TENANT {}", tenant) });
    let (first, second) = tokio::join!(
        post(&router, &path, &token, body.clone()),
        post(&router, &path, &token, body)
    );

    let mut statuses = [first.0.as_u16(), second.0.as_u16()];
    statuses.sort_unstable();
    assert_eq!(statuses, [200, 429]);

    let real_rows = env
        .ledger
        .list(Default::default())
        .await
        .unwrap()
        .into_iter()
        .filter(|a| !a.is_dry_run)
        .count();
    assert_eq!(real_rows, 1);
    assert_eq!(env.categories.remaining(tenant, "orders"), 0);
}

#[tokio::test]
async fn limiter_fails_open_when_counting_breaks() {
    let mut config = governor_test_config();
    config.tenant_resets_per_hour = 0;
    let (router, env) = test_app_with(config);
    let token = token_for("ops-admin", ACCESS_ROOT, Uuid::new_v4());
    let tenant = env.tenants.add("acme");
    env.categories.seed(tenant, "orders", 1);
    env.ledger.fail_counting();

    // a zero limit would deny everything, but the count query is broken,
    // so the check passes and the stronger gates still apply
    let code = issue_tenant_code(&router, &token, tenant).await;
    let (status, body) = post(
        &router,
        &format!("/api/root/reset/tenant/{}", tenant),
        &token,
        json!({ "confirm_code": code }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(env.categories.remaining(tenant, "orders"), 0);
}
