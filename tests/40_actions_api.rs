//! Audit ledger endpoints: listing with filters and clamping, detail with
//! cleanup jobs, record deletion, and the auth boundary around the whole
//! restricted surface.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use common::{
    delete, get, issue_tenant_code, post, request, root_token, test_app, token_for, wait_until,
};
use retail_ops_api::auth::{ACCESS_EDIT, ACCESS_FULL, ACCESS_READ};
use retail_ops_api::database::models::JobStatus;
use retail_ops_api::governor::CleanupJobStore;

/// Seeds the ledger with one completed dry-run, one completed real run,
/// and one failed real run against the same tenant.
async fn seed_actions(router: &axum::Router, env: &retail_ops_api::testing::TestEnv, token: &str) -> Uuid {
    let tenant = env.tenants.add("acme");
    let path = format!("/api/root/reset/tenant/{}", tenant);

    env.categories.seed(tenant, "orders", 2);
    let (status, _) = post(router, &path, token, json!({ "dry_run": true })).await;
    assert_eq!(status, StatusCode::OK);

    let code = issue_tenant_code(router, token, tenant).await;
    let (status, _) = post(router, &path, token, json!({ "confirm_code": code })).await;
    assert_eq!(status, StatusCode::OK);

    env.categories.seed(tenant, "customers", 1);
    env.categories.fail_category("customers");
    let code = issue_tenant_code(router, token, tenant).await;
    let (status, _) = post(router, &path, token, json!({ "confirm_code": code })).await;
    assert_eq!(status, StatusCode::OK);

    tenant
}

#[tokio::test]
async fn listing_is_newest_first_and_filterable() {
    let (router, env) = test_app();
    let token = root_token();
    seed_actions(&router, &env, &token).await;

    let (status, body) = get(&router, "/api/root/reset/actions", &token).await;
    assert_eq!(status, StatusCode::OK);
    let actions = body["data"].as_array().unwrap();
    assert_eq!(actions.len(), 3);
    // newest first: the failed run was last
    assert_eq!(actions[0]["status"], "failed");
    assert_eq!(actions[2]["is_dry_run"], true);

    let (_, body) = get(&router, "/api/root/reset/actions?status=failed", &token).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (_, body) = get(&router, "/api/root/reset/actions?type=system_reset", &token).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    let (_, body) =
        get(&router, "/api/root/reset/actions?type=tenant_reset&status=completed", &token).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn unknown_filter_values_are_rejected() {
    let (router, _env) = test_app();
    let token = root_token();

    let (status, body) = get(&router, "/api/root/reset/actions?type=bogus", &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let (status, _) = get(&router, "/api/root/reset/actions?status=exploded", &token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_limit_and_offset_are_clamped() {
    let (router, env) = test_app();
    let token = root_token();
    seed_actions(&router, &env, &token).await;

    // zero and negative limits clamp up to one row
    let (_, body) = get(&router, "/api/root/reset/actions?limit=0", &token).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    let (_, body) = get(&router, "/api/root/reset/actions?limit=-5", &token).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    // absurd limits are tolerated, not errors
    let (status, body) = get(&router, "/api/root/reset/actions?limit=500000", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);

    let (_, body) = get(&router, "/api/root/reset/actions?offset=2", &token).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    let (_, body) = get(&router, "/api/root/reset/actions?offset=-1", &token).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn detail_includes_cleanup_jobs_and_status_rollup() {
    let (router, env) = test_app();
    let token = root_token();
    let tenant = env.tenants.add("acme");
    env.categories.seed(tenant, "orders", 1);

    let code = issue_tenant_code(&router, &token, tenant).await;
    let (_, body) = post(
        &router,
        &format!("/api/root/reset/tenant/{}", tenant),
        &token,
        json!({ "confirm_code": code, "delete_files": true }),
    )
    .await;
    let action_id = body["data"]["action_id"].as_str().unwrap().to_string();

    let jobs = env.jobs.clone();
    wait_until(|| !jobs.is_empty(), "cleanup job persistence").await;

    let (status, body) =
        get(&router, &format!("/api/root/reset/actions/{}", action_id), &token).await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["id"], action_id);
    assert_eq!(data["status"], "completed");
    assert_eq!(data["cleanup_jobs"].as_array().unwrap().len(), 1);
    assert_eq!(data["job_status_counts"]["queued"], 1);
}

#[tokio::test]
async fn worker_status_updates_show_in_the_rollup() {
    let (router, env) = test_app();
    let token = root_token();
    let tenant = env.tenants.add("acme");
    env.categories.seed(tenant, "orders", 1);

    let code = issue_tenant_code(&router, &token, tenant).await;
    let (_, body) = post(
        &router,
        &format!("/api/root/reset/tenant/{}", tenant),
        &token,
        json!({ "confirm_code": code, "delete_files": true }),
    )
    .await;
    let action_id = body["data"]["action_id"].as_str().unwrap().to_string();

    let jobs = env.jobs.clone();
    wait_until(|| !jobs.is_empty(), "cleanup job persistence").await;
    let job_id = env.jobs.list_sync(action_id.parse().unwrap())[0].id;

    // the out-of-process worker reports progress through the same store
    env.jobs
        .update_status(job_id, JobStatus::Done, Some("removed 3 files".to_string()))
        .await
        .unwrap();

    let (_, body) = get(&router, &format!("/api/root/reset/actions/{}", action_id), &token).await;
    let data = &body["data"];
    assert_eq!(data["job_status_counts"]["done"], 1);
    assert!(data["job_status_counts"].get("queued").is_none());
    assert_eq!(data["cleanup_jobs"][0]["status"], "done");
    assert_eq!(data["cleanup_jobs"][0]["details"], "removed 3 files");

    // an unknown job id is a store-level not-found
    let missing = env.jobs.update_status(Uuid::new_v4(), JobStatus::Running, None).await;
    assert!(missing.is_err());
}

#[tokio::test]
async fn missing_action_detail_is_404() {
    let (router, _env) = test_app();
    let token = root_token();
    let (status, _) =
        get(&router, &format!("/api/root/reset/actions/{}", Uuid::new_v4()), &token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_records_leaves_data_effects_alone() {
    let (router, env) = test_app();
    let token = root_token();
    let tenant = seed_actions(&router, &env, &token).await;

    let (_, body) = get(&router, "/api/root/reset/actions", &token).await;
    let first_id = body["data"][0]["id"].as_str().unwrap().to_string();

    let (status, body) =
        delete(&router, &format!("/api/root/reset/actions/{}", first_id), &token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deleted"], 1);

    // deleting the record does not resurrect anything
    assert_eq!(env.categories.remaining(tenant, "orders"), 0);

    let (status, _) =
        delete(&router, &format!("/api/root/reset/actions/{}", first_id), &token, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn bulk_delete_requires_explicit_ids() {
    let (router, env) = test_app();
    let token = root_token();
    seed_actions(&router, &env, &token).await;

    let (status, body) =
        delete(&router, "/api/root/reset/actions", &token, Some(json!({ "ids": [] }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let (_, body) = get(&router, "/api/root/reset/actions", &token).await;
    let ids: Vec<String> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .take(2)
        .map(|a| a["id"].as_str().unwrap().to_string())
        .collect();

    let (status, body) =
        delete(&router, "/api/root/reset/actions", &token, Some(json!({ "ids": ids }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deleted"], 2);

    let (_, body) = get(&router, "/api/root/reset/actions", &token).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn restricted_surface_requires_a_valid_root_token() {
    let (router, env) = test_app();
    let tenant = env.tenants.add("acme");

    // no token at all
    let (status, _) = request(&router, "GET", "/api/root/reset/actions", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // garbage token
    let (status, _) =
        request(&router, "GET", "/api/root/reset/actions", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // authenticated but not root: every lesser access level is refused
    for access in [ACCESS_READ, ACCESS_EDIT, ACCESS_FULL] {
        let lesser = token_for("analyst", access, Uuid::new_v4());
        let (status, body) = post(
            &router,
            &format!("/api/root/reset/tenant/{}", tenant),
            &lesser,
            json!({ "dry_run": true }),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN, "access {} passed the gate", access);
        assert_eq!(body["code"], "FORBIDDEN");
    }

    // the public surface stays open
    let (status, body) = request(&router, "GET", "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
}

#[tokio::test]
async fn tenant_registry_round_trip() {
    let (router, _env) = test_app();
    let token = root_token();

    let (status, body) = post(
        &router,
        "/api/root/tenant",
        &token,
        json!({ "name": "acme-retail", "display_name": "Acme Retail" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = get(&router, &format!("/api/root/tenant/{}", id), &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "acme-retail");

    let (_, body) = get(&router, "/api/root/tenant", &token).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}
