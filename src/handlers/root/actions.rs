// /api/root/reset/actions - the reset audit ledger API

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::{ActionFilter, ActionStatus, CleanupJob, OperationType, ResetAction};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ActionListQuery {
    /// Operation type filter: tenant_reset | system_reset
    #[serde(rename = "type")]
    pub operation_type: Option<String>,
    /// Status filter: pending | completed | failed
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /api/root/reset/actions - list ledger rows, newest first
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ActionListQuery>,
) -> ApiResult<Vec<ResetAction>> {
    let operation_type = match query.operation_type.as_deref() {
        None => None,
        Some(raw) => Some(OperationType::parse(raw).ok_or_else(|| {
            ApiError::bad_request(format!("unknown operation type filter: {}", raw))
        })?),
    };
    let status = match query.status.as_deref() {
        None => None,
        Some(raw) => Some(
            ActionStatus::parse(raw)
                .ok_or_else(|| ApiError::bad_request(format!("unknown status filter: {}", raw)))?,
        ),
    };

    let actions = state
        .ledger
        .list(ActionFilter {
            operation_type,
            status,
            limit: query.limit,
            offset: query.offset,
        })
        .await?;
    Ok(ApiResponse::success(actions))
}

#[derive(Debug, Serialize)]
pub struct ActionDetail {
    #[serde(flatten)]
    pub action: ResetAction,
    pub cleanup_jobs: Vec<CleanupJob>,
    pub job_status_counts: Value,
}

/// GET /api/root/reset/actions/:id - one ledger row plus its cleanup jobs
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<ActionDetail> {
    let action = state
        .ledger
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("reset action {} not found", id)))?;

    let cleanup_jobs = state.jobs.list_for_action(id).await?;
    let mut counts = std::collections::BTreeMap::new();
    for job in &cleanup_jobs {
        *counts.entry(job.status.as_str()).or_insert(0u64) += 1;
    }

    Ok(ApiResponse::success(ActionDetail {
        action,
        cleanup_jobs,
        job_status_counts: json!(counts),
    }))
}

/// DELETE /api/root/reset/actions/:id
///
/// Removes the audit record only; the underlying data effects are
/// irreversible and untouched.
pub async fn delete_one(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Value> {
    let deleted = state.ledger.delete(id).await?;
    if !deleted {
        return Err(ApiError::not_found(format!("reset action {} not found", id)));
    }
    Ok(ApiResponse::success(json!({ "deleted": 1 })))
}

#[derive(Debug, Deserialize)]
pub struct BulkDeleteBody {
    pub ids: Vec<Uuid>,
}

/// DELETE /api/root/reset/actions - bulk deletion by id
pub async fn delete_many(
    State(state): State<AppState>,
    Json(body): Json<BulkDeleteBody>,
) -> ApiResult<Value> {
    if body.ids.is_empty() {
        return Err(ApiError::bad_request("ids must not be empty"));
    }
    let deleted = state.ledger.delete_many(&body.ids).await?;
    Ok(ApiResponse::success(json!({ "deleted": deleted })))
}
