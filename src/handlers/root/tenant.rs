// /api/root/tenant - tenant registry

use axum::extract::{Path, State};
use axum::Json;
use uuid::Uuid;

use crate::database::models::{TenantDraft, TenantInfo};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// GET /api/root/tenant - list registered tenants
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<TenantInfo>> {
    let tenants = state.tenants.list().await?;
    Ok(ApiResponse::success(tenants))
}

/// GET /api/root/tenant/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<TenantInfo> {
    let tenant = state
        .tenants
        .get(id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("tenant {} not found", id)))?;
    Ok(ApiResponse::success(tenant))
}

/// POST /api/root/tenant - register a tenant
pub async fn create(
    State(state): State<AppState>,
    Json(draft): Json<TenantDraft>,
) -> ApiResult<TenantInfo> {
    draft.validate().map_err(ApiError::bad_request)?;
    let tenant = state.tenants.create(draft).await?;
    Ok(ApiResponse::created(tenant))
}
