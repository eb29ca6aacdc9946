// POST /api/root/reset/*/confirmation - one-time confirmation issuance

use axum::extract::{Path, State};
use uuid::Uuid;

use crate::database::models::OperationType;
use crate::error::ApiError;
use crate::governor::IssuedConfirmation;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

/// POST /api/root/reset/tenant/:id/confirmation
///
/// Issues a fresh one-time code scoped to resetting this tenant. The code
/// is returned exactly once; only its hash is retained server-side.
pub async fn tenant_confirmation(
    State(state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
) -> ApiResult<IssuedConfirmation> {
    if state.tenants.get(tenant_id).await?.is_none() {
        return Err(ApiError::not_found(format!("unknown target: {}", tenant_id)));
    }

    let issued = state
        .governor
        .confirmations()
        .issue(OperationType::TenantReset, Some(tenant_id));
    Ok(ApiResponse::created(issued))
}

/// POST /api/root/reset/system/confirmation
pub async fn system_confirmation(State(state): State<AppState>) -> ApiResult<IssuedConfirmation> {
    let issued = state
        .governor
        .confirmations()
        .issue(OperationType::SystemReset, None);
    Ok(ApiResponse::created(issued))
}
