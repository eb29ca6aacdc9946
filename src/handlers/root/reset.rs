// POST /api/root/reset/* - destructive reset execution (dry-run or real)

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::database::models::OperationType;
use crate::governor::{PlanOptions, ResetOutcome, ResetRequest};
use crate::middleware::{ApiResponse, ApiResult, Operator};
use crate::state::AppState;

fn default_true() -> bool {
    true
}

/// Both scopes share one request shape; `dry_run` selects preview vs.
/// real execution rather than a separate endpoint.
#[derive(Debug, Deserialize)]
pub struct ResetBody {
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default)]
    pub delete_files: bool,
    pub confirm_code: Option<String>,
    #[serde(default = "default_true")]
    pub preserve_settings: bool,
    #[serde(default = "default_true")]
    pub preserve_shared_catalogs: bool,
    pub backup_reference: Option<String>,
}

impl ResetBody {
    fn into_request(self, operation: OperationType, target_id: Option<Uuid>) -> ResetRequest {
        ResetRequest {
            operation,
            target_id,
            dry_run: self.dry_run,
            delete_files: self.delete_files,
            confirm_code: self.confirm_code,
            options: PlanOptions {
                preserve_settings: self.preserve_settings,
                preserve_shared_catalogs: self.preserve_shared_catalogs,
            },
            backup_reference: self.backup_reference,
        }
    }
}

/// POST /api/root/reset/tenant/:id - wipe (or preview wiping) one tenant
pub async fn tenant_reset(
    State(state): State<AppState>,
    Extension(operator): Extension<Operator>,
    Path(tenant_id): Path<Uuid>,
    Json(body): Json<ResetBody>,
) -> ApiResult<ResetOutcome> {
    let request = body.into_request(OperationType::TenantReset, Some(tenant_id));
    let outcome = state.governor.execute(operator.id, request).await?;
    Ok(ApiResponse::success(outcome))
}

/// POST /api/root/reset/system - wipe (or preview wiping) all tenant data
pub async fn system_reset(
    State(state): State<AppState>,
    Extension(operator): Extension<Operator>,
    Json(body): Json<ResetBody>,
) -> ApiResult<ResetOutcome> {
    let request = body.into_request(OperationType::SystemReset, None);
    let outcome = state.governor.execute(operator.id, request).await?;
    Ok(ApiResponse::success(outcome))
}
