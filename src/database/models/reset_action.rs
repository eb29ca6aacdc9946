use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

/// The two destructive operations the governor handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    TenantReset,
    SystemReset,
}

impl OperationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationType::TenantReset => "tenant_reset",
            OperationType::SystemReset => "system_reset",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "tenant_reset" => Some(OperationType::TenantReset),
            "system_reset" => Some(OperationType::SystemReset),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Pending,
    Completed,
    Failed,
}

impl ActionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionStatus::Pending => "pending",
            ActionStatus::Completed => "completed",
            ActionStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ActionStatus::Pending),
            "completed" => Some(ActionStatus::Completed),
            "failed" => Some(ActionStatus::Failed),
            _ => None,
        }
    }
}

/// One audit record per attempted reset, dry-run or real.
///
/// A non-dry-run row is created with `status = pending` before the executor
/// touches any data, so a crash mid-execution still leaves a discoverable
/// record. `category_counts` holds category name -> affected row count; a
/// category preserved by request options never appears in the map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetAction {
    pub id: Uuid,
    pub operator_id: Uuid,
    pub operation_type: OperationType,
    pub target_id: Option<Uuid>,
    pub is_dry_run: bool,
    /// Required non-empty for every real action; None only for dry-runs.
    pub backup_reference: Option<String>,
    /// Opaque snapshot of the request for audit replay.
    pub request_payload: Value,
    pub status: ActionStatus,
    pub category_counts: BTreeMap<String, u64>,
    pub error_summary: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ResetAction {
    pub fn total_affected_rows(&self) -> u64 {
        self.category_counts.values().sum()
    }
}

/// Fields the caller supplies when opening a ledger row.
#[derive(Debug, Clone)]
pub struct ResetActionDraft {
    pub operator_id: Uuid,
    pub operation_type: OperationType,
    pub target_id: Option<Uuid>,
    pub is_dry_run: bool,
    pub backup_reference: Option<String>,
    pub request_payload: Value,
}

/// Terminal patch applied exactly once per action.
#[derive(Debug, Clone)]
pub struct ResetActionPatch {
    pub status: ActionStatus,
    pub category_counts: BTreeMap<String, u64>,
    pub error_summary: Option<String>,
    pub completed_at: DateTime<Utc>,
}

/// Ledger listing filters; limit/offset are clamped by the store.
#[derive(Debug, Clone, Default)]
pub struct ActionFilter {
    pub operation_type: Option<OperationType>,
    pub status: Option<ActionStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ActionFilter {
    /// Clamps caller-supplied pagination into [1, max] / [0, ..] so a
    /// listing can never become an unbounded scan.
    pub fn clamped(&self, max_limit: i64) -> (i64, i64) {
        let limit = self.limit.unwrap_or(100).clamp(1, max_limit.max(1));
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}
