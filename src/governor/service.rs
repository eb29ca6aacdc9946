use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};
use uuid::Uuid;

use crate::database::models::{
    ActionStatus, OperationType, ResetActionDraft, ResetActionPatch,
};
use crate::governor::confirm::ConfirmationStore;
use crate::governor::dispatch::FollowUpDispatcher;
use crate::governor::error::GovernorError;
use crate::governor::executor::{run_plan, summarize_errors};
use crate::governor::plan::{asset_paths, build_plan, PlanOptions, ResetScope};
use crate::governor::rate_limit::RateLimiter;
use crate::governor::store::{CategoryStore, LedgerStore, TenantDirectory};

/// One reset invocation, dry-run or real, as seen by the governor. Role
/// logic never appears here: the boundary middleware has already resolved
/// the caller into an authorized operator id.
#[derive(Debug, Clone)]
pub struct ResetRequest {
    pub operation: OperationType,
    pub target_id: Option<Uuid>,
    pub dry_run: bool,
    pub delete_files: bool,
    pub confirm_code: Option<String>,
    pub options: PlanOptions,
    pub backup_reference: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResetOutcome {
    pub success: bool,
    pub dry_run: bool,
    pub action_id: Uuid,
    pub category_counts: BTreeMap<String, u64>,
    pub total_affected_rows: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_reference: Option<String>,
    pub file_cleanup_queued: bool,
    pub errors: Vec<String>,
}

/// The destructive data reset governor.
///
/// Real execution path: rate limit -> confirmation verify-and-consume ->
/// ledger create (pending) -> executor -> ledger finalize -> follow-up
/// dispatch. Dry-runs skip the gates, mutate nothing, and always finalize
/// `completed`.
pub struct ResetGovernor {
    ledger: Arc<dyn LedgerStore>,
    categories: Arc<dyn CategoryStore>,
    tenants: Arc<dyn TenantDirectory>,
    confirmations: Arc<ConfirmationStore>,
    limiter: RateLimiter,
    dispatcher: FollowUpDispatcher,
    /// Serializes real-run admission so the rate-limit count and the
    /// ledger insert it gates form one atomic check-and-record.
    admission: Mutex<()>,
}

impl ResetGovernor {
    pub fn new(
        ledger: Arc<dyn LedgerStore>,
        categories: Arc<dyn CategoryStore>,
        tenants: Arc<dyn TenantDirectory>,
        confirmations: Arc<ConfirmationStore>,
        limiter: RateLimiter,
        dispatcher: FollowUpDispatcher,
    ) -> Self {
        Self {
            ledger,
            categories,
            tenants,
            confirmations,
            limiter,
            dispatcher,
            admission: Mutex::new(()),
        }
    }

    pub fn confirmations(&self) -> &ConfirmationStore {
        &self.confirmations
    }

    pub async fn execute(
        &self,
        operator_id: Uuid,
        request: ResetRequest,
    ) -> Result<ResetOutcome, GovernorError> {
        let scope = self.validate_scope(&request)?;

        if let ResetScope::Tenant(id) = scope {
            let known = self
                .tenants
                .exists(id)
                .await
                .map_err(|e| GovernorError::internal(format!("tenant lookup failed: {}", e), None))?;
            if !known {
                return Err(GovernorError::TargetNotFound(id.to_string()));
            }
        }

        let backup_reference = self.resolve_backup_reference(&request)?;

        // Held from the window count through the ledger insert; without it
        // two concurrent real runs could both observe a count under the
        // limit. Dry-runs are never limited and skip the lock.
        let admission = if request.dry_run {
            None
        } else {
            Some(self.admission.lock().await)
        };

        if !request.dry_run {
            // Rate limiting applies uniformly to every real operation;
            // previews stay available even for a throttled operator.
            let decision = self
                .limiter
                .check(operator_id, request.operation, request.target_id)
                .await;
            if let Some(exceeded) = decision.exceeded {
                return Err(GovernorError::RateLimited {
                    window: exceeded.window.to_string(),
                    observed: exceeded.observed,
                    limit: exceeded.limit,
                });
            }

            let code = request.confirm_code.as_deref().ok_or_else(|| {
                GovernorError::Validation("confirm_code is required for a real reset".to_string())
            })?;
            self.confirmations
                .verify_and_consume(request.operation, request.target_id, code)
                .map_err(|f| GovernorError::Confirmation {
                    message: f.message,
                    expected_phrase: f.expected_phrase,
                })?;
        }

        let plan = build_plan(request.operation, request.options);

        // The pending row goes in before any data is touched; a crash from
        // here on still leaves a discoverable record.
        let action = self
            .ledger
            .create(ResetActionDraft {
                operator_id,
                operation_type: request.operation,
                target_id: request.target_id,
                is_dry_run: request.dry_run,
                backup_reference: backup_reference.clone(),
                request_payload: json!({
                    "dry_run": request.dry_run,
                    "delete_files": request.delete_files,
                    "preserve_settings": request.options.preserve_settings,
                    "preserve_shared_catalogs": request.options.preserve_shared_catalogs,
                    "confirm_code": request.confirm_code,
                    "backup_reference": backup_reference,
                }),
            })
            .await
            .map_err(|e| GovernorError::internal(format!("ledger create failed: {}", e), None))?;

        // The row now counts toward the windows; later requests see it.
        drop(admission);

        info!(action_id = %action.id, %operator_id, operation = request.operation.as_str(),
            dry_run = request.dry_run, categories = plan.len(), "reset action started");

        let outcomes = run_plan(self.categories.as_ref(), &plan, &scope, request.dry_run).await;

        let mut category_counts = BTreeMap::new();
        let mut errors = Vec::new();
        for outcome in &outcomes {
            match &outcome.error {
                // A failed category reports no count; implying one was
                // touched would be dishonest accounting.
                Some(e) => errors.push(format!("{}: {}", outcome.category, e)),
                None => {
                    category_counts.insert(outcome.category.to_string(), outcome.rows);
                }
            }
        }

        // A dry-run cannot fail on data errors, only record them; a real
        // run with any category failure finalizes as failed.
        let status = if request.dry_run || errors.is_empty() {
            ActionStatus::Completed
        } else {
            ActionStatus::Failed
        };

        let action = self
            .ledger
            .finalize(
                action.id,
                ResetActionPatch {
                    status,
                    category_counts: category_counts.clone(),
                    error_summary: summarize_errors(&outcomes),
                    completed_at: Utc::now(),
                },
            )
            .await
            .map_err(|e| {
                error!(action_id = %action.id, error = %e, "ledger finalize failed");
                GovernorError::internal(
                    format!("ledger finalize failed: {}", e),
                    Some(action.id),
                )
            })?;

        // Follow-ups only after the terminal status is durable, and only
        // for real runs. Neither call is awaited.
        let mut file_cleanup_queued = false;
        if !request.dry_run {
            if request.delete_files {
                file_cleanup_queued = self
                    .dispatcher
                    .enqueue_cleanup(action.id, asset_paths(&scope))
                    .is_some();
            }
            self.dispatcher.notify(
                action.id,
                request.operation,
                status == ActionStatus::Completed,
                format!(
                    "{} affected {} rows across {} categories",
                    request.operation.as_str(),
                    action.total_affected_rows(),
                    action.category_counts.len()
                ),
            );
        }

        Ok(ResetOutcome {
            success: errors.is_empty(),
            dry_run: request.dry_run,
            action_id: action.id,
            total_affected_rows: action.total_affected_rows(),
            category_counts,
            backup_reference,
            file_cleanup_queued,
            errors,
        })
    }

    fn validate_scope(&self, request: &ResetRequest) -> Result<ResetScope, GovernorError> {
        match (request.operation, request.target_id) {
            (OperationType::TenantReset, Some(id)) => Ok(ResetScope::Tenant(id)),
            (OperationType::TenantReset, None) => Err(GovernorError::Validation(
                "target_id is required for a tenant reset".to_string(),
            )),
            (OperationType::SystemReset, None) => Ok(ResetScope::System),
            (OperationType::SystemReset, Some(_)) => Err(GovernorError::Validation(
                "a system reset takes no target_id".to_string(),
            )),
        }
    }

    /// Real tenant resets fall back to an auto-generated backup reference
    /// when none is supplied; real system resets always require one. A
    /// dry-run records none.
    fn resolve_backup_reference(
        &self,
        request: &ResetRequest,
    ) -> Result<Option<String>, GovernorError> {
        if request.dry_run {
            return Ok(None);
        }
        let supplied = request
            .backup_reference
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        match (request.operation, supplied) {
            (_, Some(reference)) => Ok(Some(reference.to_string())),
            (OperationType::TenantReset, None) => {
                Ok(Some(format!("bk-auto-{}", Uuid::new_v4().simple())))
            }
            (OperationType::SystemReset, None) => Err(GovernorError::Validation(
                "backup_reference is required for a system reset".to_string(),
            )),
        }
    }
}
