use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::database::models::{
    ActionFilter, CleanupJob, CleanupJobDraft, JobStatus, OperationType, ResetAction,
    ResetActionDraft, ResetActionPatch, TenantDraft, TenantInfo,
};
use crate::governor::plan::{CategoryDescriptor, ResetScope};

/// Errors surfaced by the storage seams the governor depends on.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound("record not found".to_string()),
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(err.to_string())
            }
            other => StoreError::Query(other.to_string()),
        }
    }
}

/// Durable audit history of reset attempts.
///
/// `create` must happen-before executor invocation for real runs, and
/// `finalize` must happen-before follow-up dispatch.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn create(&self, draft: ResetActionDraft) -> Result<ResetAction, StoreError>;

    /// Applies the terminal status patch. Errors if the row is missing.
    async fn finalize(&self, id: Uuid, patch: ResetActionPatch) -> Result<ResetAction, StoreError>;

    async fn get(&self, id: Uuid) -> Result<Option<ResetAction>, StoreError>;

    async fn list(&self, filter: ActionFilter) -> Result<Vec<ResetAction>, StoreError>;

    /// Deletes one audit row; returns whether a row existed. Never touches
    /// the (already irreversible) underlying data effects.
    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, StoreError>;

    /// Counts real (non-dry-run) actions by this operator since `since`,
    /// scoped to the target for tenant resets. Rate-limiter support.
    async fn count_real_since(
        &self,
        operator_id: Uuid,
        operation_type: OperationType,
        target_id: Option<Uuid>,
        since: DateTime<Utc>,
    ) -> Result<u64, StoreError>;
}

/// Persistence for asynchronous file-cleanup jobs.
#[async_trait]
pub trait CleanupJobStore: Send + Sync {
    async fn create(&self, draft: CleanupJobDraft) -> Result<CleanupJob, StoreError>;

    async fn list_for_action(&self, reset_action_id: Uuid) -> Result<Vec<CleanupJob>, StoreError>;

    async fn update_status(
        &self,
        id: Uuid,
        status: JobStatus,
        details: Option<String>,
    ) -> Result<(), StoreError>;
}

/// Count/purge access to one data category within a reset scope.
///
/// Implementations must guarantee `count` performs no mutation; `purge`
/// returns the number of rows removed.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn count(
        &self,
        category: &CategoryDescriptor,
        scope: &ResetScope,
    ) -> Result<u64, StoreError>;

    async fn purge(
        &self,
        category: &CategoryDescriptor,
        scope: &ResetScope,
    ) -> Result<u64, StoreError>;
}

/// Tenant registry lookups the governor needs to validate targets.
#[async_trait]
pub trait TenantDirectory: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<TenantInfo>, StoreError>;

    async fn exists(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.get(id).await?.is_some())
    }

    async fn list(&self) -> Result<Vec<TenantInfo>, StoreError>;

    async fn create(&self, draft: TenantDraft) -> Result<TenantInfo, StoreError>;
}
