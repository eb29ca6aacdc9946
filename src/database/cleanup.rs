use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::database::models::{CleanupJob, CleanupJobDraft, JobStatus};
use crate::governor::store::{CleanupJobStore, StoreError};

/// Postgres-backed cleanup job queue. Rows are consumed by an
/// out-of-process worker; this side only creates and inspects them.
pub struct PgCleanupJobStore {
    pool: PgPool,
}

impl PgCleanupJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_job(row: &PgRow) -> Result<CleanupJob, StoreError> {
    let status: String = row.try_get("status").map_err(StoreError::from)?;
    Ok(CleanupJob {
        id: row.try_get("id").map_err(StoreError::from)?,
        reset_action_id: row.try_get("reset_action_id").map_err(StoreError::from)?,
        file_list: row.try_get("file_list").map_err(StoreError::from)?,
        status: JobStatus::parse(&status)
            .ok_or_else(|| StoreError::Query(format!("unknown job status: {}", status)))?,
        details: row.try_get("details").map_err(StoreError::from)?,
        created_at: row.try_get("created_at").map_err(StoreError::from)?,
    })
}

#[async_trait]
impl CleanupJobStore for PgCleanupJobStore {
    async fn create(&self, draft: CleanupJobDraft) -> Result<CleanupJob, StoreError> {
        let row = sqlx::query(
            "INSERT INTO cleanup_jobs (id, reset_action_id, file_list, status, created_at) \
             VALUES ($1, $2, $3, 'queued', now()) \
             RETURNING id, reset_action_id, file_list, status, details, created_at",
        )
        .bind(draft.id)
        .bind(draft.reset_action_id)
        .bind(&draft.file_list)
        .fetch_one(&self.pool)
        .await?;
        row_to_job(&row)
    }

    async fn list_for_action(&self, reset_action_id: Uuid) -> Result<Vec<CleanupJob>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, reset_action_id, file_list, status, details, created_at \
             FROM cleanup_jobs WHERE reset_action_id = $1 ORDER BY created_at",
        )
        .bind(reset_action_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_job).collect()
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: JobStatus,
        details: Option<String>,
    ) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE cleanup_jobs SET status = $2, details = $3 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .bind(details)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("cleanup job {} not found", id)));
        }
        Ok(())
    }
}
