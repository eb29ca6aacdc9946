use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, QueryBuilder, Row};
use std::collections::BTreeMap;
use uuid::Uuid;

use crate::database::models::{
    ActionFilter, ActionStatus, OperationType, ResetAction, ResetActionDraft, ResetActionPatch,
};
use crate::governor::store::{LedgerStore, StoreError};

const ACTION_COLUMNS: &str = "id, operator_id, operation_type, target_id, is_dry_run, \
     backup_reference, request_payload, status, category_counts, error_summary, \
     created_at, completed_at";

/// Postgres-backed action ledger.
pub struct PgLedgerStore {
    pool: PgPool,
    max_list_limit: i64,
}

impl PgLedgerStore {
    pub fn new(pool: PgPool, max_list_limit: i64) -> Self {
        Self { pool, max_list_limit }
    }
}

fn row_to_action(row: &PgRow) -> Result<ResetAction, StoreError> {
    let operation_type: String = row.try_get("operation_type").map_err(StoreError::from)?;
    let status: String = row.try_get("status").map_err(StoreError::from)?;
    let counts_value: serde_json::Value =
        row.try_get("category_counts").map_err(StoreError::from)?;
    let category_counts: BTreeMap<String, u64> = serde_json::from_value(counts_value)
        .map_err(|e| StoreError::Query(format!("malformed category_counts: {}", e)))?;

    Ok(ResetAction {
        id: row.try_get("id").map_err(StoreError::from)?,
        operator_id: row.try_get("operator_id").map_err(StoreError::from)?,
        operation_type: OperationType::parse(&operation_type)
            .ok_or_else(|| StoreError::Query(format!("unknown operation_type: {}", operation_type)))?,
        target_id: row.try_get("target_id").map_err(StoreError::from)?,
        is_dry_run: row.try_get("is_dry_run").map_err(StoreError::from)?,
        backup_reference: row.try_get("backup_reference").map_err(StoreError::from)?,
        request_payload: row.try_get("request_payload").map_err(StoreError::from)?,
        status: ActionStatus::parse(&status)
            .ok_or_else(|| StoreError::Query(format!("unknown status: {}", status)))?,
        category_counts,
        error_summary: row.try_get("error_summary").map_err(StoreError::from)?,
        created_at: row.try_get("created_at").map_err(StoreError::from)?,
        completed_at: row.try_get("completed_at").map_err(StoreError::from)?,
    })
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn create(&self, draft: ResetActionDraft) -> Result<ResetAction, StoreError> {
        let sql = format!(
            "INSERT INTO reset_actions \
             (id, operator_id, operation_type, target_id, is_dry_run, backup_reference, \
              request_payload, status, category_counts, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending', '{{}}'::jsonb, now()) \
             RETURNING {}",
            ACTION_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(Uuid::new_v4())
            .bind(draft.operator_id)
            .bind(draft.operation_type.as_str())
            .bind(draft.target_id)
            .bind(draft.is_dry_run)
            .bind(draft.backup_reference)
            .bind(draft.request_payload)
            .fetch_one(&self.pool)
            .await?;
        row_to_action(&row)
    }

    async fn finalize(&self, id: Uuid, patch: ResetActionPatch) -> Result<ResetAction, StoreError> {
        let counts = serde_json::to_value(&patch.category_counts)
            .map_err(|e| StoreError::Query(format!("unserializable category_counts: {}", e)))?;
        let sql = format!(
            "UPDATE reset_actions \
             SET status = $2, category_counts = $3, error_summary = $4, completed_at = $5 \
             WHERE id = $1 \
             RETURNING {}",
            ACTION_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(id)
            .bind(patch.status.as_str())
            .bind(counts)
            .bind(patch.error_summary)
            .bind(patch.completed_at)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("reset action {} not found", id)))?;
        row_to_action(&row)
    }

    async fn get(&self, id: Uuid) -> Result<Option<ResetAction>, StoreError> {
        let sql = format!("SELECT {} FROM reset_actions WHERE id = $1", ACTION_COLUMNS);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(row_to_action).transpose()
    }

    async fn list(&self, filter: ActionFilter) -> Result<Vec<ResetAction>, StoreError> {
        let (limit, offset) = filter.clamped(self.max_list_limit);

        let mut builder = QueryBuilder::new(format!(
            "SELECT {} FROM reset_actions WHERE true",
            ACTION_COLUMNS
        ));
        if let Some(operation) = filter.operation_type {
            builder.push(" AND operation_type = ").push_bind(operation.as_str());
        }
        if let Some(status) = filter.status {
            builder.push(" AND status = ").push_bind(status.as_str());
        }
        builder.push(" ORDER BY created_at DESC LIMIT ").push_bind(limit);
        builder.push(" OFFSET ").push_bind(offset);

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(row_to_action).collect()
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM reset_actions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, StoreError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let result = sqlx::query("DELETE FROM reset_actions WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn count_real_since(
        &self,
        operator_id: Uuid,
        operation_type: OperationType,
        target_id: Option<Uuid>,
        since: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let mut builder = QueryBuilder::new(
            "SELECT COUNT(*) FROM reset_actions WHERE is_dry_run = false",
        );
        builder.push(" AND operator_id = ").push_bind(operator_id);
        builder.push(" AND operation_type = ").push_bind(operation_type.as_str());
        builder.push(" AND created_at >= ").push_bind(since);
        if let Some(target) = target_id {
            builder.push(" AND target_id = ").push_bind(target);
        }

        let row = builder.build().fetch_one(&self.pool).await?;
        let count: i64 = row.try_get(0).map_err(StoreError::from)?;
        Ok(count.max(0) as u64)
    }
}
