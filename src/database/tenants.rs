use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::database::models::{TenantDraft, TenantInfo};
use crate::governor::store::{StoreError, TenantDirectory};

/// Postgres-backed tenant registry.
pub struct PgTenantStore {
    pool: PgPool,
}

impl PgTenantStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_tenant(row: &PgRow) -> Result<TenantInfo, StoreError> {
    Ok(TenantInfo {
        id: row.try_get("id").map_err(StoreError::from)?,
        name: row.try_get("name").map_err(StoreError::from)?,
        display_name: row.try_get("display_name").map_err(StoreError::from)?,
        is_active: row.try_get("is_active").map_err(StoreError::from)?,
        created_at: row.try_get("created_at").map_err(StoreError::from)?,
        updated_at: row.try_get("updated_at").map_err(StoreError::from)?,
    })
}

#[async_trait]
impl TenantDirectory for PgTenantStore {
    async fn get(&self, id: Uuid) -> Result<Option<TenantInfo>, StoreError> {
        let row = sqlx::query(
            "SELECT id, name, display_name, is_active, created_at, updated_at \
             FROM tenants WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.as_ref().map(row_to_tenant).transpose()
    }

    async fn list(&self) -> Result<Vec<TenantInfo>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, name, display_name, is_active, created_at, updated_at \
             FROM tenants ORDER BY created_at DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_tenant).collect()
    }

    async fn create(&self, draft: TenantDraft) -> Result<TenantInfo, StoreError> {
        draft.validate().map_err(StoreError::Query)?;
        let row = sqlx::query(
            "INSERT INTO tenants (id, name, display_name, is_active, created_at, updated_at) \
             VALUES ($1, $2, $3, true, now(), now()) \
             RETURNING id, name, display_name, is_active, created_at, updated_at",
        )
        .bind(Uuid::new_v4())
        .bind(&draft.name)
        .bind(&draft.display_name)
        .fetch_one(&self.pool)
        .await?;
        row_to_tenant(&row)
    }
}
