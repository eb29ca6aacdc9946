use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::database::manager::DatabaseManager;
use crate::governor::plan::{CategoryDescriptor, ResetScope};
use crate::governor::store::{CategoryStore, StoreError};

/// Postgres-backed category access.
///
/// Table names come exclusively from the static descriptor list (and are
/// quoted anyway); the scope decides the WHERE clause. No SQL is ever
/// assembled from request input.
pub struct PgCategoryStore {
    pool: PgPool,
}

impl PgCategoryStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn statement(
        verb: &str,
        category: &CategoryDescriptor,
        scope: &ResetScope,
    ) -> Result<String, StoreError> {
        let table = DatabaseManager::quote_identifier(category.table);
        match scope {
            ResetScope::Tenant(_) => {
                if !category.tenant_scoped {
                    // The planner never puts a shared category into a
                    // tenant plan; refuse rather than purge shared rows.
                    return Err(StoreError::Query(format!(
                        "category {} is not tenant-scoped",
                        category.name
                    )));
                }
                Ok(format!("{} {} WHERE tenant_id = $1", verb, table))
            }
            ResetScope::System => Ok(format!("{} {}", verb, table)),
        }
    }
}

#[async_trait]
impl CategoryStore for PgCategoryStore {
    async fn count(
        &self,
        category: &CategoryDescriptor,
        scope: &ResetScope,
    ) -> Result<u64, StoreError> {
        let sql = Self::statement("SELECT COUNT(*) FROM", category, scope)?;
        let query = sqlx::query(&sql);
        let row = match scope {
            ResetScope::Tenant(id) => query.bind(id).fetch_one(&self.pool).await?,
            ResetScope::System => query.fetch_one(&self.pool).await?,
        };
        let count: i64 = row.try_get(0).map_err(StoreError::from)?;
        Ok(count.max(0) as u64)
    }

    async fn purge(
        &self,
        category: &CategoryDescriptor,
        scope: &ResetScope,
    ) -> Result<u64, StoreError> {
        let sql = Self::statement("DELETE FROM", category, scope)?;
        let query = sqlx::query(&sql);
        let result = match scope {
            ResetScope::Tenant(id) => query.bind(id).execute(&self.pool).await?,
            ResetScope::System => query.execute(&self.pool).await?,
        };
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::governor::plan::CATEGORIES;
    use uuid::Uuid;

    #[test]
    fn tenant_scope_filters_by_tenant_id() {
        let orders = CATEGORIES.iter().find(|c| c.name == "orders").unwrap();
        let sql = PgCategoryStore::statement(
            "DELETE FROM",
            orders,
            &ResetScope::Tenant(Uuid::new_v4()),
        )
        .unwrap();
        assert_eq!(sql, "DELETE FROM \"orders\" WHERE tenant_id = $1");
    }

    #[test]
    fn shared_category_refuses_tenant_scope() {
        let shared = CATEGORIES.iter().find(|c| c.name == "shared_catalogs").unwrap();
        let err = PgCategoryStore::statement(
            "SELECT COUNT(*) FROM",
            shared,
            &ResetScope::Tenant(Uuid::new_v4()),
        );
        assert!(err.is_err());
        assert!(PgCategoryStore::statement("SELECT COUNT(*) FROM", shared, &ResetScope::System).is_ok());
    }
}
