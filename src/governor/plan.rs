use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::OperationType;

/// What a reset applies to: one tenant's rows, or every tenant's rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetScope {
    Tenant(Uuid),
    System,
}

impl ResetScope {
    pub fn tenant_id(&self) -> Option<Uuid> {
        match self {
            ResetScope::Tenant(id) => Some(*id),
            ResetScope::System => None,
        }
    }
}

/// Classification driving the preservation flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryKind {
    /// Transactional retail rows; always in the plan.
    Operational,
    /// Per-tenant configuration; removed when settings are preserved.
    Settings,
    /// Catalog data shared across tenants; removed when catalogs are
    /// preserved, and never part of a single-tenant plan.
    SharedCatalog,
}

/// One statically declared data category: a named group of rows purged as
/// one unit. The list below replaces any runtime table-name assembly; the
/// planner is a pure function over it.
#[derive(Debug)]
pub struct CategoryDescriptor {
    pub name: &'static str,
    pub table: &'static str,
    /// Dependency rank; lower ranks (children) are processed first so
    /// deletion never violates referential constraints.
    pub rank: u8,
    pub kind: CategoryKind,
    /// Whether rows carry a tenant_id column. Shared catalogs do not.
    pub tenant_scoped: bool,
}

/// Full dependency-ordered category list for the retail domain.
/// Children strictly before parents.
pub const CATEGORIES: &[CategoryDescriptor] = &[
    CategoryDescriptor { name: "swap_items", table: "swap_items", rank: 10, kind: CategoryKind::Operational, tenant_scoped: true },
    CategoryDescriptor { name: "swaps", table: "swaps", rank: 20, kind: CategoryKind::Operational, tenant_scoped: true },
    CategoryDescriptor { name: "order_lines", table: "order_lines", rank: 30, kind: CategoryKind::Operational, tenant_scoped: true },
    CategoryDescriptor { name: "orders", table: "orders", rank: 40, kind: CategoryKind::Operational, tenant_scoped: true },
    CategoryDescriptor { name: "stock_levels", table: "stock_levels", rank: 50, kind: CategoryKind::Operational, tenant_scoped: true },
    CategoryDescriptor { name: "inventory_items", table: "inventory_items", rank: 60, kind: CategoryKind::Operational, tenant_scoped: true },
    CategoryDescriptor { name: "customers", table: "customers", rank: 70, kind: CategoryKind::Operational, tenant_scoped: true },
    CategoryDescriptor { name: "staff_members", table: "staff_members", rank: 80, kind: CategoryKind::Operational, tenant_scoped: true },
    CategoryDescriptor { name: "store_settings", table: "store_settings", rank: 90, kind: CategoryKind::Settings, tenant_scoped: true },
    CategoryDescriptor { name: "shared_catalogs", table: "shared_catalogs", rank: 100, kind: CategoryKind::SharedCatalog, tenant_scoped: false },
];

/// Preservation flags; a preserved category is removed from the plan
/// entirely so it never appears in `category_counts`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PlanOptions {
    pub preserve_settings: bool,
    pub preserve_shared_catalogs: bool,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self { preserve_settings: true, preserve_shared_catalogs: true }
    }
}

/// Computes the ordered categories to purge (or count, for a dry-run) for
/// the given operation. The same plan backs both passes so preview counts
/// are comparable to the real run.
pub fn build_plan(operation: OperationType, options: PlanOptions) -> Vec<&'static CategoryDescriptor> {
    CATEGORIES
        .iter()
        .filter(|c| match c.kind {
            CategoryKind::Operational => true,
            CategoryKind::Settings => !options.preserve_settings,
            CategoryKind::SharedCatalog => {
                // Shared rows belong to no single tenant; a tenant reset
                // must never touch them regardless of flags.
                operation == OperationType::SystemReset && !options.preserve_shared_catalogs
            }
        })
        .collect()
}

/// Binary-asset paths associated with a scope, handed to the file cleanup
/// worker when the caller opts into file deletion.
pub fn asset_paths(scope: &ResetScope) -> Vec<String> {
    match scope {
        ResetScope::Tenant(id) => vec![
            format!("tenants/{}/uploads", id),
            format!("tenants/{}/exports", id),
            format!("tenants/{}/receipts", id),
        ],
        ResetScope::System => vec!["tenants/".to_string()],
    }
}
