pub mod categories;
pub mod cleanup;
pub mod ledger;
pub mod manager;
pub mod models;
pub mod tenants;

pub use categories::PgCategoryStore;
pub use cleanup::PgCleanupJobStore;
pub use ledger::PgLedgerStore;
pub use manager::DatabaseManager;
pub use tenants::PgTenantStore;
