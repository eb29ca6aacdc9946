use std::sync::Arc;

use crate::config::GovernorConfig;
use crate::governor::{
    CategoryStore, CleanupJobStore, ConfirmationStore, FollowUpDispatcher, LedgerStore, Notifier,
    RateLimiter, ResetGovernor, TenantDirectory,
};

/// Shared application state. Stores are trait objects so the Postgres
/// implementations and the in-memory test implementations are
/// interchangeable behind the same router.
#[derive(Clone)]
pub struct AppState {
    pub governor: Arc<ResetGovernor>,
    pub ledger: Arc<dyn LedgerStore>,
    pub jobs: Arc<dyn CleanupJobStore>,
    pub tenants: Arc<dyn TenantDirectory>,
}

impl AppState {
    /// Wires the governor out of its parts and spawns the follow-up
    /// worker.
    pub fn build(
        ledger: Arc<dyn LedgerStore>,
        categories: Arc<dyn CategoryStore>,
        tenants: Arc<dyn TenantDirectory>,
        jobs: Arc<dyn CleanupJobStore>,
        notifier: Arc<dyn Notifier>,
        config: GovernorConfig,
    ) -> Self {
        let confirmations = Arc::new(ConfirmationStore::new(
            config.confirmation_ttl_secs,
            config.allow_typed_confirmation,
        ));
        let limiter = RateLimiter::new(ledger.clone(), config);
        let dispatcher = FollowUpDispatcher::spawn(jobs.clone(), notifier);

        let governor = Arc::new(ResetGovernor::new(
            ledger.clone(),
            categories,
            tenants.clone(),
            confirmations,
            limiter,
            dispatcher,
        ));

        Self { governor, ledger, jobs, tenants }
    }
}
