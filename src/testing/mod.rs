//! In-memory store implementations behind the same traits as the
//! Postgres stores. Used by unit tests, the hermetic integration suites,
//! and local development without a database. Each store supports simple
//! fault injection so failure paths are deterministically reproducible.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use crate::config::GovernorConfig;
use crate::database::models::{
    ActionFilter, ActionStatus, CleanupJob, CleanupJobDraft, JobStatus, OperationType,
    ResetAction, ResetActionDraft, ResetActionPatch, TenantDraft, TenantInfo,
};
use crate::governor::plan::{CategoryDescriptor, ResetScope};
use crate::governor::store::{
    CategoryStore, CleanupJobStore, LedgerStore, StoreError, TenantDirectory,
};
use crate::governor::{LogNotifier, ResetGovernor};
use crate::state::AppState;

/// Governor config with limits loose enough that tests opt in to
/// throttling explicitly.
pub fn governor_test_config() -> GovernorConfig {
    GovernorConfig {
        confirmation_ttl_secs: 300,
        allow_typed_confirmation: true,
        tenant_resets_per_hour: 100,
        tenant_resets_per_day: 200,
        system_resets_per_hour: 100,
        system_resets_per_day: 200,
        max_list_limit: 1000,
    }
}

// ---------------------------------------------------------------------
// Ledger

#[derive(Default)]
pub struct InMemoryLedger {
    actions: Mutex<Vec<ResetAction>>,
    fail_counting: AtomicBool,
    fail_finalize: AtomicBool,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `count_real_since` fail, exercising the limiter's fail-open
    /// path.
    pub fn fail_counting(&self) {
        self.fail_counting.store(true, Ordering::SeqCst);
    }

    /// Makes `finalize` fail, simulating a crash between ledger create
    /// and executor completion.
    pub fn fail_finalize(&self) {
        self.fail_finalize.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedger {
    async fn create(&self, draft: ResetActionDraft) -> Result<ResetAction, StoreError> {
        let action = ResetAction {
            id: Uuid::new_v4(),
            operator_id: draft.operator_id,
            operation_type: draft.operation_type,
            target_id: draft.target_id,
            is_dry_run: draft.is_dry_run,
            backup_reference: draft.backup_reference,
            request_payload: draft.request_payload,
            status: ActionStatus::Pending,
            category_counts: Default::default(),
            error_summary: None,
            created_at: Utc::now(),
            completed_at: None,
        };
        self.actions.lock().unwrap().push(action.clone());
        Ok(action)
    }

    async fn finalize(&self, id: Uuid, patch: ResetActionPatch) -> Result<ResetAction, StoreError> {
        if self.fail_finalize.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected finalize failure".to_string()));
        }
        let mut actions = self.actions.lock().unwrap();
        let action = actions
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("reset action {} not found", id)))?;
        action.status = patch.status;
        action.category_counts = patch.category_counts;
        action.error_summary = patch.error_summary;
        action.completed_at = Some(patch.completed_at);
        Ok(action.clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<ResetAction>, StoreError> {
        Ok(self.actions.lock().unwrap().iter().find(|a| a.id == id).cloned())
    }

    async fn list(&self, filter: ActionFilter) -> Result<Vec<ResetAction>, StoreError> {
        let (limit, offset) = filter.clamped(1000);
        let actions = self.actions.lock().unwrap();
        Ok(actions
            .iter()
            .rev() // newest first
            .filter(|a| filter.operation_type.map_or(true, |t| a.operation_type == t))
            .filter(|a| filter.status.map_or(true, |s| a.status == s))
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut actions = self.actions.lock().unwrap();
        let before = actions.len();
        actions.retain(|a| a.id != id);
        Ok(actions.len() < before)
    }

    async fn delete_many(&self, ids: &[Uuid]) -> Result<u64, StoreError> {
        let mut actions = self.actions.lock().unwrap();
        let before = actions.len();
        actions.retain(|a| !ids.contains(&a.id));
        Ok((before - actions.len()) as u64)
    }

    async fn count_real_since(
        &self,
        operator_id: Uuid,
        operation_type: OperationType,
        target_id: Option<Uuid>,
        since: DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        if self.fail_counting.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected counting failure".to_string()));
        }
        // Interleaving parity with a real database round-trip, so
        // concurrent callers actually overlap here.
        tokio::task::yield_now().await;
        let actions = self.actions.lock().unwrap();
        Ok(actions
            .iter()
            .filter(|a| !a.is_dry_run)
            .filter(|a| a.operator_id == operator_id)
            .filter(|a| a.operation_type == operation_type)
            .filter(|a| target_id.map_or(true, |t| a.target_id == Some(t)))
            .filter(|a| a.created_at >= since)
            .count() as u64)
    }
}

// ---------------------------------------------------------------------
// Categories

/// Row counts per (tenant, category); shared categories live under a None
/// tenant key. Purging drains the counter, so dry-run purity is
/// observable via `remaining`.
#[derive(Default)]
pub struct InMemoryCategories {
    rows: Mutex<HashMap<(Option<Uuid>, String), u64>>,
    failing: Mutex<HashSet<String>>,
}

impl InMemoryCategories {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, tenant: Uuid, category: &str, rows: u64) {
        self.rows.lock().unwrap().insert((Some(tenant), category.to_string()), rows);
    }

    pub fn seed_shared(&self, category: &str, rows: u64) {
        self.rows.lock().unwrap().insert((None, category.to_string()), rows);
    }

    /// Injects a deterministic failure for one category.
    pub fn fail_category(&self, category: &str) {
        self.failing.lock().unwrap().insert(category.to_string());
    }

    pub fn remaining(&self, tenant: Uuid, category: &str) -> u64 {
        *self
            .rows
            .lock()
            .unwrap()
            .get(&(Some(tenant), category.to_string()))
            .unwrap_or(&0)
    }

    pub fn remaining_total(&self, category: &str) -> u64 {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .filter(|((_, c), _)| c == category)
            .map(|(_, n)| *n)
            .sum()
    }

    fn check_failure(&self, category: &CategoryDescriptor) -> Result<(), StoreError> {
        if self.failing.lock().unwrap().contains(category.name) {
            return Err(StoreError::Query(format!("injected failure in {}", category.name)));
        }
        Ok(())
    }
}

#[async_trait]
impl CategoryStore for InMemoryCategories {
    async fn count(
        &self,
        category: &CategoryDescriptor,
        scope: &ResetScope,
    ) -> Result<u64, StoreError> {
        self.check_failure(category)?;
        let rows = self.rows.lock().unwrap();
        Ok(match scope {
            ResetScope::Tenant(id) => {
                *rows.get(&(Some(*id), category.name.to_string())).unwrap_or(&0)
            }
            ResetScope::System => rows
                .iter()
                .filter(|((_, c), _)| c == category.name)
                .map(|(_, n)| *n)
                .sum(),
        })
    }

    async fn purge(
        &self,
        category: &CategoryDescriptor,
        scope: &ResetScope,
    ) -> Result<u64, StoreError> {
        self.check_failure(category)?;
        let mut rows = self.rows.lock().unwrap();
        match scope {
            ResetScope::Tenant(id) => {
                Ok(rows.remove(&(Some(*id), category.name.to_string())).unwrap_or(0))
            }
            ResetScope::System => {
                let keys: Vec<_> = rows
                    .keys()
                    .filter(|(_, c)| c == category.name)
                    .cloned()
                    .collect();
                let mut purged = 0;
                for key in keys {
                    purged += rows.remove(&key).unwrap_or(0);
                }
                Ok(purged)
            }
        }
    }
}

// ---------------------------------------------------------------------
// Cleanup jobs

#[derive(Default)]
pub struct InMemoryJobs {
    jobs: Mutex<Vec<CleanupJob>>,
    failure: Mutex<Option<String>>,
}

impl InMemoryJobs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_with(&self, error: StoreError) {
        *self.failure.lock().unwrap() = Some(error.to_string());
    }

    pub fn len(&self) -> usize {
        self.jobs.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn list_sync(&self, reset_action_id: Uuid) -> Vec<CleanupJob> {
        self.jobs
            .lock()
            .unwrap()
            .iter()
            .filter(|j| j.reset_action_id == reset_action_id)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl CleanupJobStore for InMemoryJobs {
    async fn create(&self, draft: CleanupJobDraft) -> Result<CleanupJob, StoreError> {
        if let Some(msg) = self.failure.lock().unwrap().clone() {
            return Err(StoreError::Query(msg));
        }
        let job = CleanupJob {
            id: draft.id,
            reset_action_id: draft.reset_action_id,
            file_list: draft.file_list,
            status: JobStatus::Queued,
            details: None,
            created_at: Utc::now(),
        };
        self.jobs.lock().unwrap().push(job.clone());
        Ok(job)
    }

    async fn list_for_action(&self, reset_action_id: Uuid) -> Result<Vec<CleanupJob>, StoreError> {
        Ok(self.list_sync(reset_action_id))
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: JobStatus,
        details: Option<String>,
    ) -> Result<(), StoreError> {
        let mut jobs = self.jobs.lock().unwrap();
        let job = jobs
            .iter_mut()
            .find(|j| j.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("cleanup job {} not found", id)))?;
        job.status = status;
        job.details = details;
        Ok(())
    }
}

// ---------------------------------------------------------------------
// Tenants

#[derive(Default)]
pub struct InMemoryTenants {
    tenants: Mutex<HashMap<Uuid, TenantInfo>>,
}

impl InMemoryTenants {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a tenant and returns its id.
    pub fn add(&self, name: &str) -> Uuid {
        let id = Uuid::new_v4();
        let now = Utc::now();
        self.tenants.lock().unwrap().insert(
            id,
            TenantInfo {
                id,
                name: name.to_string(),
                display_name: name.to_string(),
                is_active: true,
                created_at: now,
                updated_at: now,
            },
        );
        id
    }
}

#[async_trait]
impl TenantDirectory for InMemoryTenants {
    async fn get(&self, id: Uuid) -> Result<Option<TenantInfo>, StoreError> {
        Ok(self.tenants.lock().unwrap().get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<TenantInfo>, StoreError> {
        let mut tenants: Vec<_> = self.tenants.lock().unwrap().values().cloned().collect();
        tenants.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tenants)
    }

    async fn create(&self, draft: TenantDraft) -> Result<TenantInfo, StoreError> {
        draft.validate().map_err(StoreError::Query)?;
        let id = Uuid::new_v4();
        let now = Utc::now();
        let info = TenantInfo {
            id,
            name: draft.name,
            display_name: draft.display_name,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.tenants.lock().unwrap().insert(id, info.clone());
        Ok(info)
    }
}

// ---------------------------------------------------------------------
// Wiring

/// Everything an integration test needs: the app state plus direct
/// handles to the in-memory stores for seeding and assertions.
pub struct TestEnv {
    pub state: AppState,
    pub ledger: Arc<InMemoryLedger>,
    pub categories: Arc<InMemoryCategories>,
    pub jobs: Arc<InMemoryJobs>,
    pub tenants: Arc<InMemoryTenants>,
}

pub fn test_env() -> TestEnv {
    test_env_with(governor_test_config())
}

pub fn test_env_with(config: GovernorConfig) -> TestEnv {
    let ledger = Arc::new(InMemoryLedger::new());
    let categories = Arc::new(InMemoryCategories::new());
    let jobs = Arc::new(InMemoryJobs::new());
    let tenants = Arc::new(InMemoryTenants::new());

    let state = AppState::build(
        ledger.clone(),
        categories.clone(),
        tenants.clone(),
        jobs.clone(),
        Arc::new(LogNotifier),
        config,
    );

    TestEnv { state, ledger, categories, jobs, tenants }
}

/// A governor wired directly to in-memory stores, for tests that bypass
/// the HTTP layer.
pub fn test_governor() -> (Arc<ResetGovernor>, TestEnv) {
    let env = test_env();
    (env.state.governor.clone(), env)
}
