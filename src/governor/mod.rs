//! Destructive data reset governor.
//!
//! The only subsystem here with a genuine two-phase protocol: dry-run
//! preview, one-time confirmation, rate limiting, pre-reset backup
//! guarantee, immutable audit ledger, and best-effort async follow-up.

pub mod confirm;
pub mod dispatch;
pub mod error;
pub mod executor;
pub mod plan;
pub mod rate_limit;
pub mod service;
pub mod store;

pub use confirm::{expected_phrase, ConfirmationStore, IssuedConfirmation};
pub use dispatch::{FollowUpDispatcher, LogNotifier, Notifier};
pub use error::GovernorError;
pub use plan::{build_plan, PlanOptions, ResetScope};
pub use rate_limit::{RateDecision, RateLimiter};
pub use service::{ResetGovernor, ResetOutcome, ResetRequest};
pub use store::{CategoryStore, CleanupJobStore, LedgerStore, StoreError, TenantDirectory};
