pub mod cleanup_job;
pub mod reset_action;
pub mod tenant;

pub use cleanup_job::{CleanupJob, CleanupJobDraft, JobStatus};
pub use reset_action::{
    ActionFilter, ActionStatus, OperationType, ResetAction, ResetActionDraft, ResetActionPatch,
};
pub use tenant::{TenantDraft, TenantInfo};
