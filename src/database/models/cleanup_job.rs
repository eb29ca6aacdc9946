use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Queued,
    Running,
    Done,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Queued => "queued",
            JobStatus::Running => "running",
            JobStatus::Done => "done",
            JobStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "queued" => Some(JobStatus::Queued),
            "running" => Some(JobStatus::Running),
            "done" => Some(JobStatus::Done),
            "failed" => Some(JobStatus::Failed),
            _ => None,
        }
    }
}

/// Best-effort file cleanup unit owned by a completed real reset.
///
/// Created only after the owning `ResetAction` reaches a terminal state;
/// executed by an out-of-process worker, so its status is observable but is
/// never required to converge for the reset response itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupJob {
    pub id: Uuid,
    pub reset_action_id: Uuid,
    pub file_list: Vec<String>,
    pub status: JobStatus,
    pub details: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct CleanupJobDraft {
    pub id: Uuid,
    pub reset_action_id: Uuid,
    pub file_list: Vec<String>,
}
