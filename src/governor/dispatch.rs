use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::database::models::{CleanupJobDraft, OperationType};
use crate::governor::store::CleanupJobStore;

/// Completion notification sink. Delivery mechanics (email, SMS, webhook)
/// are an external collaborator; the default implementation logs.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn reset_finished(
        &self,
        action_id: Uuid,
        operation: OperationType,
        success: bool,
        summary: &str,
    );
}

pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn reset_finished(
        &self,
        action_id: Uuid,
        operation: OperationType,
        success: bool,
        summary: &str,
    ) {
        info!(%action_id, operation = operation.as_str(), success, summary,
            "reset finished notification");
    }
}

enum FollowUpTask {
    Cleanup(CleanupJobDraft),
    Notify {
        action_id: Uuid,
        operation: OperationType,
        success: bool,
        summary: String,
    },
}

/// Fire-and-forget follow-up dispatch: a channel plus one worker task.
///
/// "Best-effort, non-blocking, non-fatal" is structural here: the request
/// path only ever pushes onto the channel and never awaits the worker, so
/// no follow-up failure can alter a finalized action or its response.
#[derive(Clone)]
pub struct FollowUpDispatcher {
    tx: mpsc::UnboundedSender<FollowUpTask>,
}

impl FollowUpDispatcher {
    /// Spawns the worker and returns the dispatch handle.
    pub fn spawn(jobs: Arc<dyn CleanupJobStore>, notifier: Arc<dyn Notifier>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<FollowUpTask>();

        tokio::spawn(async move {
            while let Some(task) = rx.recv().await {
                match task {
                    FollowUpTask::Cleanup(draft) => {
                        let job_id = draft.id;
                        let action_id = draft.reset_action_id;
                        // Persisting the queued row is the handoff; the
                        // file removal itself belongs to an out-of-process
                        // worker watching this table.
                        if let Err(e) = jobs.create(draft).await {
                            error!(%job_id, %action_id, error = %e,
                                "failed to persist cleanup job, dropping");
                        } else {
                            info!(%job_id, %action_id, "cleanup job queued");
                        }
                    }
                    FollowUpTask::Notify { action_id, operation, success, summary } => {
                        notifier.reset_finished(action_id, operation, success, &summary).await;
                    }
                }
            }
        });

        Self { tx }
    }

    /// Queues a file-cleanup job and returns its id, or None when the
    /// dispatcher is shut down. Callers skip this entirely when file
    /// deletion was not requested.
    pub fn enqueue_cleanup(&self, reset_action_id: Uuid, file_list: Vec<String>) -> Option<Uuid> {
        let id = Uuid::new_v4();
        let draft = CleanupJobDraft { id, reset_action_id, file_list };
        match self.tx.send(FollowUpTask::Cleanup(draft)) {
            Ok(()) => Some(id),
            Err(_) => {
                warn!(%reset_action_id, "cleanup dispatch channel closed, job dropped");
                None
            }
        }
    }

    /// Fires a completion notification; failures are logged by the worker.
    pub fn notify(&self, action_id: Uuid, operation: OperationType, success: bool, summary: String) {
        if self.tx.send(FollowUpTask::Notify { action_id, operation, success, summary }).is_err() {
            warn!(%action_id, "notification dispatch channel closed, dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::governor::store::StoreError;
    use crate::testing::InMemoryJobs;
    use std::time::Duration;

    async fn wait_for<F: Fn() -> bool>(cond: F) {
        for _ in 0..100 {
            if cond() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("condition not reached within 1s");
    }

    #[tokio::test]
    async fn enqueued_job_is_persisted_by_worker() {
        let jobs = Arc::new(InMemoryJobs::new());
        let dispatcher = FollowUpDispatcher::spawn(jobs.clone(), Arc::new(LogNotifier));

        let action_id = Uuid::new_v4();
        let job_id = dispatcher
            .enqueue_cleanup(action_id, vec!["tenants/x/uploads".to_string()])
            .unwrap();

        wait_for(|| jobs.len() == 1).await;
        let stored = jobs.list_sync(action_id);
        assert_eq!(stored[0].id, job_id);
        assert_eq!(stored[0].file_list, vec!["tenants/x/uploads".to_string()]);
    }

    #[tokio::test]
    async fn persistence_failure_is_swallowed() {
        let jobs = Arc::new(InMemoryJobs::new());
        jobs.fail_with(StoreError::Query("disk full".to_string()));
        let dispatcher = FollowUpDispatcher::spawn(jobs.clone(), Arc::new(LogNotifier));

        // Send succeeds regardless; the worker logs and drops the job.
        let id = dispatcher.enqueue_cleanup(Uuid::new_v4(), vec![]);
        assert!(id.is_some());
        dispatcher.notify(Uuid::new_v4(), OperationType::TenantReset, true, "ok".to_string());

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(jobs.len(), 0);
    }
}
