use thiserror::Error;
use uuid::Uuid;

/// Failure taxonomy for the reset governor.
///
/// Validation, confirmation, target, and rate-limit failures are pure
/// rejections detected before any ledger row exists. `Internal` carries
/// the action id when a ledger row was already created, so the audit
/// trail stays discoverable even when the response is an error.
#[derive(Debug, Error)]
pub enum GovernorError {
    #[error("{0}")]
    Validation(String),

    #[error("{message}")]
    Confirmation {
        message: String,
        expected_phrase: Option<String>,
    },

    #[error("rate limit exceeded: {observed}/{limit} real resets in the last {window}")]
    RateLimited {
        window: String,
        observed: u64,
        limit: u32,
    },

    #[error("unknown target: {0}")]
    TargetNotFound(String),

    #[error("{message}")]
    Internal {
        message: String,
        action_id: Option<Uuid>,
    },
}

impl GovernorError {
    pub fn internal(message: impl Into<String>, action_id: Option<Uuid>) -> Self {
        GovernorError::Internal { message: message.into(), action_id }
    }
}
