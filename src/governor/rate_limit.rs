use chrono::{Duration, Utc};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::config::GovernorConfig;
use crate::database::models::OperationType;
use crate::governor::store::LedgerStore;

/// Observed/limit pair for one rolling window.
#[derive(Debug, Clone, Serialize)]
pub struct WindowCount {
    pub window: &'static str,
    pub observed: u64,
    pub limit: u32,
}

/// Outcome of a rate check. When denied, `exceeded` names the window that
/// tripped, and `window_counts` carries all observed counts so the 429 is
/// self-explanatory.
#[derive(Debug, Clone, Serialize)]
pub struct RateDecision {
    pub allowed: bool,
    pub exceeded: Option<WindowCount>,
    pub window_counts: Vec<WindowCount>,
}

impl RateDecision {
    fn open(window_counts: Vec<WindowCount>) -> Self {
        Self { allowed: true, exceeded: None, window_counts }
    }
}

/// Bounds how many real resets an operator (and, for tenant resets, an
/// operator/target pair) may trigger within rolling hourly and daily
/// windows. Dry-run previews never pass through here.
pub struct RateLimiter {
    ledger: Arc<dyn LedgerStore>,
    config: GovernorConfig,
}

impl RateLimiter {
    pub fn new(ledger: Arc<dyn LedgerStore>, config: GovernorConfig) -> Self {
        Self { ledger, config }
    }

    fn windows(&self, operation: OperationType) -> [(&'static str, Duration, u32); 2] {
        match operation {
            OperationType::TenantReset => [
                ("hour", Duration::hours(1), self.config.tenant_resets_per_hour),
                ("day", Duration::days(1), self.config.tenant_resets_per_day),
            ],
            OperationType::SystemReset => [
                ("hour", Duration::hours(1), self.config.system_resets_per_hour),
                ("day", Duration::days(1), self.config.system_resets_per_day),
            ],
        }
    }

    /// Counts prior real actions in each window. Applies uniformly to all
    /// real operations, system resets included.
    ///
    /// Fails open: if the counting query itself errors, the check passes
    /// and the failure is logged. The confirmation and backup gates remain
    /// in force, so a broken limiter must not lock out legitimate
    /// operators.
    pub async fn check(
        &self,
        operator_id: Uuid,
        operation: OperationType,
        target_id: Option<Uuid>,
    ) -> RateDecision {
        let now = Utc::now();
        let mut counts = Vec::with_capacity(2);

        for (window, span, limit) in self.windows(operation) {
            let observed = match self
                .ledger
                .count_real_since(operator_id, operation, target_id, now - span)
                .await
            {
                Ok(n) => n,
                Err(e) => {
                    warn!(%operator_id, operation = operation.as_str(), window, error = %e,
                        "rate-limit count failed, failing open");
                    continue;
                }
            };

            let count = WindowCount { window, observed, limit };
            if observed >= u64::from(limit) {
                counts.push(count.clone());
                return RateDecision {
                    allowed: false,
                    exceeded: Some(count),
                    window_counts: counts,
                };
            }
            counts.push(count);
        }

        RateDecision::open(counts)
    }
}
