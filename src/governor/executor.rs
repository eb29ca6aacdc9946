use tracing::{debug, warn};

use crate::governor::plan::{CategoryDescriptor, ResetScope};
use crate::governor::store::CategoryStore;

/// Per-category accounting for one pass over a plan.
#[derive(Debug, Clone)]
pub struct CategoryOutcome {
    pub category: &'static str,
    pub rows: u64,
    pub error: Option<String>,
}

/// Runs the plan sequentially in dependency order.
///
/// Dry-run counts, real run purges; either way the output shape is
/// identical, which is what makes the preview trustworthy as a forecast.
/// A failing category is recorded and execution continues with the next
/// one (best-effort total cleanup), so every category's success or failure
/// is independently attributable.
pub async fn run_plan(
    store: &dyn CategoryStore,
    plan: &[&'static CategoryDescriptor],
    scope: &ResetScope,
    dry_run: bool,
) -> Vec<CategoryOutcome> {
    let mut outcomes = Vec::with_capacity(plan.len());

    for category in plan {
        let result = if dry_run {
            store.count(category, scope).await
        } else {
            store.purge(category, scope).await
        };

        match result {
            Ok(rows) => {
                debug!(category = category.name, rows, dry_run, "category pass finished");
                outcomes.push(CategoryOutcome { category: category.name, rows, error: None });
            }
            Err(e) => {
                warn!(category = category.name, dry_run, error = %e, "category pass failed, continuing");
                outcomes.push(CategoryOutcome {
                    category: category.name,
                    rows: 0,
                    error: Some(e.to_string()),
                });
            }
        }
    }

    outcomes
}

/// Joins the per-category failures into the ledger's `error_summary`.
pub fn summarize_errors(outcomes: &[CategoryOutcome]) -> Option<String> {
    let failures: Vec<String> = outcomes
        .iter()
        .filter_map(|o| o.error.as_ref().map(|e| format!("{}: {}", o.category, e)))
        .collect();

    if failures.is_empty() {
        None
    } else {
        Some(failures.join("; "))
    }
}
