//! Per-account orchestration
//!
//! One pass over a single account: fetch metrics, aggregate, decide
//! per campaign, apply, audit. Every internal failure is caught and
//! downgraded; this module never propagates an error to the caller.

use tracing::{error, info, warn};

use crate::common::traits::{CampaignStore, MetricsSource};
use crate::common::types::{AccountRef, ApplyOutcome, BudgetDecision, ChangeRecord};
use crate::config::types::DecisionConfig;
use crate::engine::aggregate::aggregate;
use crate::engine::apply::BudgetApplier;
use crate::engine::decision::decide;
use crate::report::audit::Auditor;

/// Outcome of one account pass
///
/// `changes` holds only the applied adjustments. `failed` marks an
/// account-level failure (the metrics query itself), in which case no
/// campaign was touched.
#[derive(Debug, Default)]
pub struct AccountRunResult {
    pub changes: Vec<ChangeRecord>,
    pub failed: bool,
}

/// Process one account end to end
///
/// State machine per campaign: summary → decide → NoChange (audited)
/// or apply → ChangeRecord on success / audit-only failure record
/// otherwise. A failed application excludes the campaign from the
/// returned changes but never aborts the remaining campaigns.
pub async fn run_account(
    account: &AccountRef,
    metrics: &dyn MetricsSource,
    store: &dyn CampaignStore,
    auditor: &Auditor,
    decision_config: &DecisionConfig,
    lookback_days: u32,
) -> AccountRunResult {
    info!(account = %account.id, name = %account.name, "processing account");

    let rows = match metrics.fetch_campaign_metrics(account, lookback_days).await {
        Ok(rows) => rows,
        Err(e) => {
            error!(account = %account.id, error = %e, "metrics fetch failed");
            auditor.record_account_error(account, &e.to_string()).await;
            return AccountRunResult {
                changes: Vec::new(),
                failed: true,
            };
        }
    };

    let summaries = aggregate(&rows, lookback_days);
    if summaries.is_empty() {
        info!(account = %account.id, "no active campaigns");
        return AccountRunResult::default();
    }

    // Deterministic processing order for logs and notifications
    let mut summaries: Vec<_> = summaries.into_values().collect();
    summaries.sort_by(|a, b| a.name.cmp(&b.name));

    let applier = BudgetApplier::new(store);
    let mut changes = Vec::new();

    for summary in &summaries {
        info!(
            account = %account.id,
            campaign = %summary.name,
            budget = %summary.daily_budget,
            avg_daily_spend = %summary.avg_daily_spend,
            constrained = summary.is_budget_constrained,
            "evaluating campaign"
        );

        match decide(summary, decision_config) {
            BudgetDecision::NoChange => {
                auditor.record_no_change(account, summary).await;
            }
            BudgetDecision::Adjust(adjustment) => {
                match applier
                    .apply(
                        account,
                        summary.channel_type,
                        &summary.name,
                        adjustment.new_budget,
                    )
                    .await
                {
                    Ok(_) => {
                        info!(
                            account = %account.id,
                            campaign = %summary.name,
                            kind = %adjustment.kind,
                            old = %adjustment.old_budget,
                            new = %adjustment.new_budget,
                            "budget adjusted"
                        );
                        let record = ChangeRecord::new(
                            account,
                            &summary.name,
                            summary.channel_type,
                            &adjustment,
                            ApplyOutcome::Applied,
                        );
                        auditor.record_change(&record).await;
                        changes.push(record);
                    }
                    Err(e) => {
                        warn!(
                            account = %account.id,
                            campaign = %summary.name,
                            error = %e,
                            "budget application failed"
                        );
                        let record = ChangeRecord::new(
                            account,
                            &summary.name,
                            summary.channel_type,
                            &adjustment,
                            ApplyOutcome::Failed,
                        );
                        auditor.record_change(&record).await;
                    }
                }
            }
        }
    }

    AccountRunResult {
        changes,
        failed: false,
    }
}
