//! Decision engine: maps a campaign summary to a budget decision
//!
//! Pure and deterministic; the only inputs are the aggregated summary
//! and the configured thresholds. Increase and decrease are evaluated
//! in strict order, so a single summary can never produce both.

use rust_decimal_macros::dec;

use crate::common::types::{BudgetDecision, CampaignSummary};
use crate::config::types::DecisionConfig;

/// Decide whether a campaign's daily budget should change
///
/// 1. **Increase** when the campaign is budget constrained and its
///    profitability ratio is present and below the configured maximum.
///    New budget = current budget × increase multiplier.
/// 2. **Decrease** when trailing average daily spend is below the
///    underspend fraction of the budget. Candidate = max(avg spend ×
///    buffer, minimum budget); only emitted if the candidate is
///    meaningfully below the current budget (significance threshold),
///    otherwise the campaign falls through to no change.
/// 3. **NoChange** otherwise.
///
/// A constrained campaign with no revenue has no ratio and can never
/// qualify for an increase; it falls through to the underspend check.
/// A zero-budget campaign never decreases: `0 < 0` is false.
pub fn decide(summary: &CampaignSummary, config: &DecisionConfig) -> BudgetDecision {
    if summary.is_budget_constrained {
        if let Some(ratio) = summary.profitability_ratio {
            if ratio < config.max_profitability_ratio_for_increase {
                let new_budget = summary.daily_budget * config.increase_multiplier;
                let pct = (ratio * dec!(100)).round_dp(1);
                return BudgetDecision::increase(
                    summary.daily_budget,
                    new_budget,
                    format!("Budget constrained, PNO {pct}%"),
                );
            }
        }
    }

    if summary.avg_daily_spend < summary.daily_budget * config.underspend_threshold {
        let candidate =
            (summary.avg_daily_spend * config.decrease_buffer).max(config.minimum_budget);

        // Skip negligible decreases so budgets do not oscillate.
        if candidate < summary.daily_budget * config.decrease_significance_threshold {
            let spend_pct =
                (summary.avg_daily_spend / summary.daily_budget * dec!(100)).round_dp(0);
            return BudgetDecision::decrease(
                summary.daily_budget,
                candidate,
                format!(
                    "Underspend: avg {}/day ({spend_pct}% of budget)",
                    summary.avg_daily_spend.round_dp(0)
                ),
            );
        }
    }

    BudgetDecision::NoChange
}
