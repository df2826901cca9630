//! Metric aggregation: folds per-day rows into per-campaign summaries

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::common::types::{CampaignMetricRow, CampaignSummary};

/// Fold raw (campaign, day) rows into one summary per campaign
///
/// Cost and revenue are pure sums; the budget-constrained flag is a
/// logical OR across all rows of the campaign; name, channel type and
/// budget are taken from the first row seen. After folding, the
/// average daily spend and the profitability ratio are derived. The
/// ratio is absent when the campaign has no revenue.
///
/// The source is expected to have filtered to active, non-experimental
/// campaigns already; no re-filtering happens here. An empty row
/// sequence yields an empty map.
pub fn aggregate(
    rows: &[CampaignMetricRow],
    window_days: u32,
) -> HashMap<String, CampaignSummary> {
    assert!(window_days > 0, "window_days must be positive");

    let mut summaries: HashMap<String, CampaignSummary> = HashMap::new();

    for row in rows {
        let summary = summaries
            .entry(row.campaign_id.clone())
            .or_insert_with(|| CampaignSummary {
                campaign_id: row.campaign_id.clone(),
                name: row.campaign_name.clone(),
                channel_type: row.channel_type,
                daily_budget: row.daily_budget,
                is_budget_constrained: false,
                total_cost: Decimal::ZERO,
                total_revenue: Decimal::ZERO,
                avg_daily_spend: Decimal::ZERO,
                profitability_ratio: None,
            });

        summary.total_cost += row.cost;
        summary.total_revenue += row.revenue;
        summary.is_budget_constrained |= row.is_budget_constrained();
    }

    let window = Decimal::from(window_days);
    for summary in summaries.values_mut() {
        summary.avg_daily_spend = summary.total_cost / window;
        summary.profitability_ratio = if summary.total_revenue > Decimal::ZERO {
            Some(summary.total_cost / summary.total_revenue)
        } else {
            None
        };
    }

    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::types::{ChannelType, StatusReason};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn row(
        id: &str,
        cost: Decimal,
        revenue: Decimal,
        reasons: Vec<StatusReason>,
    ) -> CampaignMetricRow {
        CampaignMetricRow {
            campaign_id: id.to_string(),
            campaign_name: format!("Campaign {id}"),
            channel_type: ChannelType::Search,
            status_reasons: reasons,
            daily_budget: dec!(1000),
            cost,
            revenue,
        }
    }

    #[test]
    fn test_empty_rows_yield_empty_map() {
        let summaries = aggregate(&[], 14);
        assert!(summaries.is_empty());
    }

    #[test]
    fn test_totals_are_sums_per_campaign() {
        let rows = vec![
            row("1", dec!(100), dec!(500), vec![]),
            row("2", dec!(50), dec!(0), vec![]),
            row("1", dec!(200), dec!(700), vec![]),
            row("1", dec!(40), dec!(0), vec![]),
        ];
        let summaries = aggregate(&rows, 14);

        assert_eq!(summaries.len(), 2);
        let one = &summaries["1"];
        assert_eq!(one.total_cost, dec!(340));
        assert_eq!(one.total_revenue, dec!(1200));
        let two = &summaries["2"];
        assert_eq!(two.total_cost, dec!(50));
        assert_eq!(two.total_revenue, dec!(0));
    }

    #[test]
    fn test_row_order_does_not_matter() {
        let mut rows = vec![
            row("1", dec!(100), dec!(500), vec![StatusReason::BudgetConstrained]),
            row("1", dec!(200), dec!(700), vec![]),
            row("2", dec!(10), dec!(20), vec![]),
        ];
        let forward = aggregate(&rows, 14);
        rows.reverse();
        let backward = aggregate(&rows, 14);

        assert_eq!(forward["1"].total_cost, backward["1"].total_cost);
        assert_eq!(forward["1"].total_revenue, backward["1"].total_revenue);
        assert_eq!(
            forward["1"].is_budget_constrained,
            backward["1"].is_budget_constrained
        );
        assert_eq!(forward["2"], backward["2"]);
    }

    #[test]
    fn test_constrained_is_or_across_rows() {
        let rows = vec![
            row("1", dec!(100), dec!(0), vec![]),
            row("1", dec!(100), dec!(0), vec![StatusReason::BudgetConstrained]),
            row("1", dec!(100), dec!(0), vec![]),
        ];
        assert!(aggregate(&rows, 14)["1"].is_budget_constrained);

        let rows = vec![
            row("1", dec!(100), dec!(0), vec![]),
            row("1", dec!(100), dec!(0), vec![StatusReason::NotEligible]),
        ];
        assert!(!aggregate(&rows, 14)["1"].is_budget_constrained);
    }

    #[test]
    fn test_avg_daily_spend_uses_window_length() {
        let rows = vec![
            row("1", dec!(2100), dec!(0), vec![]),
            row("1", dec!(2100), dec!(0), vec![]),
        ];
        let summaries = aggregate(&rows, 14);
        assert_eq!(summaries["1"].avg_daily_spend, dec!(300));
    }

    #[test]
    fn test_ratio_absent_without_revenue() {
        let rows = vec![row("1", dec!(500), dec!(0), vec![])];
        let summaries = aggregate(&rows, 14);
        assert_eq!(summaries["1"].profitability_ratio, None);

        let rows = vec![row("1", dec!(0), dec!(0), vec![])];
        let summaries = aggregate(&rows, 14);
        assert_eq!(summaries["1"].profitability_ratio, None);
    }

    #[test]
    fn test_ratio_is_cost_over_revenue() {
        let rows = vec![
            row("1", dec!(500), dec!(4000), vec![]),
            row("1", dec!(500), dec!(6000), vec![]),
        ];
        let summaries = aggregate(&rows, 14);
        assert_eq!(summaries["1"].profitability_ratio, Some(dec!(0.1)));
    }
}
