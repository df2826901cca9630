//! Unified domain types used across the adjuster

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Advertising channel type of a campaign
///
/// `PerformanceMax` is distinguished because those campaigns are
/// resolved through their own lookup path in the campaign store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChannelType {
    Search,
    Display,
    Shopping,
    Video,
    DemandGen,
    PerformanceMax,
    /// Channel types added to the API after this enum was written
    #[serde(other)]
    Unknown,
}

impl ChannelType {
    /// Whether this campaign uses the Performance Max lookup path
    pub fn is_performance_max(&self) -> bool {
        matches!(self, ChannelType::PerformanceMax)
    }
}

impl std::fmt::Display for ChannelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelType::Search => write!(f, "SEARCH"),
            ChannelType::Display => write!(f, "DISPLAY"),
            ChannelType::Shopping => write!(f, "SHOPPING"),
            ChannelType::Video => write!(f, "VIDEO"),
            ChannelType::DemandGen => write!(f, "DEMAND_GEN"),
            ChannelType::PerformanceMax => write!(f, "PERFORMANCE_MAX"),
            ChannelType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Machine-readable campaign status reason
///
/// Parsed from the API's string set exactly once at the data-model
/// boundary; downstream code only ever checks the typed variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusReason {
    /// The campaign could spend more if its budget allowed
    BudgetConstrained,
    BiddingStrategyConstrained,
    NotEligible,
    #[serde(other)]
    Unknown,
}

/// One reported row per (campaign, day) in the lookback window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignMetricRow {
    /// Campaign identifier
    pub campaign_id: String,
    /// Campaign display name
    pub campaign_name: String,
    /// Advertising channel type
    pub channel_type: ChannelType,
    /// Status reasons reported for the campaign on this row
    pub status_reasons: Vec<StatusReason>,
    /// Current daily budget amount
    pub daily_budget: Decimal,
    /// Cost for the day
    pub cost: Decimal,
    /// Conversion value attributed to the day (may be zero)
    pub revenue: Decimal,
}

impl CampaignMetricRow {
    /// Whether this row carries the budget-constrained signal
    pub fn is_budget_constrained(&self) -> bool {
        self.status_reasons.contains(&StatusReason::BudgetConstrained)
    }
}

/// Aggregated per-campaign view over the lookback window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignSummary {
    /// Campaign identifier
    pub campaign_id: String,
    /// Campaign display name
    pub name: String,
    /// Advertising channel type
    pub channel_type: ChannelType,
    /// Current daily budget amount
    pub daily_budget: Decimal,
    /// True if the constrained flag appeared on any row in the window
    pub is_budget_constrained: bool,
    /// Total cost accumulated over the window
    pub total_cost: Decimal,
    /// Total conversion value accumulated over the window
    pub total_revenue: Decimal,
    /// total_cost / window length
    pub avg_daily_spend: Decimal,
    /// total_cost / total_revenue, absent when revenue is zero
    pub profitability_ratio: Option<Decimal>,
}

/// Direction of a budget adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AdjustmentKind {
    Increase,
    Decrease,
}

impl std::fmt::Display for AdjustmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AdjustmentKind::Increase => write!(f, "INCREASE"),
            AdjustmentKind::Decrease => write!(f, "DECREASE"),
        }
    }
}

/// A concrete budget change carried by an `Adjust` decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetAdjustment {
    pub kind: AdjustmentKind,
    pub old_budget: Decimal,
    pub new_budget: Decimal,
    /// Human-readable justification, suitable for display
    pub reason: String,
}

/// Decision engine output for one campaign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum BudgetDecision {
    /// Leave the budget unchanged
    NoChange,
    /// Commit the carried adjustment
    Adjust(BudgetAdjustment),
}

impl BudgetDecision {
    /// Create an increase decision
    pub fn increase(old_budget: Decimal, new_budget: Decimal, reason: impl Into<String>) -> Self {
        Self::Adjust(BudgetAdjustment {
            kind: AdjustmentKind::Increase,
            old_budget,
            new_budget,
            reason: reason.into(),
        })
    }

    /// Create a decrease decision
    pub fn decrease(old_budget: Decimal, new_budget: Decimal, reason: impl Into<String>) -> Self {
        Self::Adjust(BudgetAdjustment {
            kind: AdjustmentKind::Decrease,
            old_budget,
            new_budget,
            reason: reason.into(),
        })
    }

    /// Returns true if this decision carries an adjustment
    pub fn is_adjust(&self) -> bool {
        matches!(self, Self::Adjust(_))
    }
}

/// Outcome of a budget application attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplyOutcome {
    Applied,
    Failed,
}

/// One applied (or attempted) change, promoted to the run-wide accumulator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub account_name: String,
    pub account_id: String,
    pub campaign_name: String,
    pub channel_type: ChannelType,
    pub kind: AdjustmentKind,
    pub old_budget: Decimal,
    pub new_budget: Decimal,
    pub reason: String,
    pub outcome: ApplyOutcome,
}

impl ChangeRecord {
    /// Build a record for an adjustment attempted on this account
    pub fn new(
        account: &AccountRef,
        campaign_name: impl Into<String>,
        channel_type: ChannelType,
        adjustment: &BudgetAdjustment,
        outcome: ApplyOutcome,
    ) -> Self {
        Self {
            account_name: account.name.clone(),
            account_id: account.id.clone(),
            campaign_name: campaign_name.into(),
            channel_type,
            kind: adjustment.kind,
            old_budget: adjustment.old_budget,
            new_budget: adjustment.new_budget,
            reason: adjustment.reason.clone(),
            outcome,
        }
    }
}

/// Explicit handle to one advertiser account
///
/// Every collaborator call takes this explicitly; there is no
/// process-wide "current account" selector.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountRef {
    /// Customer identifier (digits, no dashes)
    pub id: String,
    /// Descriptive account name
    pub name: String,
}

impl AccountRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Final accounting for one full run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// When the run started
    pub started_at: DateTime<Utc>,
    /// Accounts the coordinator iterated over
    pub accounts_processed: u32,
    /// Accounts that returned a non-empty change list
    pub accounts_with_changes: u32,
    /// Applied changes across all accounts
    pub total_changes: u32,
    /// Account-level failures
    pub errors: u32,
    /// Wall-clock duration of the run
    pub duration_ms: u64,
}

/// Action kind recorded in the execution log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Increase,
    Decrease,
    NoChange,
    Error,
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditAction::Increase => write!(f, "INCREASE"),
            AuditAction::Decrease => write!(f, "DECREASE"),
            AuditAction::NoChange => write!(f, "NO_CHANGE"),
            AuditAction::Error => write!(f, "ERROR"),
        }
    }
}

impl From<AdjustmentKind> for AuditAction {
    fn from(kind: AdjustmentKind) -> Self {
        match kind {
            AdjustmentKind::Increase => AuditAction::Increase,
            AdjustmentKind::Decrease => AuditAction::Decrease,
        }
    }
}

/// Per-action status recorded in the execution log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditStatus {
    Ok,
    Failed,
}

impl std::fmt::Display for AuditStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditStatus::Ok => write!(f, "OK"),
            AuditStatus::Failed => write!(f, "FAILED"),
        }
    }
}

/// One row per action in the execution log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionLogRow {
    pub timestamp: DateTime<Utc>,
    pub script_id: String,
    pub account_id: String,
    pub account_name: String,
    pub action: AuditAction,
    /// Description of the affected entity (campaign name and type)
    pub entity: String,
    pub old_value: Option<Decimal>,
    pub new_value: Option<Decimal>,
    pub reason: String,
    pub status: AuditStatus,
}

/// Overall status of a full run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    Completed,
    CompletedWithErrors,
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStatus::Completed => write!(f, "COMPLETED"),
            RunStatus::CompletedWithErrors => write!(f, "COMPLETED_WITH_ERRORS"),
        }
    }
}

/// One row per full run in the script-runs log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptRunRow {
    pub timestamp: DateTime<Utc>,
    pub script_id: String,
    pub accounts_processed: u32,
    pub total_changes: u32,
    pub error_count: u32,
    pub duration_ms: u64,
    pub status: RunStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_row_constrained_flag() {
        let row = CampaignMetricRow {
            campaign_id: "1".to_string(),
            campaign_name: "Brand".to_string(),
            channel_type: ChannelType::Search,
            status_reasons: vec![StatusReason::Unknown, StatusReason::BudgetConstrained],
            daily_budget: dec!(1000),
            cost: dec!(900),
            revenue: dec!(4500),
        };
        assert!(row.is_budget_constrained());

        let row = CampaignMetricRow {
            status_reasons: vec![StatusReason::NotEligible],
            ..row
        };
        assert!(!row.is_budget_constrained());
    }

    #[test]
    fn test_decision_constructors() {
        let decision = BudgetDecision::increase(dec!(1000), dec!(1300), "constrained");
        assert!(decision.is_adjust());
        match decision {
            BudgetDecision::Adjust(adj) => {
                assert_eq!(adj.kind, AdjustmentKind::Increase);
                assert_eq!(adj.new_budget, dec!(1300));
            }
            BudgetDecision::NoChange => panic!("expected an adjustment"),
        }

        assert!(!BudgetDecision::NoChange.is_adjust());
    }

    #[test]
    fn test_channel_type_serde_unknown() {
        let ct: ChannelType = serde_json::from_str("\"PERFORMANCE_MAX\"").unwrap();
        assert!(ct.is_performance_max());

        let ct: ChannelType = serde_json::from_str("\"TRAVEL\"").unwrap();
        assert_eq!(ct, ChannelType::Unknown);
    }
}
