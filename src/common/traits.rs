//! Trait definitions for the external collaborators
//!
//! The engine only ever talks to the outside world through these
//! traits: reporting (metrics), campaign mutation, account discovery,
//! notification and audit logging. Production implementations live in
//! the `ads` and `report` modules; tests substitute in-memory fakes.

use async_trait::async_trait;
use rust_decimal::Decimal;

#[cfg(test)]
use mockall::automock;

use super::errors::Result;
use super::types::{
    AccountRef, CampaignMetricRow, ChannelType, ExecutionLogRow, ScriptRunRow,
};

/// Handle to a campaign resolved through the store
///
/// Carries the resource names needed to commit a budget mutation
/// without a second lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CampaignHandle {
    /// Resource name of the campaign itself
    pub campaign_resource: String,
    /// Resource name of the campaign's shared budget
    pub budget_resource: String,
}

/// Supplies per-day, per-campaign metric rows for a lookback window
///
/// The source is expected to pre-filter to active, non-experimental
/// campaigns; the aggregator folds whatever it yields.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MetricsSource: Send + Sync {
    /// Fetch one row per (campaign, day) over the trailing window
    async fn fetch_campaign_metrics(
        &self,
        account: &AccountRef,
        lookback_days: u32,
    ) -> Result<Vec<CampaignMetricRow>>;
}

/// Looks up campaigns by name and mutates their daily budget
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CampaignStore: Send + Sync {
    /// Resolve a campaign by exact name, scoped by channel type
    ///
    /// Performance Max campaigns are resolved through a distinguished
    /// query path; all other channel types share the general path.
    /// Returns `None` when no campaign matches.
    async fn find_campaign(
        &self,
        account: &AccountRef,
        channel_type: ChannelType,
        name: &str,
    ) -> Result<Option<CampaignHandle>>;

    /// Commit a new daily budget amount for the campaign
    async fn set_daily_budget(
        &self,
        account: &AccountRef,
        handle: &CampaignHandle,
        amount: Decimal,
    ) -> Result<()>;
}

/// Enumerates the advertiser accounts to process
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Resolve the given customer ids to account references
    ///
    /// Accounts are returned in the order they should be processed.
    async fn list_accounts(&self, ids: &[String]) -> Result<Vec<AccountRef>>;
}

/// Delivers the human-readable run summary
#[cfg_attr(test, automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send one notification with a subject line and a text body
    async fn send(&self, subject: &str, body: &str) -> Result<()>;
}

/// Append-only structured record of actions and runs
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AuditLog: Send + Sync {
    /// Append one row describing a single action
    async fn append_action(&self, row: &ExecutionLogRow) -> Result<()>;

    /// Append one row describing a completed run
    async fn append_run(&self, row: &ScriptRunRow) -> Result<()>;
}
