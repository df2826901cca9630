//! Common test utilities and fixtures

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use budget_adjuster::common::errors::{AdjusterError, Result};
use budget_adjuster::common::traits::{
    AccountDirectory, AuditLog, CampaignHandle, CampaignStore, MetricsSource, Notifier,
};
use budget_adjuster::common::types::{
    AccountRef, CampaignMetricRow, ChannelType, ExecutionLogRow, ScriptRunRow, StatusReason,
};

/// Create a metric row with the given economics
pub fn metric_row(
    id: &str,
    name: &str,
    channel_type: ChannelType,
    budget: Decimal,
    cost: Decimal,
    revenue: Decimal,
    constrained: bool,
) -> CampaignMetricRow {
    CampaignMetricRow {
        campaign_id: id.to_string(),
        campaign_name: name.to_string(),
        channel_type,
        status_reasons: if constrained {
            vec![StatusReason::BudgetConstrained]
        } else {
            vec![]
        },
        daily_budget: budget,
        cost,
        revenue,
    }
}

/// A campaign that qualifies for an increase over a 14-day window:
/// budget 1000, constrained, total cost 1000, total revenue 10000
pub fn constrained_profitable_rows(id: &str, name: &str) -> Vec<CampaignMetricRow> {
    vec![
        metric_row(id, name, ChannelType::PerformanceMax, dec!(1000), dec!(600), dec!(6000), true),
        metric_row(id, name, ChannelType::PerformanceMax, dec!(1000), dec!(400), dec!(4000), false),
    ]
}

/// A campaign that qualifies for a decrease over a 14-day window:
/// budget 1000, total cost 4200 (avg 300/day), no revenue
pub fn underspending_rows(id: &str, name: &str) -> Vec<CampaignMetricRow> {
    vec![
        metric_row(id, name, ChannelType::Search, dec!(1000), dec!(2000), Decimal::ZERO, false),
        metric_row(id, name, ChannelType::Search, dec!(1000), dec!(2200), Decimal::ZERO, false),
    ]
}

/// A campaign the engine leaves alone: spend fills the budget and the
/// ratio is too high for an increase
pub fn healthy_rows(id: &str, name: &str) -> Vec<CampaignMetricRow> {
    vec![metric_row(
        id,
        name,
        ChannelType::Search,
        dec!(1000),
        dec!(12600),
        dec!(50000),
        false,
    )]
}

/// Metrics source backed by a per-account row map
///
/// Accounts listed in `failing` return a query error.
#[derive(Default)]
pub struct FakeMetricsSource {
    pub rows: HashMap<String, Vec<CampaignMetricRow>>,
    pub failing: Vec<String>,
}

#[async_trait]
impl MetricsSource for FakeMetricsSource {
    async fn fetch_campaign_metrics(
        &self,
        account: &AccountRef,
        _lookback_days: u32,
    ) -> Result<Vec<CampaignMetricRow>> {
        if self.failing.contains(&account.id) {
            return Err(AdjusterError::DataFetch("synthetic query failure".to_string()));
        }
        Ok(self.rows.get(&account.id).cloned().unwrap_or_default())
    }
}

/// Campaign store that records every committed mutation
///
/// Campaign names in `missing` resolve to nothing; names in
/// `rejecting` resolve but reject the mutation.
#[derive(Default)]
pub struct FakeCampaignStore {
    pub missing: Vec<String>,
    pub rejecting: Vec<String>,
    pub mutations: Mutex<Vec<(String, String, Decimal)>>,
}

#[async_trait]
impl CampaignStore for FakeCampaignStore {
    async fn find_campaign(
        &self,
        account: &AccountRef,
        _channel_type: ChannelType,
        name: &str,
    ) -> Result<Option<CampaignHandle>> {
        if self.missing.iter().any(|m| m == name) {
            return Ok(None);
        }
        Ok(Some(CampaignHandle {
            campaign_resource: format!("customers/{}/campaigns/{name}", account.id),
            budget_resource: format!("customers/{}/campaignBudgets/{name}", account.id),
        }))
    }

    async fn set_daily_budget(
        &self,
        account: &AccountRef,
        handle: &CampaignHandle,
        amount: Decimal,
    ) -> Result<()> {
        if self
            .rejecting
            .iter()
            .any(|name| handle.budget_resource.ends_with(name.as_str()))
        {
            return Err(AdjusterError::StoreMutation("synthetic mutation failure".to_string()));
        }
        self.mutations.lock().unwrap().push((
            account.id.clone(),
            handle.budget_resource.clone(),
            amount,
        ));
        Ok(())
    }
}

/// Directory resolving ids in order; optionally failing outright
#[derive(Default)]
pub struct FakeDirectory {
    pub fail: bool,
}

#[async_trait]
impl AccountDirectory for FakeDirectory {
    async fn list_accounts(&self, ids: &[String]) -> Result<Vec<AccountRef>> {
        if self.fail {
            return Err(AdjusterError::DataFetch("synthetic directory failure".to_string()));
        }
        Ok(ids
            .iter()
            .map(|id| AccountRef::new(id.clone(), format!("Account {id}")))
            .collect())
    }
}

/// Notifier capturing every sent message
#[derive(Default)]
pub struct FakeNotifier {
    pub sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl Notifier for FakeNotifier {
    async fn send(&self, subject: &str, body: &str) -> Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push((subject.to_string(), body.to_string()));
        Ok(())
    }
}

/// Audit log capturing every appended row
#[derive(Default)]
pub struct FakeAuditLog {
    pub actions: Mutex<Vec<ExecutionLogRow>>,
    pub runs: Mutex<Vec<ScriptRunRow>>,
}

#[async_trait]
impl AuditLog for FakeAuditLog {
    async fn append_action(&self, row: &ExecutionLogRow) -> Result<()> {
        self.actions.lock().unwrap().push(row.clone());
        Ok(())
    }

    async fn append_run(&self, row: &ScriptRunRow) -> Result<()> {
        self.runs.lock().unwrap().push(row.clone());
        Ok(())
    }
}
