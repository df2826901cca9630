//! Google Ads implementations of the collaborator traits
//!
//! One facade over the REST client implements everything the engine
//! consumes: metrics (search query over the trailing window), the
//! campaign store (name lookup + budget mutate) and the account
//! directory (customer client listing on the manager account).

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Days, Utc};
use rust_decimal::Decimal;
use tracing::{debug, instrument, warn};

use super::messages::decimal_to_micros;
use super::rest::AdsRestClient;
use crate::common::errors::{AdjusterError, Result};
use crate::common::traits::{AccountDirectory, CampaignHandle, CampaignStore, MetricsSource};
use crate::common::types::{AccountRef, CampaignMetricRow, ChannelType};
use crate::config::types::AdsConfig;

/// Facade implementing the consumed collaborator traits over REST
pub struct AdsApiClient {
    rest: AdsRestClient,
}

impl AdsApiClient {
    /// Create a new client from configuration
    pub fn new(config: &AdsConfig) -> Result<Self> {
        Ok(Self {
            rest: AdsRestClient::new(config)?,
        })
    }

    /// Wrap an existing REST client
    pub fn from_rest(rest: AdsRestClient) -> Self {
        Self { rest }
    }

    /// Get a reference to the underlying REST client
    pub fn rest(&self) -> &AdsRestClient {
        &self.rest
    }

    async fn resolve_own_account(&self, id: &str) -> Result<AccountRef> {
        let query = "SELECT customer.id, customer.descriptive_name FROM customer";
        let results = self.rest.search(id, query).await?;
        let name = results
            .into_iter()
            .find_map(|r| r.customer.and_then(|c| c.descriptive_name))
            .unwrap_or_else(|| id.to_string());
        Ok(AccountRef::new(id, name))
    }
}

/// Escape a campaign name for use inside a GAQL string literal
fn escape_literal(name: &str) -> String {
    name.replace('\\', "\\\\").replace('\'', "\\'")
}

/// GAQL for the per-day campaign metrics over the trailing window
///
/// One row per (campaign, day) for enabled, non-experimental
/// campaigns; the date range covers `lookback_days` full days ending
/// yesterday.
fn metrics_query(lookback_days: u32) -> String {
    let end = Utc::now().date_naive() - Days::new(1);
    let start = end - Days::new(u64::from(lookback_days.saturating_sub(1)));
    format!(
        "SELECT campaign.id, campaign.name, campaign.advertising_channel_type, \
         campaign.primary_status_reasons, campaign_budget.amount_micros, \
         metrics.cost_micros, metrics.conversions_value, segments.date \
         FROM campaign \
         WHERE campaign.status = 'ENABLED' \
         AND campaign.experiment_type != 'EXPERIMENT' \
         AND segments.date BETWEEN '{start}' AND '{end}'"
    )
}

#[async_trait]
impl MetricsSource for AdsApiClient {
    #[instrument(skip(self, account), fields(account = %account.id))]
    async fn fetch_campaign_metrics(
        &self,
        account: &AccountRef,
        lookback_days: u32,
    ) -> Result<Vec<CampaignMetricRow>> {
        let query = metrics_query(lookback_days);
        let results = self
            .rest
            .search(&account.id, &query)
            .await
            .map_err(|e| AdjusterError::DataFetch(e.to_string()))?;

        let mut rows = Vec::with_capacity(results.len());
        for result in results {
            rows.push(
                result
                    .into_metric_row()
                    .map_err(|e| AdjusterError::DataFetch(e.to_string()))?,
            );
        }
        debug!(rows = rows.len(), "fetched metric rows");
        Ok(rows)
    }
}

#[async_trait]
impl CampaignStore for AdsApiClient {
    #[instrument(skip(self, account), fields(account = %account.id))]
    async fn find_campaign(
        &self,
        account: &AccountRef,
        channel_type: ChannelType,
        name: &str,
    ) -> Result<Option<CampaignHandle>> {
        // Performance Max campaigns live behind their own query path;
        // every other channel type shares the general one.
        let type_predicate = if channel_type.is_performance_max() {
            "campaign.advertising_channel_type = 'PERFORMANCE_MAX'"
        } else {
            "campaign.advertising_channel_type != 'PERFORMANCE_MAX'"
        };
        let query = format!(
            "SELECT campaign.resource_name, campaign.campaign_budget \
             FROM campaign \
             WHERE campaign.name = '{}' AND {type_predicate}",
            escape_literal(name)
        );

        let results = self.rest.search(&account.id, &query).await?;
        let Some(result) = results.into_iter().next() else {
            return Ok(None);
        };

        let campaign = result.campaign.ok_or_else(|| {
            AdjusterError::InvalidResponse("lookup result missing campaign".to_string())
        })?;
        let budget_resource = campaign.campaign_budget.ok_or_else(|| {
            AdjusterError::InvalidResponse("campaign missing budget resource".to_string())
        })?;

        Ok(Some(CampaignHandle {
            campaign_resource: campaign.resource_name,
            budget_resource,
        }))
    }

    #[instrument(skip(self, account), fields(account = %account.id))]
    async fn set_daily_budget(
        &self,
        account: &AccountRef,
        handle: &CampaignHandle,
        amount: Decimal,
    ) -> Result<()> {
        let micros = decimal_to_micros(amount)?;
        self.rest
            .update_budget_amount(&account.id, &handle.budget_resource, micros)
            .await
    }
}

#[async_trait]
impl AccountDirectory for AdsApiClient {
    #[instrument(skip(self))]
    async fn list_accounts(&self, ids: &[String]) -> Result<Vec<AccountRef>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let Some(manager_id) = self.rest.login_customer_id() else {
            // Single-account mode: resolve each id against itself.
            let mut accounts = Vec::with_capacity(ids.len());
            for id in ids {
                accounts.push(self.resolve_own_account(id).await?);
            }
            return Ok(accounts);
        };

        let id_list = ids.join(", ");
        let query = format!(
            "SELECT customer_client.id, customer_client.descriptive_name \
             FROM customer_client \
             WHERE customer_client.id IN ({id_list})"
        );
        let results = self.rest.search(manager_id, &query).await?;

        let mut by_id: HashMap<String, AccountRef> = HashMap::new();
        for result in results {
            if let Some(client) = result.customer_client {
                if let Some(id) = client.id {
                    let name = client.descriptive_name.unwrap_or_default();
                    by_id.insert(id.clone(), AccountRef::new(id, name));
                }
            }
        }

        // Preserve the configured processing order; skip unknown ids.
        let mut accounts = Vec::with_capacity(ids.len());
        for id in ids {
            match by_id.remove(id) {
                Some(account) => accounts.push(account),
                None => warn!(account = %id, "account not visible from manager; skipping"),
            }
        }
        Ok(accounts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_literal() {
        assert_eq!(escape_literal("Brand"), "Brand");
        assert_eq!(escape_literal("It's a test"), "It\\'s a test");
        assert_eq!(escape_literal("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_metrics_query_shape() {
        let query = metrics_query(14);
        assert!(query.contains("FROM campaign"));
        assert!(query.contains("campaign.status = 'ENABLED'"));
        assert!(query.contains("campaign.experiment_type != 'EXPERIMENT'"));
        assert!(query.contains("segments.date BETWEEN"));
        assert!(query.contains("metrics.conversions_value"));
    }
}
