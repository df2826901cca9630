//! Google Ads REST API message types
//!
//! The REST API serializes int64 fields (ids, micros) as JSON strings;
//! the DTOs keep them as strings and the conversion helpers turn them
//! into domain values exactly once, at this boundary.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::common::errors::{AdjusterError, Result};
use crate::common::types::{CampaignMetricRow, ChannelType, StatusReason};

/// Request body for the search endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_token: Option<String>,
}

/// Response body for the search endpoint
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub next_page_token: Option<String>,
}

/// One result row from a search query
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchResult {
    pub campaign: Option<CampaignResource>,
    pub campaign_budget: Option<CampaignBudgetResource>,
    pub metrics: Option<MetricsResource>,
    pub segments: Option<SegmentsResource>,
    pub customer_client: Option<CustomerClientResource>,
    pub customer: Option<CustomerResource>,
}

/// Selected campaign resource fields
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CampaignResource {
    pub resource_name: String,
    pub id: Option<String>,
    pub name: Option<String>,
    pub advertising_channel_type: Option<ChannelType>,
    pub primary_status_reasons: Option<Vec<StatusReason>>,
    /// Resource name of the campaign's budget
    pub campaign_budget: Option<String>,
}

/// Selected campaign budget resource fields
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CampaignBudgetResource {
    pub resource_name: String,
    pub amount_micros: Option<String>,
}

/// Selected metrics fields
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetricsResource {
    pub cost_micros: Option<String>,
    pub conversions_value: Option<f64>,
}

/// Selected segment fields
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SegmentsResource {
    pub date: Option<String>,
}

/// Selected customer client fields (manager account queries)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerClientResource {
    pub id: Option<String>,
    pub descriptive_name: Option<String>,
}

/// Selected customer fields (single-account queries)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerResource {
    pub id: Option<String>,
    pub descriptive_name: Option<String>,
}

/// Request body for the campaign budget mutate endpoint
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetMutateRequest {
    pub operations: Vec<BudgetOperation>,
}

/// One update operation in a mutate request
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetOperation {
    pub update_mask: String,
    pub update: BudgetUpdate,
}

/// Updated campaign budget fields
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetUpdate {
    pub resource_name: String,
    pub amount_micros: String,
}

/// Response body for the campaign budget mutate endpoint
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BudgetMutateResponse {
    pub results: Vec<MutateResult>,
}

/// One result entry from a mutate response
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MutateResult {
    pub resource_name: String,
}

/// Convert a micros string from the API into a currency amount
pub fn micros_to_decimal(micros: &str) -> Result<Decimal> {
    let micros: i64 = micros
        .parse()
        .map_err(|e| AdjusterError::InvalidResponse(format!("invalid micros value: {e}")))?;
    Ok(Decimal::new(micros, 6))
}

/// Convert a currency amount into whole micros for the API
pub fn decimal_to_micros(amount: Decimal) -> Result<i64> {
    (amount * dec!(1_000_000))
        .round()
        .to_i64()
        .ok_or_else(|| AdjusterError::Internal(format!("amount out of range: {amount}")))
}

impl SearchResult {
    /// Convert a metrics query result into a domain metric row
    ///
    /// Status reasons arrive as API strings and are parsed into typed
    /// flags here, exactly once; nothing downstream re-parses them.
    pub fn into_metric_row(self) -> Result<CampaignMetricRow> {
        let campaign = self.campaign.ok_or_else(|| {
            AdjusterError::InvalidResponse("result missing campaign".to_string())
        })?;
        let campaign_id = campaign
            .id
            .ok_or_else(|| AdjusterError::InvalidResponse("campaign missing id".to_string()))?;

        let daily_budget = match self
            .campaign_budget
            .as_ref()
            .and_then(|b| b.amount_micros.as_deref())
        {
            Some(micros) => micros_to_decimal(micros)?,
            None => Decimal::ZERO,
        };

        let metrics = self.metrics.unwrap_or_default();
        let cost = match metrics.cost_micros.as_deref() {
            Some(micros) => micros_to_decimal(micros)?,
            None => Decimal::ZERO,
        };
        let revenue = match metrics.conversions_value {
            Some(value) => Decimal::try_from(value).map_err(|e| {
                AdjusterError::InvalidResponse(format!("invalid conversions value: {e}"))
            })?,
            None => Decimal::ZERO,
        };

        Ok(CampaignMetricRow {
            campaign_id,
            campaign_name: campaign.name.unwrap_or_default(),
            channel_type: campaign
                .advertising_channel_type
                .unwrap_or(ChannelType::Unknown),
            status_reasons: campaign.primary_status_reasons.unwrap_or_default(),
            daily_budget,
            cost,
            revenue,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const SEARCH_RESULT: &str = r#"{
        "campaign": {
            "resourceName": "customers/1234567890/campaigns/111",
            "id": "111",
            "name": "Shopping CZ",
            "advertisingChannelType": "PERFORMANCE_MAX",
            "primaryStatusReasons": ["BUDGET_CONSTRAINED"],
            "campaignBudget": "customers/1234567890/campaignBudgets/222"
        },
        "campaignBudget": {
            "resourceName": "customers/1234567890/campaignBudgets/222",
            "amountMicros": "1000000000"
        },
        "metrics": {
            "costMicros": "71500000",
            "conversionsValue": 715.0
        },
        "segments": {
            "date": "2024-01-15"
        }
    }"#;

    #[test]
    fn test_metric_row_from_search_result() {
        let result: SearchResult = serde_json::from_str(SEARCH_RESULT).unwrap();
        let row = result.into_metric_row().unwrap();

        assert_eq!(row.campaign_id, "111");
        assert_eq!(row.campaign_name, "Shopping CZ");
        assert!(row.channel_type.is_performance_max());
        assert!(row.is_budget_constrained());
        assert_eq!(row.daily_budget, dec!(1000));
        assert_eq!(row.cost, dec!(71.5));
        assert_eq!(row.revenue, dec!(715));
    }

    #[test]
    fn test_missing_metrics_default_to_zero() {
        let json = r#"{"campaign": {"resourceName": "customers/1/campaigns/2", "id": "2", "name": "X"}}"#;
        let result: SearchResult = serde_json::from_str(json).unwrap();
        let row = result.into_metric_row().unwrap();

        assert_eq!(row.daily_budget, Decimal::ZERO);
        assert_eq!(row.cost, Decimal::ZERO);
        assert_eq!(row.revenue, Decimal::ZERO);
        assert!(row.status_reasons.is_empty());
    }

    #[test]
    fn test_missing_campaign_is_rejected() {
        let result: SearchResult = serde_json::from_str("{}").unwrap();
        assert!(result.into_metric_row().is_err());
    }

    #[test]
    fn test_micros_round_trip() {
        assert_eq!(micros_to_decimal("1000000000").unwrap(), dec!(1000));
        assert_eq!(micros_to_decimal("1500000").unwrap(), dec!(1.5));
        assert_eq!(decimal_to_micros(dec!(360)).unwrap(), 360_000_000);
        assert_eq!(decimal_to_micros(dec!(828.6)).unwrap(), 828_600_000);
        assert!(micros_to_decimal("not-a-number").is_err());
    }

    #[test]
    fn test_mutate_request_serializes_camel_case() {
        let request = BudgetMutateRequest {
            operations: vec![BudgetOperation {
                update_mask: "amount_micros".to_string(),
                update: BudgetUpdate {
                    resource_name: "customers/1/campaignBudgets/2".to_string(),
                    amount_micros: "360000000".to_string(),
                },
            }],
        };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"updateMask\""));
        assert!(json.contains("\"resourceName\""));
        assert!(json.contains("\"amountMicros\":\"360000000\""));
    }
}
