//! Configuration types

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Google Ads API configuration
    pub ads: AdsConfig,
    /// Decision engine thresholds
    #[serde(default)]
    pub decision: DecisionConfig,
    /// Trailing window length in days
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
    /// Identifier recorded with every audit row
    #[serde(default = "default_script_id")]
    pub script_id: String,
    /// Notification target (optional; absent = no notifications)
    #[serde(default)]
    pub notification: Option<NotificationConfig>,
    /// Audit log target (optional; absent = no audit logging)
    #[serde(default)]
    pub audit: Option<AuditConfig>,
    /// General application settings
    #[serde(default)]
    pub settings: AppSettings,
}

/// Google Ads API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdsConfig {
    /// Base URL for the Google Ads REST API
    #[serde(default = "default_ads_endpoint")]
    pub endpoint: String,
    /// Developer token for API access
    pub developer_token: String,
    /// OAuth access token
    pub access_token: String,
    /// Manager (MCC) customer id, set for multi-account runs
    #[serde(default)]
    pub login_customer_id: Option<String>,
    /// Customer ids to process (digits, no dashes)
    #[serde(default)]
    pub monitored_accounts: Vec<String>,
}

fn default_ads_endpoint() -> String {
    "https://googleads.googleapis.com/v16".to_string()
}

fn default_lookback_days() -> u32 {
    14
}

fn default_script_id() -> String {
    "budget-adjuster".to_string()
}

/// Decision engine thresholds
///
/// All of these are deployment configuration; the defaults are
/// starting points, not hard rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionConfig {
    /// Highest cost/revenue ratio that still qualifies for an increase
    #[serde(default = "default_max_profitability_ratio")]
    pub max_profitability_ratio_for_increase: Decimal,
    /// Multiplier applied to the budget on increase
    #[serde(default = "default_increase_multiplier")]
    pub increase_multiplier: Decimal,
    /// Fraction of budget below which trailing spend counts as underspend
    #[serde(default = "default_underspend_threshold")]
    pub underspend_threshold: Decimal,
    /// Multiplier on actual spend when computing a decreased budget
    #[serde(default = "default_decrease_buffer")]
    pub decrease_buffer: Decimal,
    /// Floor below which a budget is never decreased
    #[serde(default = "default_minimum_budget")]
    pub minimum_budget: Decimal,
    /// A decrease is only issued if the candidate budget is below
    /// current budget times this fraction
    #[serde(default = "default_decrease_significance_threshold")]
    pub decrease_significance_threshold: Decimal,
}

impl Default for DecisionConfig {
    fn default() -> Self {
        Self {
            max_profitability_ratio_for_increase: default_max_profitability_ratio(),
            increase_multiplier: default_increase_multiplier(),
            underspend_threshold: default_underspend_threshold(),
            decrease_buffer: default_decrease_buffer(),
            minimum_budget: default_minimum_budget(),
            decrease_significance_threshold: default_decrease_significance_threshold(),
        }
    }
}

fn default_max_profitability_ratio() -> Decimal {
    dec!(0.15)
}

fn default_increase_multiplier() -> Decimal {
    dec!(1.3)
}

fn default_underspend_threshold() -> Decimal {
    dec!(0.7)
}

fn default_decrease_buffer() -> Decimal {
    dec!(1.2)
}

fn default_minimum_budget() -> Decimal {
    dec!(160)
}

fn default_decrease_significance_threshold() -> Decimal {
    dec!(0.95)
}

/// Notification target configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Webhook endpoint the summary is posted to
    pub endpoint: String,
    /// Recipient address included in the payload
    pub recipient: String,
    /// Secret for HMAC-SHA256 payload signing (optional)
    #[serde(default)]
    pub signing_secret: Option<String>,
}

/// Audit log target configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Postgres connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_defaults() {
        let config = DecisionConfig::default();
        assert_eq!(config.max_profitability_ratio_for_increase, dec!(0.15));
        assert_eq!(config.increase_multiplier, dec!(1.3));
        assert_eq!(config.underspend_threshold, dec!(0.7));
        assert_eq!(config.decrease_buffer, dec!(1.2));
        assert_eq!(config.minimum_budget, dec!(160));
        assert_eq!(config.decrease_significance_threshold, dec!(0.95));
    }

    #[test]
    fn test_minimal_config_deserializes() {
        let json = r#"{
            "ads": {
                "developer_token": "dev-token",
                "access_token": "access-token"
            }
        }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.lookback_days, 14);
        assert_eq!(config.script_id, "budget-adjuster");
        assert!(config.notification.is_none());
        assert!(config.audit.is_none());
        assert!(config.ads.monitored_accounts.is_empty());
        assert!(config.ads.endpoint.starts_with("https://googleads"));
    }

    #[test]
    fn test_decision_overrides() {
        let json = r#"{"underspend_threshold": "0.5", "minimum_budget": "50"}"#;
        let config: DecisionConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.underspend_threshold, dec!(0.5));
        assert_eq!(config.minimum_budget, dec!(50));
        assert_eq!(config.increase_multiplier, dec!(1.3));
    }
}
