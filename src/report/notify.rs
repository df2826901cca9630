//! Run notifications: summary rendering and webhook delivery

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use reqwest::Client;
use rust_decimal_macros::dec;
use sha2::Sha256;
use tracing::{info, instrument};
use url::Url;

use crate::common::errors::{AdjusterError, Result};
use crate::common::traits::Notifier;
use crate::common::types::{AdjustmentKind, ChangeRecord, RunSummary};
use crate::config::types::{DecisionConfig, NotificationConfig};

type HmacSha256 = Hmac<Sha256>;

/// Subject line for a run notification
pub fn render_subject(changes: &[ChangeRecord]) -> String {
    let accounts = changes
        .iter()
        .map(|c| c.account_id.as_str())
        .collect::<HashSet<_>>()
        .len();
    format!(
        "[Budget Adjuster] {} changes across {} accounts",
        changes.len(),
        accounts
    )
}

/// Text body for a run notification
///
/// Header with run counts, then the changes grouped per account in
/// first-seen order, then the active thresholds.
pub fn render_body(
    summary: &RunSummary,
    changes: &[ChangeRecord],
    config: &DecisionConfig,
) -> String {
    let rule = "=".repeat(50);
    let mut body = String::new();

    body.push_str(&format!(
        "Budget Adjuster - {}\n{rule}\n",
        summary.started_at.format("%Y-%m-%d %H:%M UTC")
    ));
    body.push_str(&format!("Accounts processed: {}\n", summary.accounts_processed));
    body.push_str(&format!(
        "Accounts with changes: {}\n",
        summary.accounts_with_changes
    ));
    body.push_str(&format!("Total changes: {}\n\n", summary.total_changes));

    let increases = changes
        .iter()
        .filter(|c| c.kind == AdjustmentKind::Increase)
        .count();
    let decreases = changes
        .iter()
        .filter(|c| c.kind == AdjustmentKind::Decrease)
        .count();
    body.push_str(&format!("↑ Increases: {increases}\n↓ Decreases: {decreases}\n\n"));

    body.push_str(&format!("{rule}\nCHANGES\n{rule}\n"));

    let mut account_order: Vec<&str> = Vec::new();
    for change in changes {
        if !account_order.contains(&change.account_id.as_str()) {
            account_order.push(&change.account_id);
        }
    }

    for account_id in account_order {
        let account_changes: Vec<&ChangeRecord> = changes
            .iter()
            .filter(|c| c.account_id == account_id)
            .collect();
        let account_name = &account_changes[0].account_name;

        body.push_str(&format!("\n{account_name} ({account_id})\n"));
        body.push_str(&"-".repeat(40));
        body.push('\n');

        for change in account_changes {
            let arrow = match change.kind {
                AdjustmentKind::Increase => "↑",
                AdjustmentKind::Decrease => "↓",
            };
            let type_label = if change.channel_type.is_performance_max() {
                " [PMAX]"
            } else {
                ""
            };
            body.push_str(&format!("{arrow} {}{type_label}\n", change.campaign_name));
            body.push_str(&format!(
                "   {} -> {}\n",
                change.old_budget.round_dp(0),
                change.new_budget.round_dp(0)
            ));
            body.push_str(&format!("   Reason: {}\n\n", change.reason));
        }
    }

    body.push_str(&format!("{rule}\nConfiguration:\n"));
    body.push_str(&format!(
        "- Max PNO for increase: {}%\n",
        (config.max_profitability_ratio_for_increase * dec!(100)).round_dp(0)
    ));
    body.push_str(&format!(
        "- Increase: +{}%\n",
        ((config.increase_multiplier - dec!(1)) * dec!(100)).round_dp(0)
    ));
    body.push_str(&format!(
        "- Underspend threshold: {}%\n",
        (config.underspend_threshold * dec!(100)).round_dp(0)
    ));
    body.push_str(&format!("- Minimum budget: {}\n", config.minimum_budget));

    body
}

/// Generate an HMAC-SHA256 signature over a webhook payload
fn sign_payload(secret: &str, payload: &str) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AdjusterError::Internal(e.to_string()))?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Notifier that posts the rendered summary to a webhook endpoint
///
/// The payload is a JSON object with recipient, subject and body.
/// When a signing secret is configured, the raw payload is signed
/// with HMAC-SHA256 and the hex signature sent as `X-Signature`.
pub struct WebhookNotifier {
    client: Client,
    endpoint: String,
    recipient: String,
    signing_secret: Option<String>,
}

impl WebhookNotifier {
    /// Create a notifier for the configured endpoint
    pub fn new(config: &NotificationConfig) -> Result<Self> {
        Self::with_timeout(config, Duration::from_secs(30))
    }

    /// Create a notifier with a custom request timeout
    pub fn with_timeout(config: &NotificationConfig, timeout: Duration) -> Result<Self> {
        Url::parse(&config.endpoint).map_err(|e| {
            AdjusterError::Configuration(format!("invalid notification endpoint: {e}"))
        })?;

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AdjusterError::Internal(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            recipient: config.recipient.clone(),
            signing_secret: config.signing_secret.clone(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    #[instrument(skip(self, body))]
    async fn send(&self, subject: &str, body: &str) -> Result<()> {
        let payload = serde_json::json!({
            "recipient": self.recipient,
            "subject": subject,
            "body": body,
        });
        let raw = serde_json::to_string(&payload)?;

        let mut request = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json");
        if let Some(secret) = &self.signing_secret {
            request = request.header("X-Signature", sign_payload(secret, &raw)?);
        }

        let response = request
            .body(raw)
            .send()
            .await
            .map_err(|e| AdjusterError::Notify(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AdjusterError::Notify(format!(
                "endpoint returned status {status}: {text}"
            )));
        }

        info!(recipient = %self.recipient, "notification delivered");
        Ok(())
    }
}
