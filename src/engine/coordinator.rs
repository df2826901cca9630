//! Multi-account coordination
//!
//! Iterates the configured accounts strictly one at a time,
//! accumulates applied changes and counts, and triggers reporting at
//! the end of the run. The run always completes with a `RunSummary`,
//! even when every account fails.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::common::traits::{AccountDirectory, CampaignStore, MetricsSource, Notifier};
use crate::common::types::{ChangeRecord, RunSummary};
use crate::config::types::AppConfig;
use crate::engine::account::run_account;
use crate::report::audit::Auditor;
use crate::report::notify;

/// Drives one full run across all monitored accounts
pub struct Coordinator {
    metrics: Arc<dyn MetricsSource>,
    store: Arc<dyn CampaignStore>,
    directory: Arc<dyn AccountDirectory>,
    notifier: Option<Arc<dyn Notifier>>,
    auditor: Auditor,
    config: AppConfig,
}

impl Coordinator {
    pub fn new(
        metrics: Arc<dyn MetricsSource>,
        store: Arc<dyn CampaignStore>,
        directory: Arc<dyn AccountDirectory>,
        notifier: Option<Arc<dyn Notifier>>,
        auditor: Auditor,
        config: AppConfig,
    ) -> Self {
        Self {
            metrics,
            store,
            directory,
            notifier,
            auditor,
            config,
        }
    }

    /// Execute one full run and return its summary
    pub async fn run(&self) -> RunSummary {
        let started_at = Utc::now();
        let timer = Instant::now();
        info!(
            accounts = self.config.ads.monitored_accounts.len(),
            lookback_days = self.config.lookback_days,
            "starting budget adjustment run"
        );

        let mut all_changes: Vec<ChangeRecord> = Vec::new();
        let mut accounts_processed = 0u32;
        let mut accounts_with_changes = 0u32;
        let mut errors = 0u32;

        let accounts = match self
            .directory
            .list_accounts(&self.config.ads.monitored_accounts)
            .await
        {
            Ok(accounts) => accounts,
            Err(e) => {
                error!(error = %e, "account directory lookup failed");
                errors += 1;
                Vec::new()
            }
        };

        if accounts.is_empty() && errors == 0 {
            warn!("no accounts resolved; nothing to do");
        }

        for account in &accounts {
            accounts_processed += 1;
            let result = run_account(
                account,
                self.metrics.as_ref(),
                self.store.as_ref(),
                &self.auditor,
                &self.config.decision,
                self.config.lookback_days,
            )
            .await;

            if result.failed {
                errors += 1;
            }
            if !result.changes.is_empty() {
                accounts_with_changes += 1;
                all_changes.extend(result.changes);
            }
        }

        let summary = RunSummary {
            started_at,
            accounts_processed,
            accounts_with_changes,
            total_changes: all_changes.len() as u32,
            errors,
            duration_ms: timer.elapsed().as_millis() as u64,
        };

        self.auditor.record_run(&summary).await;
        self.notify(&summary, &all_changes).await;

        info!(
            accounts_processed = summary.accounts_processed,
            accounts_with_changes = summary.accounts_with_changes,
            total_changes = summary.total_changes,
            errors = summary.errors,
            duration_ms = summary.duration_ms,
            "run complete"
        );
        summary
    }

    /// Deliver the notification when there is something to report
    async fn notify(&self, summary: &RunSummary, changes: &[ChangeRecord]) {
        if summary.total_changes == 0 {
            return;
        }
        let Some(notifier) = &self.notifier else {
            return;
        };

        let subject = notify::render_subject(changes);
        let body = notify::render_body(summary, changes, &self.config.decision);
        if let Err(e) = notifier.send(&subject, &body).await {
            warn!(error = %e, "notification delivery failed");
        }
    }
}
