//! Audit logging: Postgres-backed append-only log and the best-effort
//! front end the engine writes through

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::warn;

use crate::common::errors::Result;
use crate::common::traits::AuditLog;
use crate::common::types::{
    AccountRef, ApplyOutcome, AuditAction, AuditStatus, CampaignSummary, ChangeRecord,
    ExecutionLogRow, RunStatus, RunSummary, ScriptRunRow,
};
use crate::config::types::AuditConfig;

/// Postgres implementation of the audit log
///
/// Two append-only tables: `execution_log` (one row per action) and
/// `script_runs` (one row per full run).
pub struct PgAuditLog {
    pool: PgPool,
}

impl PgAuditLog {
    /// Connect to the configured Postgres target
    pub async fn connect(config: &AuditConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.database_url)
            .await?;
        Ok(Self { pool })
    }

    /// Create the audit tables if they do not exist yet
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS execution_log (
                id BIGSERIAL PRIMARY KEY,
                ts TIMESTAMPTZ NOT NULL,
                script_id TEXT NOT NULL,
                account_id TEXT NOT NULL,
                account_name TEXT NOT NULL,
                action TEXT NOT NULL,
                entity TEXT NOT NULL,
                old_value NUMERIC,
                new_value NUMERIC,
                reason TEXT NOT NULL,
                status TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS script_runs (
                id BIGSERIAL PRIMARY KEY,
                ts TIMESTAMPTZ NOT NULL,
                script_id TEXT NOT NULL,
                accounts_processed INTEGER NOT NULL,
                total_changes INTEGER NOT NULL,
                error_count INTEGER NOT NULL,
                duration_ms BIGINT NOT NULL,
                status TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl AuditLog for PgAuditLog {
    async fn append_action(&self, row: &ExecutionLogRow) -> Result<()> {
        sqlx::query(
            "INSERT INTO execution_log \
             (ts, script_id, account_id, account_name, action, entity, old_value, new_value, reason, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(row.timestamp)
        .bind(&row.script_id)
        .bind(&row.account_id)
        .bind(&row.account_name)
        .bind(row.action.to_string())
        .bind(&row.entity)
        .bind(row.old_value)
        .bind(row.new_value)
        .bind(&row.reason)
        .bind(row.status.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn append_run(&self, row: &ScriptRunRow) -> Result<()> {
        sqlx::query(
            "INSERT INTO script_runs \
             (ts, script_id, accounts_processed, total_changes, error_count, duration_ms, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(row.timestamp)
        .bind(&row.script_id)
        .bind(row.accounts_processed as i32)
        .bind(row.total_changes as i32)
        .bind(row.error_count as i32)
        .bind(row.duration_ms as i64)
        .bind(row.status.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

/// Best-effort audit front end used by the engine
///
/// An absent target makes every record call a no-op; append failures
/// are logged and swallowed. Auditing can never change a run's
/// outcome or counts.
#[derive(Clone)]
pub struct Auditor {
    log: Option<Arc<dyn AuditLog>>,
    script_id: String,
}

impl Auditor {
    pub fn new(log: Option<Arc<dyn AuditLog>>, script_id: impl Into<String>) -> Self {
        Self {
            log,
            script_id: script_id.into(),
        }
    }

    async fn append_action(&self, row: ExecutionLogRow) {
        if let Some(log) = &self.log {
            if let Err(e) = log.append_action(&row).await {
                warn!(error = %e, "audit append failed");
            }
        }
    }

    /// Record an attempted budget change with its outcome
    pub async fn record_change(&self, record: &ChangeRecord) {
        let status = match record.outcome {
            ApplyOutcome::Applied => AuditStatus::Ok,
            ApplyOutcome::Failed => AuditStatus::Failed,
        };
        self.append_action(ExecutionLogRow {
            timestamp: Utc::now(),
            script_id: self.script_id.clone(),
            account_id: record.account_id.clone(),
            account_name: record.account_name.clone(),
            action: record.kind.into(),
            entity: format!("{} [{}]", record.campaign_name, record.channel_type),
            old_value: Some(record.old_budget),
            new_value: Some(record.new_budget),
            reason: record.reason.clone(),
            status,
        })
        .await;
    }

    /// Record a campaign left untouched
    pub async fn record_no_change(&self, account: &AccountRef, summary: &CampaignSummary) {
        self.append_action(ExecutionLogRow {
            timestamp: Utc::now(),
            script_id: self.script_id.clone(),
            account_id: account.id.clone(),
            account_name: account.name.clone(),
            action: AuditAction::NoChange,
            entity: format!("{} [{}]", summary.name, summary.channel_type),
            old_value: Some(summary.daily_budget),
            new_value: None,
            reason: String::new(),
            status: AuditStatus::Ok,
        })
        .await;
    }

    /// Record an account-level failure
    pub async fn record_account_error(&self, account: &AccountRef, message: &str) {
        self.append_action(ExecutionLogRow {
            timestamp: Utc::now(),
            script_id: self.script_id.clone(),
            account_id: account.id.clone(),
            account_name: account.name.clone(),
            action: AuditAction::Error,
            entity: "account".to_string(),
            old_value: None,
            new_value: None,
            reason: message.to_string(),
            status: AuditStatus::Failed,
        })
        .await;
    }

    /// Record the run-summary row; always called once per run
    pub async fn record_run(&self, summary: &RunSummary) {
        let Some(log) = &self.log else {
            return;
        };
        let status = if summary.errors > 0 {
            RunStatus::CompletedWithErrors
        } else {
            RunStatus::Completed
        };
        let row = ScriptRunRow {
            timestamp: Utc::now(),
            script_id: self.script_id.clone(),
            accounts_processed: summary.accounts_processed,
            total_changes: summary.total_changes,
            error_count: summary.errors,
            duration_ms: summary.duration_ms,
            status,
        };
        if let Err(e) = log.append_run(&row).await {
            warn!(error = %e, "run audit append failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::errors::AdjusterError;
    use crate::common::traits::MockAuditLog;
    use crate::common::types::{AdjustmentKind, ChannelType};
    use rust_decimal_macros::dec;

    fn change_record(outcome: ApplyOutcome) -> ChangeRecord {
        ChangeRecord {
            account_name: "Test Account".to_string(),
            account_id: "1234567890".to_string(),
            campaign_name: "Brand".to_string(),
            channel_type: ChannelType::PerformanceMax,
            kind: AdjustmentKind::Decrease,
            old_budget: dec!(1000),
            new_budget: dec!(360),
            reason: "Underspend".to_string(),
            outcome,
        }
    }

    #[tokio::test]
    async fn test_record_change_maps_outcome_to_status() {
        let mut log = MockAuditLog::new();
        log.expect_append_action()
            .withf(|row| {
                row.action == AuditAction::Decrease
                    && row.status == AuditStatus::Ok
                    && row.entity == "Brand [PERFORMANCE_MAX]"
                    && row.old_value == Some(dec!(1000))
                    && row.new_value == Some(dec!(360))
                    && row.script_id == "test-script"
            })
            .times(1)
            .returning(|_| Ok(()));

        let auditor = Auditor::new(Some(Arc::new(log)), "test-script");
        auditor.record_change(&change_record(ApplyOutcome::Applied)).await;
    }

    #[tokio::test]
    async fn test_record_change_failure_is_marked_failed() {
        let mut log = MockAuditLog::new();
        log.expect_append_action()
            .withf(|row| row.status == AuditStatus::Failed)
            .times(1)
            .returning(|_| Ok(()));

        let auditor = Auditor::new(Some(Arc::new(log)), "test-script");
        auditor.record_change(&change_record(ApplyOutcome::Failed)).await;
    }

    #[tokio::test]
    async fn test_append_failures_are_swallowed() {
        let mut log = MockAuditLog::new();
        log.expect_append_action()
            .returning(|_| Err(AdjusterError::Audit("connection reset".to_string())));

        let auditor = Auditor::new(Some(Arc::new(log)), "test-script");
        // Must complete without propagating the error
        auditor.record_change(&change_record(ApplyOutcome::Applied)).await;
    }

    #[tokio::test]
    async fn test_run_status_reflects_error_count() {
        let mut log = MockAuditLog::new();
        log.expect_append_run()
            .withf(|row| row.status == RunStatus::CompletedWithErrors && row.error_count == 2)
            .times(1)
            .returning(|_| Ok(()));

        let auditor = Auditor::new(Some(Arc::new(log)), "test-script");
        auditor
            .record_run(&RunSummary {
                started_at: Utc::now(),
                accounts_processed: 3,
                accounts_with_changes: 0,
                total_changes: 0,
                errors: 2,
                duration_ms: 1200,
            })
            .await;
    }

    #[tokio::test]
    async fn test_disabled_auditor_is_a_noop() {
        let auditor = Auditor::new(None, "test-script");
        auditor.record_change(&change_record(ApplyOutcome::Applied)).await;
        auditor
            .record_account_error(&AccountRef::new("1", "A"), "metrics query failed")
            .await;
    }
}
