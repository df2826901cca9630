//! BudgetAdjuster - Main Entry Point
//!
//! Runs one budget adjustment pass over the configured accounts and
//! exits. Scheduling is left to the host (cron, systemd timer).

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use budget_adjuster::common::traits::{AuditLog, Notifier};
use budget_adjuster::config::load_config;
use budget_adjuster::report::audit::{Auditor, PgAuditLog};
use budget_adjuster::report::notify::WebhookNotifier;
use budget_adjuster::{AdsApiClient, AdsRestClient, Coordinator};

/// CLI arguments for the application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Comma-separated customer ids overriding the configured list
    #[arg(long)]
    accounts: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting BudgetAdjuster");
    info!("Configuration file: {}", args.config);

    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let mut config = load_config(Some(&args.config))?;
    if let Some(accounts) = args.accounts {
        config.ads.monitored_accounts = accounts
            .split(',')
            .map(|id| id.trim().to_string())
            .filter(|id| !id.is_empty())
            .collect();
    }

    let request_timeout = Duration::from_secs(config.settings.request_timeout_seconds);
    let rest = AdsRestClient::with_timeout(&config.ads, request_timeout)?;
    let ads = Arc::new(AdsApiClient::from_rest(rest));

    let notifier: Option<Arc<dyn Notifier>> = match &config.notification {
        Some(notification) => Some(Arc::new(WebhookNotifier::new(notification)?)),
        None => None,
    };

    // A misconfigured audit target degrades to a warning; the run
    // itself must still happen.
    let audit_log: Option<Arc<dyn AuditLog>> = match &config.audit {
        Some(audit) => match PgAuditLog::connect(audit).await {
            Ok(log) => {
                if let Err(e) = log.ensure_schema().await {
                    warn!(error = %e, "could not ensure audit schema");
                }
                Some(Arc::new(log))
            }
            Err(e) => {
                warn!(error = %e, "audit log unavailable; continuing without it");
                None
            }
        },
        None => None,
    };
    let auditor = Auditor::new(audit_log, config.script_id.clone());

    let coordinator = Coordinator::new(
        ads.clone(),
        ads.clone(),
        ads,
        notifier,
        auditor,
        config,
    );

    let summary = coordinator.run().await;
    info!(
        accounts_processed = summary.accounts_processed,
        total_changes = summary.total_changes,
        errors = summary.errors,
        duration_ms = summary.duration_ms,
        "BudgetAdjuster finished"
    );

    Ok(())
}
