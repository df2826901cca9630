//! Reporting: run notifications and audit logging

pub mod audit;
pub mod notify;

pub use audit::{Auditor, PgAuditLog};
pub use notify::WebhookNotifier;
