//! Core engine: aggregation, decisions, budget application and run orchestration
//!
//! Control flow:
//!
//! ```text
//! Coordinator ──▶ (per account) run_account
//!                     │
//!                     ▼
//!                 aggregate ──▶ decide ──▶ BudgetApplier
//!                     │
//!                     ▼
//!                 ChangeRecords ──▶ Coordinator ──▶ Notifier / AuditLog
//! ```
//!
//! Everything here is either pure (`aggregate`, `decide`) or talks to
//! the outside world only through the collaborator traits in
//! [`crate::common::traits`].

pub mod account;
pub mod aggregate;
pub mod apply;
pub mod coordinator;
pub mod decision;

pub use account::{run_account, AccountRunResult};
pub use aggregate::aggregate;
pub use apply::BudgetApplier;
pub use coordinator::Coordinator;
pub use decision::decide;
