//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresAccountRepository` - Client accounts and the atomic trial debit
//! - `PostgresTrialOriginRepository` - Trial origin gate records
//! - `PostgresBillingEventRepository` - Webhook idempotency and audit rows
//! - `PostgresAnalyticsSink` - Analytics event log

mod account_repository;
mod analytics_sink;
mod billing_event_repository;
mod trial_origin_repository;

pub use account_repository::PostgresAccountRepository;
pub use analytics_sink::PostgresAnalyticsSink;
pub use billing_event_repository::PostgresBillingEventRepository;
pub use trial_origin_repository::PostgresTrialOriginRepository;
