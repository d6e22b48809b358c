//! In-memory adapters for development and testing.
//!
//! These stores are process-local. They are refused by configuration in
//! production because entitlement state must survive restarts and be shared
//! across instances.

mod account_repository;
mod analytics_sink;
mod billing_event_repository;
mod trial_origin_repository;

pub use account_repository::InMemoryAccountRepository;
pub use analytics_sink::InMemoryAnalyticsSink;
pub use billing_event_repository::InMemoryBillingEventRepository;
pub use trial_origin_repository::InMemoryTrialOriginRepository;
