//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Storage Ports
//!
//! - `AccountRepository` - Per-client trial and premium records
//! - `TrialOriginRepository` - First trial claimant per network origin
//! - `BillingEventRepository` - Payment event audit and idempotency
//! - `AnalyticsSink` - Best-effort product events
//!
//! ## External Service Ports
//!
//! - `SuggestionGenerator` - AI suggestion generation
//! - `PaymentProvider` - Stripe checkout, confirmation and portal

mod account_repository;
mod analytics_sink;
mod billing_event_repository;
mod payment_provider;
mod suggestion_generator;
mod trial_origin_repository;

pub use account_repository::{AccountRepository, PremiumGrant};
pub use analytics_sink::AnalyticsSink;
pub use billing_event_repository::{BillingEventRepository, SaveResult};
pub use payment_provider::{
    CheckoutLineItem, CheckoutSession, CreateCheckoutRequest, PaymentError, PaymentErrorCode,
    PaymentProvider, PortalSession,
};
pub use suggestion_generator::{GeneratorError, SuggestionGenerator};
pub use trial_origin_repository::TrialOriginRepository;
