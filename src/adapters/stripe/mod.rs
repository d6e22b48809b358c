//! Stripe payment provider adapter.
//!
//! Implements the `PaymentProvider` port for Stripe integration:
//! - Checkout sessions (standard and promotional)
//! - Checkout session retrieval for post-redirect confirmation
//! - Billing portal sessions
//!
//! Webhook signature verification lives in `domain::billing`.
//!
//! # Security
//!
//! - The API key is held in `secrecy::SecretString`
//! - Session ids are validated before they are placed in a request path

mod mock_payment_provider;
mod stripe_adapter;

pub use mock_payment_provider::{MethodCall, MockPaymentProvider};
pub use stripe_adapter::{StripeConfig, StripePaymentAdapter};
