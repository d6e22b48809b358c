//! Billing module - payment provider events and their verification.
//!
//! Stripe pushes events to the webhook endpoint; this module parses them,
//! verifies their signatures and defines the audit record kept per event.

mod billing_event;
mod checkout;
mod stripe_event;
mod webhook_errors;
mod webhook_verifier;

pub use billing_event::{BillingEvent, PLAN_WEEKLY};
pub use checkout::{
    CheckoutSessionDetails, SubscriptionDetails, SubscriptionStatus, METADATA_CLIENT_ID,
    METADATA_PROMO_TYPE, METADATA_USER_ID, PROMO_ACTIVATION_WEEK,
};
pub use stripe_event::{StripeEvent, StripeEventData, StripeEventType};
pub use webhook_errors::WebhookError;
pub use webhook_verifier::{SignatureHeader, StripeWebhookVerifier};

#[cfg(test)]
pub use webhook_verifier::compute_test_signature;
