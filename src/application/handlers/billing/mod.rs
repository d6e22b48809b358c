//! Billing handlers.
//!
//! ## Commands
//! - Creating standard and promotional checkout sessions
//! - Creating customer-portal sessions
//! - Confirming a checkout after the browser redirect
//! - Processing payment webhooks

mod confirm_checkout;
mod create_checkout;
mod create_portal_session;
mod create_promo_checkout;
mod handle_payment_webhook;
mod settings;

pub use confirm_checkout::{ConfirmCheckoutCommand, ConfirmCheckoutHandler, ConfirmCheckoutResult};
pub use create_checkout::{CreateCheckoutCommand, CreateCheckoutHandler, CreateCheckoutResult};
pub use create_portal_session::{
    CreatePortalSessionCommand, CreatePortalSessionHandler, CreatePortalSessionResult,
};
pub use create_promo_checkout::CreatePromoCheckoutHandler;
pub use handle_payment_webhook::{
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, HandlePaymentWebhookResult,
};
pub use settings::CheckoutSettings;

use crate::domain::entitlement::EntitlementError;
use crate::ports::PaymentError;

/// Maps a provider failure to the upstream error, logging the detail.
fn payment_failure(operation: &str, err: PaymentError) -> EntitlementError {
    tracing::error!(
        operation,
        code = ?err.code,
        provider_code = ?err.provider_code,
        error = %err,
        "Payment provider call failed"
    );
    EntitlementError::upstream(err.to_string())
}
