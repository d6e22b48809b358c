//! Shared application state for the HTTP layer.

use std::sync::Arc;

use secrecy::SecretString;

use crate::adapters::analytics::AnalyticsDispatcher;
use crate::application::handlers::{
    CheckTrialHandler, CheckoutSettings, ConfirmCheckoutHandler, CreateCheckoutHandler,
    CreatePortalSessionHandler, CreatePromoCheckoutHandler, GenerateSuggestionsHandler,
    GetStatusHandler, GrantPremiumHandler, HandlePaymentWebhookHandler, RecordAnalyticsHandler,
    StartTrialHandler,
};
use crate::domain::billing::StripeWebhookVerifier;
use crate::domain::entitlement::EntitlementPolicy;
use crate::ports::{
    AccountRepository, BillingEventRepository, PaymentProvider, SuggestionGenerator,
    TrialOriginRepository,
};

/// Shared application state containing all dependencies.
///
/// Cloned for each request; dependencies are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<dyn AccountRepository>,
    pub trial_origins: Arc<dyn TrialOriginRepository>,
    pub billing_events: Arc<dyn BillingEventRepository>,
    pub generator: Arc<dyn SuggestionGenerator>,
    pub payment_provider: Arc<dyn PaymentProvider>,
    pub analytics: AnalyticsDispatcher,
    pub webhook_verifier: StripeWebhookVerifier,
    pub policy: EntitlementPolicy,
    pub checkout: CheckoutSettings,
    pub admin_token: Option<SecretString>,
}

impl AppState {
    /// Create handlers on demand from the shared state.
    pub fn start_trial_handler(&self) -> StartTrialHandler {
        StartTrialHandler::new(
            self.accounts.clone(),
            self.trial_origins.clone(),
            self.analytics.clone(),
            self.policy.clone(),
        )
    }

    pub fn generate_suggestions_handler(&self) -> GenerateSuggestionsHandler {
        GenerateSuggestionsHandler::new(
            self.accounts.clone(),
            self.generator.clone(),
            self.analytics.clone(),
            self.policy.clone(),
        )
    }

    pub fn get_status_handler(&self) -> GetStatusHandler {
        GetStatusHandler::new(self.accounts.clone(), self.policy.clone())
    }

    pub fn check_trial_handler(&self) -> CheckTrialHandler {
        CheckTrialHandler::new(self.accounts.clone(), self.policy.clone())
    }

    pub fn grant_premium_handler(&self) -> GrantPremiumHandler {
        GrantPremiumHandler::new(
            self.accounts.clone(),
            self.policy.clone(),
            self.admin_token.clone(),
        )
    }

    pub fn confirm_checkout_handler(&self) -> ConfirmCheckoutHandler {
        ConfirmCheckoutHandler::new(
            self.accounts.clone(),
            self.payment_provider.clone(),
            self.policy.clone(),
        )
    }

    pub fn create_checkout_handler(&self) -> CreateCheckoutHandler {
        CreateCheckoutHandler::new(
            self.accounts.clone(),
            self.payment_provider.clone(),
            self.checkout.clone(),
        )
    }

    pub fn create_promo_checkout_handler(&self) -> CreatePromoCheckoutHandler {
        CreatePromoCheckoutHandler::new(
            self.accounts.clone(),
            self.payment_provider.clone(),
            self.checkout.clone(),
        )
    }

    pub fn create_portal_session_handler(&self) -> CreatePortalSessionHandler {
        CreatePortalSessionHandler::new(
            self.accounts.clone(),
            self.payment_provider.clone(),
            self.checkout.clone(),
        )
    }

    pub fn webhook_handler(&self) -> HandlePaymentWebhookHandler {
        HandlePaymentWebhookHandler::new(
            self.accounts.clone(),
            self.billing_events.clone(),
            self.webhook_verifier.clone(),
            self.policy.clone(),
        )
    }

    pub fn record_analytics_handler(&self) -> RecordAnalyticsHandler {
        RecordAnalyticsHandler::new(self.analytics.clone())
    }
}
