//! Payment configuration

use serde::Deserialize;
use std::time::Duration;

use crate::application::handlers::billing::CheckoutSettings;

use super::error::ValidationError;

/// Payment configuration (Stripe)
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Stripe API key
    #[serde(default)]
    pub stripe_api_key: String,

    /// Stripe webhook signing secret
    #[serde(default)]
    pub stripe_webhook_secret: String,

    /// Recurring weekly price
    #[serde(default)]
    pub weekly_price_id: String,

    /// One-time activation charge in the smallest currency unit
    #[serde(default = "default_promo_amount")]
    pub promo_amount: i64,

    #[serde(default = "default_promo_currency")]
    pub promo_currency: String,

    #[serde(default = "default_promo_label")]
    pub promo_label: String,

    /// Trial days before the weekly price bills after the activation charge
    #[serde(default = "default_promo_trial_days")]
    pub promo_trial_days: u32,

    #[serde(default = "default_success_url")]
    pub success_url: String,

    #[serde(default = "default_app_url")]
    pub cancel_url: String,

    #[serde(default = "default_app_url")]
    pub portal_return_url: String,

    /// Overridable for local Stripe mocks
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl PaymentConfig {
    /// Check if using Stripe test mode
    pub fn is_test_mode(&self) -> bool {
        self.stripe_api_key.starts_with("sk_test_")
    }

    /// Check if using Stripe live mode
    pub fn is_live_mode(&self) -> bool {
        self.stripe_api_key.starts_with("sk_live_")
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Checkout defaults handed to the billing handlers
    pub fn to_checkout_settings(&self) -> CheckoutSettings {
        CheckoutSettings {
            weekly_price_id: self.weekly_price_id.clone(),
            promo_amount: self.promo_amount,
            promo_currency: self.promo_currency.clone(),
            promo_label: self.promo_label.clone(),
            promo_trial_days: self.promo_trial_days,
            success_url: self.success_url.clone(),
            cancel_url: self.cancel_url.clone(),
            portal_return_url: self.portal_return_url.clone(),
        }
    }

    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.stripe_api_key.is_empty() {
            return Err(ValidationError::MissingRequired("STRIPE_API_KEY"));
        }
        if self.stripe_webhook_secret.is_empty() {
            return Err(ValidationError::MissingRequired("STRIPE_WEBHOOK_SECRET"));
        }
        if self.weekly_price_id.is_empty() {
            return Err(ValidationError::MissingRequired("WEEKLY_PRICE_ID"));
        }

        // Verify key prefixes for safety
        if !self.stripe_api_key.starts_with("sk_") {
            return Err(ValidationError::InvalidStripeKey);
        }
        if !self.stripe_webhook_secret.starts_with("whsec_") {
            return Err(ValidationError::InvalidStripeWebhookSecret);
        }

        if !self.success_url.contains("{CHECKOUT_SESSION_ID}") {
            return Err(ValidationError::InvalidSuccessUrl);
        }
        if self.promo_amount <= 0 {
            return Err(ValidationError::InvalidPromoAmount);
        }

        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            stripe_api_key: String::new(),
            stripe_webhook_secret: String::new(),
            weekly_price_id: String::new(),
            promo_amount: default_promo_amount(),
            promo_currency: default_promo_currency(),
            promo_label: default_promo_label(),
            promo_trial_days: default_promo_trial_days(),
            success_url: default_success_url(),
            cancel_url: default_app_url(),
            portal_return_url: default_app_url(),
            api_base_url: default_api_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_promo_amount() -> i64 {
    100
}

fn default_promo_currency() -> String {
    "brl".to_string()
}

fn default_promo_label() -> String {
    "Taxa de Ativação".to_string()
}

fn default_promo_trial_days() -> u32 {
    7
}

fn default_success_url() -> String {
    "https://xaveco.app/checkout-success?session_id={CHECKOUT_SESSION_ID}".to_string()
}

fn default_app_url() -> String {
    "https://xaveco.app".to_string()
}

fn default_api_base_url() -> String {
    "https://api.stripe.com".to_string()
}

fn default_timeout() -> u64 {
    15
}
