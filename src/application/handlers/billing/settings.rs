//! Checkout defaults shared by the billing handlers.

/// Prices and redirect targets used when building provider sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutSettings {
    /// Recurring weekly price configured at the provider.
    pub weekly_price_id: String,
    /// One-time activation charge, smallest currency unit.
    pub promo_amount: i64,
    pub promo_currency: String,
    pub promo_label: String,
    /// Trial before the weekly price starts billing.
    pub promo_trial_days: u32,
    /// Must keep the `{CHECKOUT_SESSION_ID}` placeholder for the confirm poll.
    pub success_url: String,
    pub cancel_url: String,
    pub portal_return_url: String,
}

impl CheckoutSettings {
    /// Success URL for promotional checkouts.
    pub fn promo_success_url(&self) -> String {
        let separator = if self.success_url.contains('?') { '&' } else { '?' };
        format!("{}{}promo=activation", self.success_url, separator)
    }
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        Self {
            weekly_price_id: String::new(),
            promo_amount: 100,
            promo_currency: "brl".to_string(),
            promo_label: "Taxa de Ativação".to_string(),
            promo_trial_days: 7,
            success_url: "https://xaveco.app/checkout-success?session_id={CHECKOUT_SESSION_ID}"
                .to_string(),
            cancel_url: "https://xaveco.app".to_string(),
            portal_return_url: "https://xaveco.app".to_string(),
        }
    }
}
