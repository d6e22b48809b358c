//! CreatePromoCheckoutHandler - Command handler for the activation-week checkout.
//!
//! The session charges a small one-time activation fee now and starts the
//! weekly subscription after a trial period. The promo marker travels in
//! the session and subscription metadata so reconciliation can record it.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::billing::{METADATA_CLIENT_ID, METADATA_PROMO_TYPE, PROMO_ACTIVATION_WEEK};
use crate::domain::entitlement::EntitlementError;
use crate::domain::foundation::Timestamp;
use crate::ports::{AccountRepository, CheckoutLineItem, CreateCheckoutRequest, PaymentProvider};

use super::create_checkout::non_blank;
use super::{payment_failure, CheckoutSettings, CreateCheckoutCommand, CreateCheckoutResult};

/// Handler for the promotional checkout. One use per client.
pub struct CreatePromoCheckoutHandler {
    accounts: Arc<dyn AccountRepository>,
    payment_provider: Arc<dyn PaymentProvider>,
    settings: CheckoutSettings,
}

impl CreatePromoCheckoutHandler {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        payment_provider: Arc<dyn PaymentProvider>,
        settings: CheckoutSettings,
    ) -> Self {
        Self {
            accounts,
            payment_provider,
            settings,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateCheckoutCommand,
    ) -> Result<CreateCheckoutResult, EntitlementError> {
        // 1. Terminal refusals
        if let Some(account) = self.accounts.find(&cmd.client_id).await? {
            if account.promo_applied {
                tracing::info!(client_id = %cmd.client_id, "Promo checkout refused: already used");
                return Err(EntitlementError::PromoAlreadyUsed);
            }
            if account.is_premium_active(Timestamp::now()) {
                tracing::info!(client_id = %cmd.client_id, "Promo checkout refused: already premium");
                return Err(EntitlementError::AlreadyPremium);
            }
        }

        // 2. Build the two-line session
        let mut metadata = BTreeMap::new();
        metadata.insert(METADATA_CLIENT_ID.to_string(), cmd.client_id.to_string());
        metadata.insert(METADATA_PROMO_TYPE.to_string(), PROMO_ACTIVATION_WEEK.to_string());

        let request = CreateCheckoutRequest {
            client_id: cmd.client_id.clone(),
            line_items: vec![
                CheckoutLineItem::OneTime {
                    amount: self.settings.promo_amount,
                    currency: self.settings.promo_currency.clone(),
                    name: self.settings.promo_label.clone(),
                },
                CheckoutLineItem::Price {
                    price_id: self.settings.weekly_price_id.clone(),
                    quantity: 1,
                },
            ],
            trial_period_days: Some(self.settings.promo_trial_days),
            success_url: non_blank(cmd.success_url)
                .unwrap_or_else(|| self.settings.promo_success_url()),
            cancel_url: non_blank(cmd.cancel_url).unwrap_or_else(|| self.settings.cancel_url.clone()),
            metadata,
        };

        // 3. Create it
        let session = self
            .payment_provider
            .create_checkout_session(request)
            .await
            .map_err(|e| payment_failure("create_promo_checkout_session", e))?;

        tracing::info!(
            client_id = %cmd.client_id,
            session_id = %session.id,
            "Promo checkout session created"
        );

        Ok(CreateCheckoutResult {
            session_id: session.id,
            url: session.url,
        })
    }
}
