//! HandlePaymentWebhookHandler - Command handler for Stripe webhook deliveries.
//!
//! Verification runs over the raw request bytes. A checkout completion is
//! applied at most once per event id: the billing-event table is the
//! idempotency gate, and the premium grant itself is monotonic so a
//! concurrent duplicate that slips past the gate converges on the same state.

use std::sync::Arc;

use crate::domain::billing::{
    BillingEvent, CheckoutSessionDetails, StripeEvent, StripeEventType, StripeWebhookVerifier,
    SubscriptionDetails, WebhookError, PLAN_WEEKLY,
};
use crate::domain::entitlement::EntitlementPolicy;
use crate::domain::foundation::{ClientId, Timestamp};
use crate::ports::{AccountRepository, BillingEventRepository, PremiumGrant, SaveResult};

/// Command to handle a payment webhook.
#[derive(Debug, Clone)]
pub struct HandlePaymentWebhookCommand {
    /// Raw webhook payload, byte-exact.
    pub payload: Vec<u8>,
    /// `Stripe-Signature` header value.
    pub signature: String,
}

/// Result of webhook processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlePaymentWebhookResult {
    /// Checkout completed, premium granted.
    PremiumGranted {
        client_id: ClientId,
        premium_until: Timestamp,
    },
    /// Subscription ended or lost access, premium revoked.
    PremiumRevoked { client_id: ClientId },
    /// Event id already processed.
    Duplicate,
    /// Event understood but nothing to change.
    Acknowledged,
    /// Event type not handled.
    Ignored,
}

impl HandlePaymentWebhookResult {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, HandlePaymentWebhookResult::Duplicate)
    }
}

/// Handler for processing payment provider webhooks.
pub struct HandlePaymentWebhookHandler {
    accounts: Arc<dyn AccountRepository>,
    billing_events: Arc<dyn BillingEventRepository>,
    verifier: StripeWebhookVerifier,
    policy: EntitlementPolicy,
}

impl HandlePaymentWebhookHandler {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        billing_events: Arc<dyn BillingEventRepository>,
        verifier: StripeWebhookVerifier,
        policy: EntitlementPolicy,
    ) -> Self {
        Self {
            accounts,
            billing_events,
            verifier,
            policy,
        }
    }

    pub async fn handle(
        &self,
        cmd: HandlePaymentWebhookCommand,
    ) -> Result<HandlePaymentWebhookResult, WebhookError> {
        // 1. Verify signature and parse event
        let event = self
            .verifier
            .verify_and_parse(&cmd.payload, &cmd.signature)?;

        tracing::info!(
            event_id = %event.id,
            event_type = %event.event_type,
            livemode = event.livemode,
            "Webhook received"
        );

        // 2. Process based on event type
        match event.parsed_type() {
            StripeEventType::CheckoutSessionCompleted => {
                self.handle_checkout_completed(&event, &cmd.payload).await
            }
            StripeEventType::CustomerSubscriptionDeleted => {
                self.handle_subscription_change(&event, true).await
            }
            StripeEventType::CustomerSubscriptionUpdated => {
                self.handle_subscription_change(&event, false).await
            }
            StripeEventType::Unknown => {
                tracing::debug!(event_type = %event.event_type, "Ignoring unhandled event type");
                Ok(HandlePaymentWebhookResult::Ignored)
            }
        }
    }

    async fn handle_checkout_completed(
        &self,
        event: &StripeEvent,
        payload: &[u8],
    ) -> Result<HandlePaymentWebhookResult, WebhookError> {
        // Idempotency gate
        if self.billing_events.exists(&event.id).await? {
            tracing::info!(event_id = %event.id, "Duplicate webhook delivery, skipping");
            return Ok(HandlePaymentWebhookResult::Duplicate);
        }

        let session: CheckoutSessionDetails = event
            .deserialize_object()
            .map_err(|e| WebhookError::ParseError(format!("checkout session: {}", e)))?;

        let client_id = session.client_reference().ok_or_else(|| {
            tracing::warn!(event_id = %event.id, session_id = %session.id, "Checkout without client reference");
            WebhookError::MissingMetadata("client_reference_id")
        })?;

        // Grant
        let now = Timestamp::now();
        let until = session
            .created_at()
            .unwrap_or(now)
            .add_days(self.policy.premium_period_days);
        let promo_type = session.promo_type();

        let grant = PremiumGrant::new(client_id.clone(), until)
            .with_customer(session.customer.clone())
            .with_promo(promo_type.clone());
        let account = self.accounts.grant_premium(&grant, now).await?;

        // Audit row; its failure does not undo the grant
        let audit = BillingEvent::new(
            event.id.clone(),
            event.event_type.clone(),
            serde_json::from_slice(payload).unwrap_or_default(),
            now,
        )
        .with_client(client_id.clone())
        .with_charge(session.amount_total, session.currency.clone())
        .with_plan(promo_type.unwrap_or_else(|| PLAN_WEEKLY.to_string()));

        match self.billing_events.save(&audit).await {
            Ok(SaveResult::Inserted) => {}
            Ok(SaveResult::AlreadyExists) => {
                tracing::info!(event_id = %event.id, "Concurrent duplicate delivery converged");
            }
            Err(e) => {
                tracing::warn!(event_id = %event.id, error = %e, "Failed to record billing event");
            }
        }

        tracing::info!(
            event_id = %event.id,
            client_id = %client_id,
            premium_until = %until,
            "Premium granted from checkout"
        );

        Ok(HandlePaymentWebhookResult::PremiumGranted {
            client_id,
            premium_until: account.premium_until.unwrap_or(until),
        })
    }

    async fn handle_subscription_change(
        &self,
        event: &StripeEvent,
        deleted: bool,
    ) -> Result<HandlePaymentWebhookResult, WebhookError> {
        let subscription: SubscriptionDetails = event
            .deserialize_object()
            .map_err(|e| WebhookError::ParseError(format!("subscription: {}", e)))?;

        if !deleted && subscription.status.has_access() {
            return Ok(HandlePaymentWebhookResult::Acknowledged);
        }

        let Some(client_id) = subscription.client_reference() else {
            tracing::warn!(
                event_id = %event.id,
                subscription_id = %subscription.id,
                "Subscription without client metadata, acknowledging"
            );
            return Ok(HandlePaymentWebhookResult::Acknowledged);
        };

        if !self.accounts.revoke_premium(&client_id, Timestamp::now()).await? {
            tracing::warn!(event_id = %event.id, client_id = %client_id, "Subscription for unknown account");
            return Ok(HandlePaymentWebhookResult::Acknowledged);
        }

        tracing::info!(
            event_id = %event.id,
            client_id = %client_id,
            status = ?subscription.status,
            "Premium revoked"
        );

        Ok(HandlePaymentWebhookResult::PremiumRevoked { client_id })
    }
}
