//! Audit record of a processed payment event.

use serde::Serialize;

use crate::domain::foundation::{ClientId, Timestamp};

/// Plan label stored for standard weekly checkouts.
pub const PLAN_WEEKLY: &str = "weekly";

/// One row per distinct Stripe event; its key is the webhook idempotency gate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillingEvent {
    /// Stripe event ID (evt_xxx format). Unique.
    pub stripe_event_id: String,

    /// Stripe event type string.
    pub event_type: String,

    /// Client the event was applied to, when one could be resolved.
    pub client_id: Option<ClientId>,

    /// Amount in the smallest currency unit.
    pub amount: Option<i64>,

    pub currency: Option<String>,

    /// `weekly` or the promo marker the session carried.
    pub plan: Option<String>,

    /// Event exactly as received, for debugging.
    pub raw_payload: serde_json::Value,

    pub processed_at: Timestamp,
}

impl BillingEvent {
    pub fn new(
        stripe_event_id: impl Into<String>,
        event_type: impl Into<String>,
        raw_payload: serde_json::Value,
        processed_at: Timestamp,
    ) -> Self {
        Self {
            stripe_event_id: stripe_event_id.into(),
            event_type: event_type.into(),
            client_id: None,
            amount: None,
            currency: None,
            plan: None,
            raw_payload,
            processed_at,
        }
    }

    pub fn with_client(mut self, client_id: ClientId) -> Self {
        self.client_id = Some(client_id);
        self
    }

    pub fn with_charge(mut self, amount: Option<i64>, currency: Option<String>) -> Self {
        self.amount = amount;
        self.currency = currency;
        self
    }

    pub fn with_plan(mut self, plan: impl Into<String>) -> Self {
        self.plan = Some(plan.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_fills_optional_fields() {
        let event = BillingEvent::new(
            "evt_1",
            "checkout.session.completed",
            serde_json::json!({"id": "evt_1"}),
            Timestamp::now(),
        )
        .with_client(ClientId::new("client_abc").unwrap())
        .with_charge(Some(1990), Some("brl".into()))
        .with_plan(PLAN_WEEKLY);

        assert_eq!(event.client_id.unwrap().as_str(), "client_abc");
        assert_eq!(event.amount, Some(1990));
        assert_eq!(event.plan.as_deref(), Some("weekly"));
    }

    #[test]
    fn bare_event_has_no_client() {
        let event = BillingEvent::new(
            "evt_2",
            "customer.subscription.deleted",
            serde_json::Value::Null,
            Timestamp::now(),
        );
        assert!(event.client_id.is_none());
        assert!(event.plan.is_none());
    }
}
