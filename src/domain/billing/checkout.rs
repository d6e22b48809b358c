//! Checkout session and subscription objects as the payment provider reports them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ClientId, Timestamp};

/// Metadata key carrying the client identifier.
pub const METADATA_CLIENT_ID: &str = "client_id";

/// Legacy metadata key some sessions still carry.
pub const METADATA_USER_ID: &str = "user_id";

/// Metadata key marking a promotional checkout.
pub const METADATA_PROMO_TYPE: &str = "promo_type";

/// Promo marker for the paid-activation trial week.
pub const PROMO_ACTIVATION_WEEK: &str = "activation_week";

/// Checkout session fields the reconciliation paths need.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CheckoutSessionDetails {
    pub id: String,
    #[serde(default)]
    pub created: Option<i64>,
    #[serde(default)]
    pub client_reference_id: Option<String>,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub subscription: Option<String>,
    #[serde(default)]
    pub payment_status: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub amount_total: Option<i64>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
}

impl CheckoutSessionDetails {
    /// Paid if any one signal says so.
    pub fn is_paid(&self) -> bool {
        self.payment_status.as_deref() == Some("paid")
            || self.status.as_deref() == Some("complete")
            || self.subscription.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Client identifier from the reference field, then metadata.
    pub fn client_reference(&self) -> Option<ClientId> {
        self.client_reference_id
            .as_deref()
            .and_then(|id| ClientId::new(id).ok())
            .or_else(|| self.metadata_client_id(METADATA_CLIENT_ID))
            .or_else(|| self.metadata_client_id(METADATA_USER_ID))
    }

    /// Promotional marker set at session creation.
    pub fn promo_type(&self) -> Option<String> {
        self.metadata
            .as_ref()
            .and_then(|m| m.get(METADATA_PROMO_TYPE))
            .filter(|v| !v.trim().is_empty())
            .cloned()
    }

    /// Provider-side creation time, used to anchor premium grants.
    pub fn created_at(&self) -> Option<Timestamp> {
        self.created.and_then(Timestamp::from_unix_secs)
    }

    fn metadata_client_id(&self, key: &str) -> Option<ClientId> {
        self.metadata
            .as_ref()
            .and_then(|m| m.get(key))
            .and_then(|id| ClientId::new(id.as_str()).ok())
    }
}

/// Subscription status from payment provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    PastDue,
    Canceled,
    Trialing,
    Incomplete,
    IncompleteExpired,
    Unpaid,
    Paused,
    #[serde(other)]
    Unknown,
}

impl SubscriptionStatus {
    /// Check if subscription grants access.
    pub fn has_access(&self) -> bool {
        matches!(
            self,
            SubscriptionStatus::Active | SubscriptionStatus::Trialing | SubscriptionStatus::PastDue
        )
    }
}

/// Subscription fields the webhook path needs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SubscriptionDetails {
    pub id: String,
    pub status: SubscriptionStatus,
    #[serde(default)]
    pub customer: Option<String>,
    #[serde(default)]
    pub metadata: Option<HashMap<String, String>>,
}

impl SubscriptionDetails {
    pub fn client_reference(&self) -> Option<ClientId> {
        self.metadata
            .as_ref()
            .and_then(|m| m.get(METADATA_CLIENT_ID))
            .and_then(|id| ClientId::new(id.as_str()).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metadata(pairs: &[(&str, &str)]) -> Option<HashMap<String, String>> {
        Some(pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect())
    }

    #[test]
    fn any_paid_signal_suffices() {
        let mut session = CheckoutSessionDetails::default();
        assert!(!session.is_paid());

        session.payment_status = Some("paid".into());
        assert!(session.is_paid());

        let session = CheckoutSessionDetails {
            status: Some("complete".into()),
            ..Default::default()
        };
        assert!(session.is_paid());

        let session = CheckoutSessionDetails {
            subscription: Some("sub_1".into()),
            payment_status: Some("no_payment_required".into()),
            ..Default::default()
        };
        assert!(session.is_paid());
    }

    #[test]
    fn unpaid_open_session_is_not_paid() {
        let session = CheckoutSessionDetails {
            payment_status: Some("unpaid".into()),
            status: Some("open".into()),
            ..Default::default()
        };
        assert!(!session.is_paid());
    }

    #[test]
    fn client_reference_prefers_reference_field() {
        let session = CheckoutSessionDetails {
            client_reference_id: Some("client_ref".into()),
            metadata: metadata(&[("client_id", "client_meta")]),
            ..Default::default()
        };
        assert_eq!(session.client_reference().unwrap().as_str(), "client_ref");
    }

    #[test]
    fn client_reference_falls_back_to_metadata() {
        let session = CheckoutSessionDetails {
            metadata: metadata(&[("user_id", "client_legacy")]),
            ..Default::default()
        };
        assert_eq!(session.client_reference().unwrap().as_str(), "client_legacy");

        let session = CheckoutSessionDetails {
            client_reference_id: Some("  ".into()),
            metadata: metadata(&[("client_id", "client_meta")]),
            ..Default::default()
        };
        assert_eq!(session.client_reference().unwrap().as_str(), "client_meta");
    }

    #[test]
    fn promo_type_read_from_metadata() {
        let session = CheckoutSessionDetails {
            metadata: metadata(&[("promo_type", "activation_week")]),
            ..Default::default()
        };
        assert_eq!(session.promo_type().as_deref(), Some("activation_week"));
        assert!(CheckoutSessionDetails::default().promo_type().is_none());
    }

    #[test]
    fn subscription_status_access_checks() {
        assert!(SubscriptionStatus::Active.has_access());
        assert!(SubscriptionStatus::Trialing.has_access());
        assert!(SubscriptionStatus::PastDue.has_access());

        assert!(!SubscriptionStatus::Canceled.has_access());
        assert!(!SubscriptionStatus::Unpaid.has_access());
        assert!(!SubscriptionStatus::Unknown.has_access());
    }

    #[test]
    fn unknown_status_deserializes() {
        let sub: SubscriptionDetails =
            serde_json::from_str(r#"{"id":"sub_1","status":"something_new"}"#).unwrap();
        assert_eq!(sub.status, SubscriptionStatus::Unknown);
        assert!(sub.client_reference().is_none());
    }
}
