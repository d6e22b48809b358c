//! Product analytics events.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::domain::entitlement::EntitlementError;
use crate::domain::foundation::{ClientId, Timestamp};

/// Kinds of analytics events the service records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyticsEventType {
    /// The user pressed a checkout button.
    CheckoutClick,
    /// A trial was started or reset.
    TrialStarted,
    /// A paid action was refused with the paywall.
    PaywallShown,
}

impl AnalyticsEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalyticsEventType::CheckoutClick => "checkout_click",
            AnalyticsEventType::TrialStarted => "trial_started",
            AnalyticsEventType::PaywallShown => "paywall_shown",
        }
    }

    /// Whether browsers may submit this type directly.
    pub fn is_client_submittable(&self) -> bool {
        matches!(self, AnalyticsEventType::CheckoutClick)
    }
}

impl FromStr for AnalyticsEventType {
    type Err = EntitlementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "checkout_click" => Ok(AnalyticsEventType::CheckoutClick),
            "trial_started" => Ok(AnalyticsEventType::TrialStarted),
            "paywall_shown" => Ok(AnalyticsEventType::PaywallShown),
            other => Err(EntitlementError::invalid_parameter(
                "invalid_event_type",
                format!("Unknown event type: {}", other),
            )),
        }
    }
}

impl fmt::Display for AnalyticsEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single analytics event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsEvent {
    pub event_type: AnalyticsEventType,
    pub client_id: ClientId,
    pub metadata: serde_json::Value,
    pub occurred_at: Timestamp,
}

impl AnalyticsEvent {
    pub fn new(event_type: AnalyticsEventType, client_id: ClientId) -> Self {
        Self {
            event_type,
            client_id,
            metadata: serde_json::Value::Null,
            occurred_at: Timestamp::now(),
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_checkout_click_is_client_submittable() {
        assert!(AnalyticsEventType::CheckoutClick.is_client_submittable());
        assert!(!AnalyticsEventType::TrialStarted.is_client_submittable());
        assert!(!AnalyticsEventType::PaywallShown.is_client_submittable());
    }

    #[test]
    fn unknown_type_is_rejected_with_code() {
        let err = "page_view".parse::<AnalyticsEventType>().unwrap_err();
        assert_eq!(err.code(), "invalid_event_type");
    }

    #[test]
    fn types_parse_from_wire_names() {
        for kind in [
            AnalyticsEventType::CheckoutClick,
            AnalyticsEventType::TrialStarted,
            AnalyticsEventType::PaywallShown,
        ] {
            assert_eq!(kind.as_str().parse::<AnalyticsEventType>().unwrap(), kind);
        }
    }

    #[test]
    fn metadata_defaults_to_null() {
        let event = AnalyticsEvent::new(
            AnalyticsEventType::TrialStarted,
            ClientId::new("client_abc").unwrap(),
        );
        assert!(event.metadata.is_null());
    }
}
