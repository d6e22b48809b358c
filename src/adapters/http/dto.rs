//! HTTP DTOs (Data Transfer Objects) for the entitlement API.
//!
//! Request bodies default every field so a missing value reaches the
//! application layer and fails there with the proper wire code.

use serde::{Deserialize, Serialize};

use crate::application::handlers::{
    CheckTrialResult, GenerateSuggestionsResult, GetStatusResult, StartTrialResult,
};
use crate::domain::entitlement::EntitlementSnapshot;
use crate::domain::foundation::Timestamp;

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Body of a suggestion request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GenerateRequest {
    pub mode: String,
    pub tone: String,
    pub input: Option<String>,
    /// Data URL or raw base64.
    pub image: Option<String>,
}

/// Body of a manual upgrade.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UpgradeRequest {
    pub client_id: Option<String>,
}

/// Body of a checkout confirmation poll.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfirmCheckoutRequest {
    #[serde(alias = "sessionId")]
    pub session_id: String,
}

/// Optional redirect overrides for checkout creation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CheckoutRequest {
    #[serde(alias = "successUrl")]
    pub success_url: Option<String>,
    #[serde(alias = "cancelUrl")]
    pub cancel_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PortalRequest {
    #[serde(alias = "returnUrl")]
    pub return_url: Option<String>,
}

/// Body of a client analytics event.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalyticsRequest {
    #[serde(rename = "type")]
    pub event_type: String,
    pub client_id: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Trial summary returned by start-trial.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialSummary {
    pub messages_left: u32,
    pub expires_at: Timestamp,
}

#[derive(Debug, Clone, Serialize)]
pub struct StartTrialResponse {
    pub ok: bool,
    pub trial: TrialSummary,
}

impl From<StartTrialResult> for StartTrialResponse {
    fn from(result: StartTrialResult) -> Self {
        Self {
            ok: true,
            trial: TrialSummary {
                messages_left: result.messages_left,
                expires_at: result.expires_at,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateResponse {
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trial: Option<EntitlementSnapshot>,
    pub premium: bool,
}

impl From<GenerateSuggestionsResult> for GenerateResponse {
    fn from(result: GenerateSuggestionsResult) -> Self {
        Self {
            suggestions: result.suggestions,
            trial: result.trial,
            premium: result.premium,
        }
    }
}

/// Full entitlement status. `daysLeft` and `premiumUntil` serialize as null
/// when the client holds no active premium.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub ok: bool,
    pub is_premium: bool,
    pub free_plays_left: u32,
    pub days_left: Option<i64>,
    pub premium_until: Option<Timestamp>,
    pub trial: EntitlementSnapshot,
}

impl From<GetStatusResult> for StatusResponse {
    fn from(result: GetStatusResult) -> Self {
        Self {
            ok: true,
            is_premium: result.is_premium,
            free_plays_left: result.free_plays_left,
            days_left: result.days_left,
            premium_until: result.premium_until,
            trial: result.snapshot,
        }
    }
}

/// Legacy status shape; `expiresAt` is Unix milliseconds.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckResponse {
    pub premium: bool,
    pub used_count: u64,
    pub limit: u32,
    pub expires_at: Option<i64>,
}

impl From<CheckTrialResult> for CheckResponse {
    fn from(result: CheckTrialResult) -> Self {
        Self {
            premium: result.premium,
            used_count: result.used_count,
            limit: result.limit,
            expires_at: result.expires_at.map(|t| t.as_unix_millis()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeResponse {
    pub ok: bool,
    pub premium_until: Timestamp,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmCheckoutResponse {
    pub ok: bool,
    pub is_premium: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub premium_until: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub ok: bool,
    pub url: String,
    pub session_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct PortalResponse {
    pub ok: bool,
    pub url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WebhookResponse {
    pub received: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub duplicate: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Error body shared by every failing route.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Code the client UI branches on.
    pub error: String,
    pub message: String,
    /// Present on paywall refusals.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trial: Option<EntitlementSnapshot>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            trial: None,
        }
    }

    pub fn with_trial(mut self, snapshot: EntitlementSnapshot) -> Self {
        self.trial = Some(snapshot);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entitlement::EntitlementPolicy;

    #[test]
    fn status_response_serializes_nulls_for_absent_premium() {
        let response = StatusResponse {
            ok: true,
            is_premium: false,
            free_plays_left: 2,
            days_left: None,
            premium_until: None,
            trial: EntitlementSnapshot::unclaimed(&EntitlementPolicy::default()),
        };

        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["isPremium"], false);
        assert_eq!(json["freePlaysLeft"], 2);
        assert!(json["daysLeft"].is_null());
        assert!(json["premiumUntil"].is_null());
        assert_eq!(json["trial"]["state"], "unclaimed");
    }

    #[test]
    fn check_response_reports_millis() {
        let expires = Timestamp::from_unix_secs(1_700_000_000).unwrap();
        let response = CheckResponse::from(CheckTrialResult {
            premium: false,
            used_count: 1,
            limit: 2,
            expires_at: Some(expires),
        });

        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["expiresAt"], 1_700_000_000_000_i64);
        assert_eq!(json["usedCount"], 1);
    }

    #[test]
    fn webhook_response_omits_duplicate_flag_unless_set() {
        let fresh = serde_json::to_value(WebhookResponse {
            received: true,
            duplicate: false,
        })
        .unwrap();
        let replay = serde_json::to_value(WebhookResponse {
            received: true,
            duplicate: true,
        })
        .unwrap();

        assert!(fresh.get("duplicate").is_none());
        assert_eq!(replay["duplicate"], true);
    }

    #[test]
    fn analytics_request_reads_type_field() {
        let request: AnalyticsRequest =
            serde_json::from_str(r#"{"type":"checkout_click","clientId":"client_1"}"#).unwrap();
        assert_eq!(request.event_type, "checkout_click");
        assert_eq!(request.client_id.as_deref(), Some("client_1"));
    }

    #[test]
    fn confirm_request_accepts_both_spellings() {
        let snake: ConfirmCheckoutRequest =
            serde_json::from_str(r#"{"session_id":"cs_1"}"#).unwrap();
        let camel: ConfirmCheckoutRequest =
            serde_json::from_str(r#"{"sessionId":"cs_1"}"#).unwrap();
        assert_eq!(snake.session_id, "cs_1");
        assert_eq!(camel.session_id, "cs_1");
    }
}
