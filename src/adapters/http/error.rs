//! Error handling - maps application errors onto HTTP responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::domain::billing::WebhookError;
use crate::domain::entitlement::EntitlementError;
use crate::domain::foundation::DomainError;

use super::dto::ErrorResponse;

/// API error type that converts entitlement errors to HTTP responses.
///
/// Handlers log infrastructure failures with their own context before
/// wrapping them; the response body only carries the public message.
#[derive(Debug)]
pub struct ApiError(pub EntitlementError);

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match &self.0 {
            EntitlementError::InvalidParameter { .. }
            | EntitlementError::MissingClientId
            | EntitlementError::PromoAlreadyUsed
            | EntitlementError::AlreadyPremium
            | EntitlementError::NoClientReference
            | EntitlementError::InvalidSession(_) => StatusCode::BAD_REQUEST,
            EntitlementError::Unauthorized => StatusCode::UNAUTHORIZED,
            EntitlementError::TrialExpired { .. } => StatusCode::PAYMENT_REQUIRED,
            EntitlementError::TrialAlreadyUsed | EntitlementError::NotPremium => {
                StatusCode::FORBIDDEN
            }
            EntitlementError::AccountNotFound | EntitlementError::NoSubscription => {
                StatusCode::NOT_FOUND
            }
            EntitlementError::Upstream(_) | EntitlementError::Store(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<EntitlementError> for ApiError {
    fn from(err: EntitlementError) -> Self {
        Self(err)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(EntitlementError::from(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let mut body = ErrorResponse::new(self.0.code(), self.0.message());
        if let EntitlementError::TrialExpired { snapshot, .. } = self.0 {
            body = body.with_trial(snapshot);
        }

        (status, Json(body)).into_response()
    }
}

/// Webhook failures keep their own status mapping so Stripe retries only
/// what a retry can fix.
#[derive(Debug)]
pub struct WebhookApiError(pub WebhookError);

impl From<WebhookError> for WebhookApiError {
    fn from(err: WebhookError) -> Self {
        Self(err)
    }
}

impl IntoResponse for WebhookApiError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        let message = match &self.0 {
            WebhookError::Database(_) => {
                tracing::error!(error = %self.0, "Webhook processing failed");
                "Internal server error".to_string()
            }
            other => {
                tracing::warn!(error = %other, "Webhook rejected");
                other.to_string()
            }
        };

        (status, Json(ErrorResponse::new(self.0.code(), message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entitlement::{EntitlementPolicy, EntitlementSnapshot, PaywallReason};

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Status Mapping Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn business_errors_map_to_client_statuses() {
        let cases = [
            (EntitlementError::MissingClientId, StatusCode::BAD_REQUEST),
            (EntitlementError::PromoAlreadyUsed, StatusCode::BAD_REQUEST),
            (EntitlementError::AlreadyPremium, StatusCode::BAD_REQUEST),
            (EntitlementError::TrialAlreadyUsed, StatusCode::FORBIDDEN),
            (EntitlementError::NotPremium, StatusCode::FORBIDDEN),
            (EntitlementError::AccountNotFound, StatusCode::NOT_FOUND),
            (EntitlementError::NoSubscription, StatusCode::NOT_FOUND),
            (EntitlementError::Unauthorized, StatusCode::UNAUTHORIZED),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError(err).status_code(), status);
        }
    }

    #[test]
    fn infrastructure_errors_map_to_500() {
        assert_eq!(
            ApiError(EntitlementError::upstream("timeout")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError(EntitlementError::store("pool closed")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Body Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn paywall_body_carries_snapshot() {
        let snapshot = EntitlementSnapshot::unclaimed(&EntitlementPolicy::default());
        let err = EntitlementError::trial_expired(snapshot, PaywallReason::NotStarted);

        let response = ApiError(err).into_response();

        assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
        let json = body_json(response).await;
        assert_eq!(json["error"], "trial_expired");
        assert_eq!(json["trial"]["messagesLeft"], 2);
    }

    #[tokio::test]
    async fn store_failure_does_not_leak_detail() {
        let response = ApiError(EntitlementError::store("password=hunter2")).into_response();

        let json = body_json(response).await;
        assert_eq!(json["error"], "internal_error");
        assert!(!json["message"].as_str().unwrap().contains("hunter2"));
    }

    #[tokio::test]
    async fn webhook_database_failure_is_retryable_500_without_detail() {
        let response =
            WebhookApiError(WebhookError::Database("deadlock on accounts".into())).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert!(!json["message"].as_str().unwrap().contains("deadlock"));
    }

    #[tokio::test]
    async fn webhook_signature_failure_is_400() {
        let response = WebhookApiError(WebhookError::InvalidSignature).into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "invalid_signature");
    }
}
