//! HTTP handlers for the entitlement endpoints.
//!
//! These handlers connect Axum routes to application layer command/query handlers.

use axum::body::Bytes;
use axum::extract::{Json, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;

use crate::application::handlers::{
    CheckTrialQuery, ConfirmCheckoutCommand, ConfirmCheckoutResult, CreateCheckoutCommand,
    CreatePortalSessionCommand, GenerateSuggestionsCommand, GetStatusQuery, GrantPremiumCommand,
    HandlePaymentWebhookCommand, RecordAnalyticsCommand, StartTrialCommand,
};
use crate::domain::billing::WebhookError;
use crate::domain::entitlement::EntitlementError;
use crate::domain::foundation::ClientId;

use super::dto::{
    AnalyticsRequest, CheckResponse, CheckoutRequest, CheckoutResponse, ConfirmCheckoutRequest,
    ConfirmCheckoutResponse, GenerateRequest, GenerateResponse, HealthResponse, OkResponse,
    PortalRequest, PortalResponse, StartTrialResponse, StatusResponse, UpgradeRequest,
    UpgradeResponse, WebhookResponse,
};
use super::error::{ApiError, WebhookApiError};
use super::extractors::{
    client_id_from_headers, AuthenticatedClient, ClientIdHeader, JsonBody, OptionalJsonBody,
    OriginIp, ADMIN_TOKEN_HEADER,
};
use super::state::AppState;

/// Wraps a handler failure, logging infrastructure errors with the request context.
fn failed<'a>(
    operation: &'static str,
    client_id: Option<&'a ClientId>,
) -> impl FnOnce(EntitlementError) -> ApiError + 'a {
    move |err| {
        if !err.is_business_outcome() {
            tracing::error!(
                operation,
                client_id = client_id.map(ClientId::as_str),
                code = err.code(),
                error = %err,
                "Request failed"
            );
        }
        ApiError(err)
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Entitlement Endpoints
// ════════════════════════════════════════════════════════════════════════════════

/// POST /start-trial - Grant or reset the trial allowance
pub async fn start_trial(
    State(state): State<AppState>,
    ClientIdHeader(client_id): ClientIdHeader,
    OriginIp(origin): OriginIp,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.start_trial_handler();
    let result = handler
        .handle(StartTrialCommand {
            client_id: client_id.clone(),
            origin,
        })
        .await
        .map_err(failed("start_trial", Some(&client_id)))?;

    Ok(Json(StartTrialResponse::from(result)))
}

/// POST /xaveco - Gated suggestion generation
pub async fn generate(
    State(state): State<AppState>,
    ClientIdHeader(client_id): ClientIdHeader,
    JsonBody(request): JsonBody<GenerateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let handler = state.generate_suggestions_handler();
    let cmd = GenerateSuggestionsCommand {
        client_id: client_id.clone(),
        mode: request.mode,
        tone: request.tone,
        input: request.input,
        image: request.image,
    };

    let result = handler
        .handle(cmd)
        .await
        .map_err(failed("generate", Some(&client_id)))?;

    Ok(Json(GenerateResponse::from(result)))
}

/// GET /status - Entitlement snapshot
pub async fn status(
    State(state): State<AppState>,
    ClientIdHeader(client_id): ClientIdHeader,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .get_status_handler()
        .handle(GetStatusQuery {
            client_id: client_id.clone(),
        })
        .await
        .map_err(failed("status", Some(&client_id)))?;

    Ok(Json(StatusResponse::from(result)))
}

/// GET /check - Legacy status shape
pub async fn check(
    State(state): State<AppState>,
    ClientIdHeader(client_id): ClientIdHeader,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .check_trial_handler()
        .handle(CheckTrialQuery {
            client_id: client_id.clone(),
        })
        .await
        .map_err(failed("check", Some(&client_id)))?;

    Ok(Json(CheckResponse::from(result)))
}

/// POST /upgrade - Manual premium grant
pub async fn upgrade(
    State(state): State<AppState>,
    headers: HeaderMap,
    JsonBody(request): JsonBody<UpgradeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let admin_token = headers
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let result = state
        .grant_premium_handler()
        .handle(GrantPremiumCommand {
            client_id: request.client_id,
            admin_token,
        })
        .await
        .map_err(failed("upgrade", None))?;

    Ok(Json(UpgradeResponse {
        ok: true,
        premium_until: result.premium_until,
    }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Billing Endpoints
// ════════════════════════════════════════════════════════════════════════════════

/// POST /confirm-checkout - Post-redirect reconciliation
pub async fn confirm_checkout(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<ConfirmCheckoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .confirm_checkout_handler()
        .handle(ConfirmCheckoutCommand {
            session_id: request.session_id,
        })
        .await
        .map_err(failed("confirm_checkout", None))?;

    let response = match result {
        ConfirmCheckoutResult::Pending => ConfirmCheckoutResponse {
            ok: false,
            is_premium: false,
            premium_until: None,
            message: Some("Payment not completed yet".to_string()),
        },
        ConfirmCheckoutResult::Confirmed { premium_until, .. } => ConfirmCheckoutResponse {
            ok: true,
            is_premium: true,
            premium_until: Some(premium_until),
            message: None,
        },
    };

    Ok(Json(response))
}

/// POST /checkout - Standard weekly subscription checkout
pub async fn create_checkout(
    State(state): State<AppState>,
    AuthenticatedClient(client_id): AuthenticatedClient,
    OptionalJsonBody(request): OptionalJsonBody<CheckoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .create_checkout_handler()
        .handle(CreateCheckoutCommand {
            client_id: client_id.clone(),
            success_url: request.success_url,
            cancel_url: request.cancel_url,
        })
        .await
        .map_err(failed("checkout", Some(&client_id)))?;

    Ok(Json(CheckoutResponse {
        ok: true,
        url: result.url,
        session_id: result.session_id,
    }))
}

/// POST /promo-checkout - Activation-fee checkout with a trial week
pub async fn create_promo_checkout(
    State(state): State<AppState>,
    AuthenticatedClient(client_id): AuthenticatedClient,
    OptionalJsonBody(request): OptionalJsonBody<CheckoutRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .create_promo_checkout_handler()
        .handle(CreateCheckoutCommand {
            client_id: client_id.clone(),
            success_url: request.success_url,
            cancel_url: request.cancel_url,
        })
        .await
        .map_err(failed("promo_checkout", Some(&client_id)))?;

    Ok(Json(CheckoutResponse {
        ok: true,
        url: result.url,
        session_id: result.session_id,
    }))
}

/// POST /customer-portal - Billing management session
pub async fn customer_portal(
    State(state): State<AppState>,
    AuthenticatedClient(client_id): AuthenticatedClient,
    OptionalJsonBody(request): OptionalJsonBody<PortalRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let result = state
        .create_portal_session_handler()
        .handle(CreatePortalSessionCommand {
            client_id: client_id.clone(),
            return_url: request.return_url,
        })
        .await
        .map_err(failed("customer_portal", Some(&client_id)))?;

    Ok(Json(PortalResponse {
        ok: true,
        url: result.url,
    }))
}

/// POST /stripe-webhook - Handle Stripe webhook events
pub async fn stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<impl IntoResponse, WebhookApiError> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or(WebhookError::MissingSignature)?;

    let result = state
        .webhook_handler()
        .handle(HandlePaymentWebhookCommand {
            payload: body.to_vec(),
            signature: signature.to_string(),
        })
        .await?;

    Ok(Json(WebhookResponse {
        received: true,
        duplicate: result.is_duplicate(),
    }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Misc Endpoints
// ════════════════════════════════════════════════════════════════════════════════

/// POST /analytics - Fire-and-forget client event
pub async fn record_analytics(
    State(state): State<AppState>,
    headers: HeaderMap,
    JsonBody(request): JsonBody<AnalyticsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let client_id = match client_id_from_headers(&headers) {
        Some(Ok(id)) => Some(id.to_string()),
        _ => request.client_id,
    };

    state.record_analytics_handler().handle(RecordAnalyticsCommand {
        event_type: request.event_type,
        client_id,
    })?;

    Ok(Json(OkResponse { ok: true }))
}

/// GET /health - Liveness probe
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
