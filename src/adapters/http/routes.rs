//! Axum router configuration for the entitlement API.

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

use super::extractors::{ADMIN_TOKEN_HEADER, CLIENT_ID_HEADER};
use super::handlers::{
    check, confirm_checkout, create_checkout, create_promo_checkout, customer_portal, generate,
    health, record_analytics, start_trial, status, stripe_webhook, upgrade,
};
use super::state::AppState;

/// Create the API routes.
///
/// # Routes
///
/// ## Entitlement (client id header required)
/// - `POST /start-trial` - Grant or reset the trial allowance
/// - `POST /xaveco` (alias `/generate`) - Gated suggestion generation
/// - `GET /status` - Entitlement snapshot
/// - `GET /check` - Legacy status shape
///
/// ## Billing
/// - `POST /checkout` - Weekly subscription checkout
/// - `POST /promo-checkout` - Activation-fee checkout
/// - `POST /customer-portal` - Billing management session
/// - `POST /confirm-checkout` - Post-redirect reconciliation
/// - `POST /stripe-webhook` - Stripe events (signature verified)
///
/// ## Misc
/// - `POST /upgrade` - Manual premium grant
/// - `POST /analytics` - Client analytics event
/// - `GET /health` - Liveness probe
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/start-trial", post(start_trial))
        .route("/xaveco", post(generate))
        .route("/generate", post(generate))
        .route("/status", get(status))
        .route("/check", get(check))
        .route("/upgrade", post(upgrade))
        .route("/checkout", post(create_checkout))
        .route("/promo-checkout", post(create_promo_checkout))
        .route("/customer-portal", post(customer_portal))
        .route("/confirm-checkout", post(confirm_checkout))
        .route("/stripe-webhook", post(stripe_webhook))
        .route("/analytics", post(record_analytics))
        .route("/health", get(health))
}

/// CORS policy: any origin unless an allowlist is configured.
pub fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins_list()
        .iter()
        .filter_map(|s| s.parse().ok())
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        tracing::info!(allowed_origins = ?origins, "CORS restricted to configured origins");
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
            HeaderName::from_static(CLIENT_ID_HEADER),
            HeaderName::from_static(ADMIN_TOKEN_HEADER),
            HeaderName::from_static("stripe-signature"),
        ])
}

/// Build the complete application with middleware applied.
pub fn app_router(state: AppState, config: &ServerConfig) -> Router {
    api_routes()
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(TimeoutLayer::new(config.request_timeout()))
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
