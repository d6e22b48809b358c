//! Stripe payment provider adapter.
//!
//! Implements the `PaymentProvider` trait against the Stripe REST API with
//! form-encoded requests and basic auth. Every call is bounded by the
//! configured timeout.
//!
//! # Configuration
//!
//! ```ignore
//! let config = StripeConfig::new(api_key).with_timeout(Duration::from_secs(15));
//! let adapter = StripePaymentAdapter::new(config)?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::domain::billing::CheckoutSessionDetails;
use crate::ports::{
    CheckoutLineItem, CheckoutSession, CreateCheckoutRequest, PaymentError, PaymentErrorCode,
    PaymentProvider, PortalSession,
};

/// Default timeout for Stripe API calls.
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    api_key: SecretString,

    /// Base URL for Stripe API (default: https://api.stripe.com).
    api_base_url: String,

    /// Per-request timeout.
    timeout: Duration,
}

impl StripeConfig {
    /// Create a new Stripe configuration.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            api_base_url: "https://api.stripe.com".to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Stripe payment provider adapter.
pub struct StripePaymentAdapter {
    config: StripeConfig,
    http_client: reqwest::Client,
}

impl StripePaymentAdapter {
    /// Create a new Stripe adapter with the given configuration.
    pub fn new(config: StripeConfig) -> Result<Self, PaymentError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PaymentError::provider(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Decode a successful response or map the failure.
    async fn read_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        resource: &str,
    ) -> Result<T, PaymentError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_error_response(status, &body, resource));
        }

        response.json().await.map_err(|e| {
            PaymentError::provider(format!("Failed to parse Stripe response: {}", e))
        })
    }
}

/// Stripe error envelope.
#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeErrorBody,
}

#[derive(Debug, Deserialize)]
struct StripeErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Maps a non-success Stripe response to a payment error.
fn map_error_response(status: StatusCode, body: &str, resource: &str) -> PaymentError {
    let parsed = serde_json::from_str::<StripeErrorResponse>(body).ok();
    let message = parsed
        .as_ref()
        .and_then(|p| p.error.message.clone())
        .unwrap_or_else(|| format!("Stripe API error ({})", status.as_u16()));

    let error = match status {
        StatusCode::NOT_FOUND => PaymentError::not_found(resource),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PaymentError::authentication(message),
        StatusCode::TOO_MANY_REQUESTS => {
            PaymentError::new(PaymentErrorCode::RateLimitExceeded, message)
        }
        StatusCode::BAD_REQUEST => {
            // Stripe reports unknown ids on retrieval as 400 resource_missing.
            if parsed.as_ref().and_then(|p| p.error.code.as_deref()) == Some("resource_missing") {
                PaymentError::not_found(resource)
            } else {
                PaymentError::invalid_request(message)
            }
        }
        s if s.is_server_error() => PaymentError::new(PaymentErrorCode::NetworkError, message),
        _ => PaymentError::provider(message),
    };

    match parsed.and_then(|p| p.error.code) {
        Some(code) => error.with_provider_code(code),
        None => error,
    }
}

fn map_transport_error(e: reqwest::Error) -> PaymentError {
    if e.is_timeout() {
        PaymentError::network(format!("Stripe request timed out: {}", e))
    } else {
        PaymentError::network(e.to_string())
    }
}

/// Stripe ids are ASCII alphanumerics and underscores.
fn is_safe_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Form parameters for a checkout session request.
fn checkout_params(request: &CreateCheckoutRequest) -> Vec<(String, String)> {
    let mut params = vec![
        ("mode".to_string(), "subscription".to_string()),
        ("success_url".to_string(), request.success_url.clone()),
        ("cancel_url".to_string(), request.cancel_url.clone()),
        (
            "client_reference_id".to_string(),
            request.client_id.to_string(),
        ),
    ];

    for (index, item) in request.line_items.iter().enumerate() {
        match item {
            CheckoutLineItem::Price { price_id, quantity } => {
                params.push((format!("line_items[{}][price]", index), price_id.clone()));
                params.push((format!("line_items[{}][quantity]", index), quantity.to_string()));
            }
            CheckoutLineItem::OneTime {
                amount,
                currency,
                name,
            } => {
                let prefix = format!("line_items[{}][price_data]", index);
                params.push((format!("{}[currency]", prefix), currency.clone()));
                params.push((format!("{}[unit_amount]", prefix), amount.to_string()));
                params.push((format!("{}[product_data][name]", prefix), name.clone()));
                params.push((format!("line_items[{}][quantity]", index), "1".to_string()));
            }
        }
    }

    if let Some(days) = request.trial_period_days {
        params.push((
            "subscription_data[trial_period_days]".to_string(),
            days.to_string(),
        ));
    }

    for (key, value) in &request.metadata {
        params.push((format!("metadata[{}]", key), value.clone()));
        params.push((format!("subscription_data[metadata][{}]", key), value.clone()));
    }

    params
}

#[async_trait]
impl PaymentProvider for StripePaymentAdapter {
    async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSessionDetails, PaymentError> {
        if !is_safe_id(session_id) {
            return Err(PaymentError::invalid_request("Malformed checkout session id"));
        }

        let url = format!(
            "{}/v1/checkout/sessions/{}",
            self.config.api_base_url, session_id
        );

        let response = self
            .http_client
            .get(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .send()
            .await
            .map_err(map_transport_error)?;

        Self::read_response(response, "Checkout session").await
    }

    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);
        let params = checkout_params(&request);

        let response = self
            .http_client
            .post(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(&params)
            .send()
            .await
            .map_err(map_transport_error)?;

        #[derive(Deserialize)]
        struct CreatedSession {
            id: String,
            #[serde(default)]
            url: Option<String>,
        }

        let session: CreatedSession = Self::read_response(response, "Checkout session").await?;
        let url = session
            .url
            .ok_or_else(|| PaymentError::provider("Checkout session has no URL"))?;

        Ok(CheckoutSession {
            id: session.id,
            url,
        })
    }

    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<PortalSession, PaymentError> {
        let url = format!("{}/v1/billing_portal/sessions", self.config.api_base_url);

        let response = self
            .http_client
            .post(&url)
            .basic_auth(self.config.api_key.expose_secret(), Option::<&str>::None)
            .form(&[("customer", customer_id), ("return_url", return_url)])
            .send()
            .await
            .map_err(map_transport_error)?;

        Self::read_response(response, "Customer").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ClientId;
    use std::collections::BTreeMap;

    fn promo_request() -> CreateCheckoutRequest {
        let mut metadata = BTreeMap::new();
        metadata.insert("client_id".to_string(), "client_abc".to_string());
        metadata.insert("promo_type".to_string(), "activation_week".to_string());

        CreateCheckoutRequest {
            client_id: ClientId::new("client_abc").unwrap(),
            line_items: vec![
                CheckoutLineItem::OneTime {
                    amount: 100,
                    currency: "brl".to_string(),
                    name: "Taxa de Ativação".to_string(),
                },
                CheckoutLineItem::Price {
                    price_id: "price_weekly".to_string(),
                    quantity: 1,
                },
            ],
            trial_period_days: Some(7),
            success_url: "https://xaveco.app/ok".to_string(),
            cancel_url: "https://xaveco.app".to_string(),
            metadata,
        }
    }

    fn param<'a>(params: &'a [(String, String)], key: &str) -> Option<&'a str> {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    // ══════════════════════════════════════════════════════════════
    // Request Encoding Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn checkout_params_encode_inline_and_recurring_items() {
        let params = checkout_params(&promo_request());

        assert_eq!(param(&params, "mode"), Some("subscription"));
        assert_eq!(param(&params, "client_reference_id"), Some("client_abc"));
        assert_eq!(param(&params, "line_items[0][price_data][unit_amount]"), Some("100"));
        assert_eq!(param(&params, "line_items[0][price_data][currency]"), Some("brl"));
        assert_eq!(param(&params, "line_items[1][price]"), Some("price_weekly"));
        assert_eq!(param(&params, "subscription_data[trial_period_days]"), Some("7"));
    }

    #[test]
    fn metadata_is_copied_to_subscription() {
        let params = checkout_params(&promo_request());

        assert_eq!(param(&params, "metadata[promo_type]"), Some("activation_week"));
        assert_eq!(
            param(&params, "subscription_data[metadata][client_id]"),
            Some("client_abc")
        );
    }

    #[test]
    fn no_trial_param_without_trial() {
        let mut request = promo_request();
        request.trial_period_days = None;
        let params = checkout_params(&request);
        assert!(param(&params, "subscription_data[trial_period_days]").is_none());
    }

    // ══════════════════════════════════════════════════════════════
    // Error Mapping Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn resource_missing_maps_to_not_found() {
        let body = r#"{"error":{"code":"resource_missing","message":"No such checkout.session"}}"#;
        let err = map_error_response(StatusCode::BAD_REQUEST, body, "Checkout session");
        assert_eq!(err.code, PaymentErrorCode::NotFound);
        assert_eq!(err.provider_code.as_deref(), Some("resource_missing"));
    }

    #[test]
    fn status_codes_map_to_error_codes() {
        assert_eq!(
            map_error_response(StatusCode::UNAUTHORIZED, "", "x").code,
            PaymentErrorCode::AuthenticationError
        );
        assert_eq!(
            map_error_response(StatusCode::TOO_MANY_REQUESTS, "", "x").code,
            PaymentErrorCode::RateLimitExceeded
        );
        assert_eq!(
            map_error_response(StatusCode::BAD_GATEWAY, "not json", "x").code,
            PaymentErrorCode::NetworkError
        );
        assert_eq!(
            map_error_response(StatusCode::NOT_FOUND, "", "Customer").message,
            "Customer not found"
        );
    }

    #[test]
    fn session_ids_are_checked_before_use_in_path() {
        assert!(is_safe_id("cs_test_a1B2"));
        assert!(!is_safe_id("cs_test/../../v1/customers"));
        assert!(!is_safe_id(""));
    }

    #[tokio::test]
    async fn malformed_session_id_is_rejected_without_network() {
        let adapter = StripePaymentAdapter::new(
            StripeConfig::new("sk_test_x").with_base_url("http://127.0.0.1:9"),
        )
        .unwrap();

        let err = adapter.retrieve_checkout_session("cs_bad?x=1").await.unwrap_err();
        assert_eq!(err.code, PaymentErrorCode::InvalidRequest);
    }
}
