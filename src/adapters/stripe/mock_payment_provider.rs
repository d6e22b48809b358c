//! Mock payment provider for testing.
//!
//! Provides a configurable mock implementation of `PaymentProvider` for unit
//! and integration tests. Supports:
//! - Pre-configured checkout sessions
//! - Error injection
//! - Call tracking

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::billing::CheckoutSessionDetails;
use crate::ports::{
    CheckoutSession, CreateCheckoutRequest, PaymentError, PaymentProvider, PortalSession,
};

/// Mock payment provider for testing.
///
/// # Example
///
/// ```ignore
/// let mock = MockPaymentProvider::new();
///
/// // Configure responses
/// mock.set_session(CheckoutSessionDetails { id: "cs_test_1".into(), .. });
///
/// // Inject errors
/// mock.set_error(PaymentError::network("Test outage"));
/// ```
#[derive(Default, Clone)]
pub struct MockPaymentProvider {
    /// Inner state (thread-safe for async tests).
    inner: Arc<Mutex<MockState>>,
}

/// Internal mutable state.
#[derive(Default)]
struct MockState {
    /// Checkout sessions returned by `retrieve_checkout_session`.
    sessions: HashMap<String, CheckoutSessionDetails>,

    /// Error to return on next call.
    next_error: Option<PaymentError>,

    /// Checkout requests received, in order.
    checkout_requests: Vec<CreateCheckoutRequest>,

    /// Track method calls for assertions.
    call_log: Vec<MethodCall>,
}

/// Recorded method call for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCall {
    pub method: String,
    pub args: Vec<String>,
}

impl MockPaymentProvider {
    /// Create a new mock provider with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    /// Make a checkout session retrievable by its id.
    pub fn set_session(&self, session: CheckoutSessionDetails) {
        self.state().sessions.insert(session.id.clone(), session);
    }

    /// Fail the next call with this error.
    pub fn set_error(&self, error: PaymentError) {
        self.state().next_error = Some(error);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Assertion Helpers
    // ════════════════════════════════════════════════════════════════════════════

    /// All recorded calls.
    pub fn calls(&self) -> Vec<MethodCall> {
        self.state().call_log.clone()
    }

    /// Number of calls to one method.
    pub fn call_count(&self, method: &str) -> usize {
        self.state()
            .call_log
            .iter()
            .filter(|c| c.method == method)
            .count()
    }

    /// Checkout requests received so far.
    pub fn checkout_requests(&self) -> Vec<CreateCheckoutRequest> {
        self.state().checkout_requests.clone()
    }

    fn record(&self, method: &str, args: Vec<String>) -> Result<(), PaymentError> {
        let mut state = self.state();
        state.call_log.push(MethodCall {
            method: method.to_string(),
            args,
        });
        match state.next_error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl PaymentProvider for MockPaymentProvider {
    async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSessionDetails, PaymentError> {
        self.record("retrieve_checkout_session", vec![session_id.to_string()])?;

        self.state()
            .sessions
            .get(session_id)
            .cloned()
            .ok_or_else(|| PaymentError::not_found("Checkout session"))
    }

    async fn create_checkout_session(
        &self,
        request: CreateCheckoutRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        self.record(
            "create_checkout_session",
            vec![request.client_id.to_string()],
        )?;

        let mut state = self.state();
        let id = format!("cs_test_mock_{}", state.checkout_requests.len() + 1);
        state.checkout_requests.push(request);

        Ok(CheckoutSession {
            url: format!("https://checkout.stripe.com/c/pay/{}", id),
            id,
        })
    }

    async fn create_portal_session(
        &self,
        customer_id: &str,
        return_url: &str,
    ) -> Result<PortalSession, PaymentError> {
        self.record(
            "create_portal_session",
            vec![customer_id.to_string(), return_url.to_string()],
        )?;

        Ok(PortalSession {
            id: "bps_test_mock".to_string(),
            url: format!("https://billing.stripe.com/p/session/{}", customer_id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::PaymentErrorCode;

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let mock = MockPaymentProvider::new();
        let err = mock.retrieve_checkout_session("cs_missing").await.unwrap_err();
        assert_eq!(err.code, PaymentErrorCode::NotFound);
    }

    #[tokio::test]
    async fn configured_session_is_returned() {
        let mock = MockPaymentProvider::new();
        mock.set_session(CheckoutSessionDetails {
            id: "cs_test_1".into(),
            payment_status: Some("paid".into()),
            ..Default::default()
        });

        let session = mock.retrieve_checkout_session("cs_test_1").await.unwrap();
        assert!(session.is_paid());
        assert_eq!(mock.call_count("retrieve_checkout_session"), 1);
    }

    #[tokio::test]
    async fn injected_error_fails_one_call() {
        let mock = MockPaymentProvider::new();
        mock.set_error(PaymentError::network("down"));

        assert!(mock.create_portal_session("cus_1", "https://x").await.is_err());
        assert!(mock.create_portal_session("cus_1", "https://x").await.is_ok());
    }
}
