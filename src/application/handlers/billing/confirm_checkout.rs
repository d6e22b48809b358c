//! ConfirmCheckoutHandler - post-redirect checkout reconciliation.
//!
//! The browser polls this right after returning from checkout, often while
//! the webhook for the same session is in flight. Both paths anchor the
//! expiry to the session's creation time and the store keeps the later of
//! the existing and candidate expiry, so they converge on one value.

use std::sync::Arc;

use crate::domain::entitlement::{EntitlementError, EntitlementPolicy};
use crate::domain::foundation::{ClientId, Timestamp};
use crate::ports::{AccountRepository, PaymentErrorCode, PaymentProvider, PremiumGrant};

use super::payment_failure;

/// Checkout session ids always carry this prefix.
const SESSION_ID_PREFIX: &str = "cs_";

/// Command to confirm a checkout session.
#[derive(Debug, Clone)]
pub struct ConfirmCheckoutCommand {
    pub session_id: String,
}

/// Outcome of a confirmation poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmCheckoutResult {
    /// Payment has not completed yet. Not an error; the client polls again.
    Pending,
    /// Premium granted (or already granted) for the session's client.
    Confirmed {
        client_id: ClientId,
        premium_until: Timestamp,
    },
}

/// Handler for checkout confirmation.
pub struct ConfirmCheckoutHandler {
    accounts: Arc<dyn AccountRepository>,
    payment_provider: Arc<dyn PaymentProvider>,
    policy: EntitlementPolicy,
}

impl ConfirmCheckoutHandler {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        payment_provider: Arc<dyn PaymentProvider>,
        policy: EntitlementPolicy,
    ) -> Self {
        Self {
            accounts,
            payment_provider,
            policy,
        }
    }

    pub async fn handle(
        &self,
        cmd: ConfirmCheckoutCommand,
    ) -> Result<ConfirmCheckoutResult, EntitlementError> {
        // 1. Shape check before any provider call
        let session_id = cmd.session_id.trim();
        if session_id.is_empty() || !session_id.starts_with(SESSION_ID_PREFIX) {
            return Err(EntitlementError::invalid_session("malformed session id"));
        }

        // 2. Retrieve
        let session = self
            .payment_provider
            .retrieve_checkout_session(session_id)
            .await
            .map_err(|e| match e.code {
                PaymentErrorCode::NotFound => EntitlementError::invalid_session(e.message),
                _ => payment_failure("retrieve_checkout_session", e),
            })?;

        if !session.is_paid() {
            tracing::debug!(session_id, "Checkout not paid yet");
            return Ok(ConfirmCheckoutResult::Pending);
        }

        // 3. Grant
        let client_id = session
            .client_reference()
            .ok_or(EntitlementError::NoClientReference)?;

        let now = Timestamp::now();
        let until = session
            .created_at()
            .unwrap_or(now)
            .add_days(self.policy.premium_period_days);

        let grant = PremiumGrant::new(client_id.clone(), until)
            .with_customer(session.customer.clone())
            .with_promo(session.promo_type());
        let account = self.accounts.grant_premium(&grant, now).await?;

        tracing::info!(
            client_id = %client_id,
            session_id,
            premium_until = %until,
            "Checkout confirmed"
        );

        Ok(ConfirmCheckoutResult::Confirmed {
            client_id,
            premium_until: account.premium_until.unwrap_or(until),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryAccountRepository;
    use crate::adapters::stripe::MockPaymentProvider;
    use crate::domain::billing::CheckoutSessionDetails;
    use crate::ports::PaymentError;
    use std::collections::HashMap;

    // ════════════════════════════════════════════════════════════════════════════
    // Test Fixtures
    // ════════════════════════════════════════════════════════════════════════════

    fn paid_session(created: i64) -> CheckoutSessionDetails {
        CheckoutSessionDetails {
            id: "cs_test_paid".to_string(),
            created: Some(created),
            client_reference_id: Some("client_abc".to_string()),
            customer: Some("cus_123".to_string()),
            payment_status: Some("paid".to_string()),
            status: Some("complete".to_string()),
            ..Default::default()
        }
    }

    fn handler(
        accounts: Arc<InMemoryAccountRepository>,
        provider: &MockPaymentProvider,
    ) -> ConfirmCheckoutHandler {
        ConfirmCheckoutHandler::new(
            accounts,
            Arc::new(provider.clone()),
            EntitlementPolicy::default(),
        )
    }

    fn command(id: &str) -> ConfirmCheckoutCommand {
        ConfirmCheckoutCommand {
            session_id: id.to_string(),
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Validation Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn malformed_session_id_is_rejected_without_provider_call() {
        let provider = MockPaymentProvider::new();
        let handler = handler(Arc::new(InMemoryAccountRepository::new()), &provider);

        for id in ["", "   ", "sub_123", "pi_123"] {
            let err = handler.handle(command(id)).await.unwrap_err();
            assert_eq!(err.code(), "invalid_session");
        }
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn unknown_session_is_invalid_session() {
        let provider = MockPaymentProvider::new();
        let handler = handler(Arc::new(InMemoryAccountRepository::new()), &provider);

        let err = handler.handle(command("cs_unknown")).await.unwrap_err();

        assert_eq!(err.code(), "invalid_session");
    }

    #[tokio::test]
    async fn provider_outage_is_upstream_error() {
        let provider = MockPaymentProvider::new();
        provider.set_error(PaymentError::network("timeout"));
        let handler = handler(Arc::new(InMemoryAccountRepository::new()), &provider);

        let err = handler.handle(command("cs_test_paid")).await.unwrap_err();

        assert_eq!(err.code(), "upstream_error");
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Reconciliation Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn unpaid_session_is_pending() {
        let provider = MockPaymentProvider::new();
        provider.set_session(CheckoutSessionDetails {
            id: "cs_test_open".to_string(),
            client_reference_id: Some("client_abc".to_string()),
            payment_status: Some("unpaid".to_string()),
            status: Some("open".to_string()),
            ..Default::default()
        });
        let accounts = Arc::new(InMemoryAccountRepository::new());

        let result = handler(accounts.clone(), &provider)
            .handle(command("cs_test_open"))
            .await
            .unwrap();

        assert_eq!(result, ConfirmCheckoutResult::Pending);
        assert!(accounts.is_empty().await);
    }

    #[tokio::test]
    async fn paid_session_grants_premium_with_customer() {
        let provider = MockPaymentProvider::new();
        let created = Timestamp::now().as_unix_secs();
        provider.set_session(paid_session(created));
        let accounts = Arc::new(InMemoryAccountRepository::new());

        let result = handler(accounts.clone(), &provider)
            .handle(command("cs_test_paid"))
            .await
            .unwrap();

        let expected_until = Timestamp::from_unix_secs(created).unwrap().add_days(7);
        assert_eq!(
            result,
            ConfirmCheckoutResult::Confirmed {
                client_id: ClientId::new("client_abc").unwrap(),
                premium_until: expected_until,
            }
        );
        let account = accounts
            .find(&ClientId::new("client_abc").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert!(account.is_premium);
        assert_eq!(account.stripe_customer_id.as_deref(), Some("cus_123"));
    }

    #[tokio::test]
    async fn confirming_twice_yields_same_expiry() {
        let provider = MockPaymentProvider::new();
        provider.set_session(paid_session(Timestamp::now().as_unix_secs()));
        let accounts = Arc::new(InMemoryAccountRepository::new());
        let handler = handler(accounts, &provider);

        let first = handler.handle(command("cs_test_paid")).await.unwrap();
        let second = handler.handle(command("cs_test_paid")).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn paid_session_without_reference_fails() {
        let provider = MockPaymentProvider::new();
        let mut session = paid_session(Timestamp::now().as_unix_secs());
        session.client_reference_id = None;
        provider.set_session(session);

        let err = handler(Arc::new(InMemoryAccountRepository::new()), &provider)
            .handle(command("cs_test_paid"))
            .await
            .unwrap_err();

        assert_eq!(err, EntitlementError::NoClientReference);
    }

    #[tokio::test]
    async fn legacy_user_id_metadata_is_accepted_and_promo_recorded() {
        let provider = MockPaymentProvider::new();
        let mut session = paid_session(Timestamp::now().as_unix_secs());
        session.client_reference_id = None;
        session.metadata = Some(HashMap::from([
            ("user_id".to_string(), "client_legacy".to_string()),
            ("promo_type".to_string(), "activation_week".to_string()),
        ]));
        provider.set_session(session);
        let accounts = Arc::new(InMemoryAccountRepository::new());

        handler(accounts.clone(), &provider)
            .handle(command("cs_test_paid"))
            .await
            .unwrap();

        let account = accounts
            .find(&ClientId::new("client_legacy").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert!(account.promo_applied);
        assert_eq!(account.promo_type.as_deref(), Some("activation_week"));
    }
}
