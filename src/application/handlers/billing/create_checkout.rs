//! CreateCheckoutHandler - Command handler for the standard weekly checkout.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::billing::METADATA_CLIENT_ID;
use crate::domain::entitlement::EntitlementError;
use crate::domain::foundation::{ClientId, Timestamp};
use crate::ports::{AccountRepository, CheckoutLineItem, CreateCheckoutRequest, PaymentProvider};

use super::{payment_failure, CheckoutSettings};

/// Command to create a checkout session. Shared by the promotional flow.
#[derive(Debug, Clone)]
pub struct CreateCheckoutCommand {
    pub client_id: ClientId,
    pub success_url: Option<String>,
    pub cancel_url: Option<String>,
}

/// Created checkout session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCheckoutResult {
    pub session_id: String,
    pub url: String,
}

/// Handler for the standard subscription checkout.
pub struct CreateCheckoutHandler {
    accounts: Arc<dyn AccountRepository>,
    payment_provider: Arc<dyn PaymentProvider>,
    settings: CheckoutSettings,
}

impl CreateCheckoutHandler {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        payment_provider: Arc<dyn PaymentProvider>,
        settings: CheckoutSettings,
    ) -> Self {
        Self {
            accounts,
            payment_provider,
            settings,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateCheckoutCommand,
    ) -> Result<CreateCheckoutResult, EntitlementError> {
        if let Some(account) = self.accounts.find(&cmd.client_id).await? {
            if account.is_premium_active(Timestamp::now()) {
                return Err(EntitlementError::AlreadyPremium);
            }
        }

        let mut metadata = BTreeMap::new();
        metadata.insert(METADATA_CLIENT_ID.to_string(), cmd.client_id.to_string());

        let request = CreateCheckoutRequest {
            client_id: cmd.client_id.clone(),
            line_items: vec![CheckoutLineItem::Price {
                price_id: self.settings.weekly_price_id.clone(),
                quantity: 1,
            }],
            trial_period_days: None,
            success_url: non_blank(cmd.success_url).unwrap_or_else(|| self.settings.success_url.clone()),
            cancel_url: non_blank(cmd.cancel_url).unwrap_or_else(|| self.settings.cancel_url.clone()),
            metadata,
        };

        let session = self
            .payment_provider
            .create_checkout_session(request)
            .await
            .map_err(|e| payment_failure("create_checkout_session", e))?;

        tracing::info!(client_id = %cmd.client_id, session_id = %session.id, "Checkout session created");

        Ok(CreateCheckoutResult {
            session_id: session.id,
            url: session.url,
        })
    }
}

/// Treats an empty override as absent.
pub(super) fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryAccountRepository;
    use crate::adapters::stripe::MockPaymentProvider;
    use crate::domain::entitlement::ClientAccount;
    use crate::ports::PaymentError;

    fn client() -> ClientId {
        ClientId::new("client_abc").unwrap()
    }

    fn settings() -> CheckoutSettings {
        CheckoutSettings {
            weekly_price_id: "price_weekly".to_string(),
            ..CheckoutSettings::default()
        }
    }

    fn command() -> CreateCheckoutCommand {
        CreateCheckoutCommand {
            client_id: client(),
            success_url: None,
            cancel_url: None,
        }
    }

    #[tokio::test]
    async fn creates_weekly_subscription_session() {
        let accounts = Arc::new(InMemoryAccountRepository::new());
        let provider = MockPaymentProvider::new();
        let handler = CreateCheckoutHandler::new(accounts, Arc::new(provider.clone()), settings());

        let result = handler.handle(command()).await.unwrap();

        assert!(result.session_id.starts_with("cs_"));
        let requests = provider.checkout_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(
            requests[0].line_items,
            vec![CheckoutLineItem::Price {
                price_id: "price_weekly".to_string(),
                quantity: 1
            }]
        );
        assert_eq!(requests[0].metadata.get("client_id").map(String::as_str), Some("client_abc"));
        assert!(requests[0].success_url.contains("{CHECKOUT_SESSION_ID}"));
        assert_eq!(requests[0].trial_period_days, None);
    }

    #[tokio::test]
    async fn caller_urls_override_defaults() {
        let accounts = Arc::new(InMemoryAccountRepository::new());
        let provider = MockPaymentProvider::new();
        let handler = CreateCheckoutHandler::new(accounts, Arc::new(provider.clone()), settings());

        handler
            .handle(CreateCheckoutCommand {
                success_url: Some("https://example.test/ok".to_string()),
                cancel_url: Some(" ".to_string()),
                ..command()
            })
            .await
            .unwrap();

        let request = &provider.checkout_requests()[0];
        assert_eq!(request.success_url, "https://example.test/ok");
        assert_eq!(request.cancel_url, "https://xaveco.app");
    }

    #[tokio::test]
    async fn active_premium_is_refused() {
        let accounts = Arc::new(InMemoryAccountRepository::new());
        let now = Timestamp::now();
        let mut account = ClientAccount::unclaimed(client(), now);
        account.grant_premium(now.add_days(3), None, None, now);
        accounts.insert(account).await;
        let provider = MockPaymentProvider::new();
        let handler = CreateCheckoutHandler::new(accounts, Arc::new(provider.clone()), settings());

        let err = handler.handle(command()).await.unwrap_err();

        assert_eq!(err, EntitlementError::AlreadyPremium);
        assert_eq!(provider.call_count("create_checkout_session"), 0);
    }

    #[tokio::test]
    async fn provider_failure_is_upstream_error() {
        let accounts = Arc::new(InMemoryAccountRepository::new());
        let provider = MockPaymentProvider::new();
        provider.set_error(PaymentError::network("connection reset"));
        let handler = CreateCheckoutHandler::new(accounts, Arc::new(provider), settings());

        let err = handler.handle(command()).await.unwrap_err();

        assert_eq!(err.code(), "upstream_error");
    }
}
