//! CreatePortalSessionHandler - Command handler for billing-portal access.

use std::sync::Arc;

use crate::domain::entitlement::EntitlementError;
use crate::domain::foundation::ClientId;
use crate::ports::{AccountRepository, PaymentProvider};

use super::create_checkout::non_blank;
use super::{payment_failure, CheckoutSettings};

/// Command to open the billing portal.
#[derive(Debug, Clone)]
pub struct CreatePortalSessionCommand {
    pub client_id: ClientId,
    pub return_url: Option<String>,
}

/// Portal session the browser is redirected to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePortalSessionResult {
    pub url: String,
}

/// Handler for portal sessions.
///
/// Checks run in a fixed order: account, stored premium flag, customer id.
/// The stored flag is used rather than the expiry so that a lapsed but
/// unrevoked subscriber can still manage billing.
pub struct CreatePortalSessionHandler {
    accounts: Arc<dyn AccountRepository>,
    payment_provider: Arc<dyn PaymentProvider>,
    settings: CheckoutSettings,
}

impl CreatePortalSessionHandler {
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
        cmd: CreatePortalSessionCommand,
    ) -> Result<CreatePortalSessionResult, EntitlementError> {
        let account = self
            .accounts
            .find(&cmd.client_id)
            .await?
            .ok_or(EntitlementError::AccountNotFound)?;

        if !account.is_premium {
            return Err(EntitlementError::NotPremium);
        }

        let customer_id = account
            .stripe_customer_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(EntitlementError::NoSubscription)?;

        let return_url =
            non_blank(cmd.return_url).unwrap_or_else(|| self.settings.portal_return_url.clone());

        let session = self
            .payment_provider
            .create_portal_session(customer_id, &return_url)
            .await
            .map_err(|e| payment_failure("create_portal_session", e))?;

        tracing::info!(client_id = %cmd.client_id, "Portal session created");

        Ok(CreatePortalSessionResult { url: session.url })
    }
}
