//! GrantPremiumHandler - Command handler for manual premium grants.
//!
//! Bypasses payment. When an admin token is configured the caller must
//! present it; the comparison is constant time.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;

use crate::domain::entitlement::{ClientAccount, EntitlementError, EntitlementPolicy};
use crate::domain::foundation::{ClientId, Timestamp};
use crate::ports::{AccountRepository, PremiumGrant};

/// Command to grant premium manually.
#[derive(Debug, Clone)]
pub struct GrantPremiumCommand {
    /// Raw identifier from the request body.
    pub client_id: Option<String>,
    /// Token presented by the caller, if any.
    pub admin_token: Option<String>,
}

/// Result of a manual grant.
#[derive(Debug, Clone)]
pub struct GrantPremiumResult {
    pub account: ClientAccount,
    pub premium_until: Timestamp,
}

/// Handler for manual premium grants.
pub struct GrantPremiumHandler {
    accounts: Arc<dyn AccountRepository>,
    policy: EntitlementPolicy,
    admin_token: Option<SecretString>,
}

impl GrantPremiumHandler {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        policy: EntitlementPolicy,
        admin_token: Option<SecretString>,
    ) -> Self {
        Self {
            accounts,
            policy,
            admin_token,
        }
    }

    pub async fn handle(
        &self,
        cmd: GrantPremiumCommand,
    ) -> Result<GrantPremiumResult, EntitlementError> {
        self.authorize(cmd.admin_token.as_deref())?;

        let client_id = match cmd.client_id.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => ClientId::new(raw)?,
            _ => return Err(EntitlementError::MissingClientId),
        };

        let now = Timestamp::now();
        let until = now.add_days(self.policy.premium_period_days);
        let account = self
            .accounts
            .grant_premium(&PremiumGrant::new(client_id.clone(), until), now)
            .await?;

        tracing::info!(client_id = %client_id, premium_until = %until, "Premium granted manually");

        Ok(GrantPremiumResult {
            premium_until: account.premium_until.unwrap_or(until),
            account,
        })
    }

    fn authorize(&self, presented: Option<&str>) -> Result<(), EntitlementError> {
        let Some(expected) = &self.admin_token else {
            return Ok(());
        };

        let presented = presented.unwrap_or_default().as_bytes();
        let expected = expected.expose_secret().as_bytes();
        let matches = presented.len() == expected.len() && bool::from(presented.ct_eq(expected));

        if matches {
            Ok(())
        } else {
            tracing::warn!("Manual premium grant refused: bad admin token");
            Err(EntitlementError::Unauthorized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryAccountRepository;

    fn command(client: Option<&str>, token: Option<&str>) -> GrantPremiumCommand {
        GrantPremiumCommand {
            client_id: client.map(str::to_string),
            admin_token: token.map(str::to_string),
        }
    }

    fn handler(
        accounts: Arc<InMemoryAccountRepository>,
        token: Option<&str>,
    ) -> GrantPremiumHandler {
        GrantPremiumHandler::new(
            accounts,
            EntitlementPolicy::default(),
            token.map(|t| SecretString::new(t.to_string())),
        )
    }

    #[tokio::test]
    async fn grants_premium_for_the_period() {
        let accounts = Arc::new(InMemoryAccountRepository::new());
        let before = Timestamp::now();

        let result = handler(accounts.clone(), None)
            .handle(command(Some("client_abc"), None))
            .await
            .unwrap();

        assert!(result.account.is_premium);
        assert!(result.premium_until >= before.add_days(7));
        assert_eq!(accounts.len().await, 1);
    }

    #[tokio::test]
    async fn missing_client_id_is_rejected() {
        let accounts = Arc::new(InMemoryAccountRepository::new());

        let err = handler(accounts, None)
            .handle(command(Some("  "), None))
            .await
            .unwrap_err();

        assert_eq!(err, EntitlementError::MissingClientId);
    }

    #[tokio::test]
    async fn configured_token_must_match() {
        let accounts = Arc::new(InMemoryAccountRepository::new());
        let handler = handler(accounts.clone(), Some("s3cret"));

        let wrong = handler.handle(command(Some("client_abc"), Some("guess"))).await;
        let missing = handler.handle(command(Some("client_abc"), None)).await;
        let right = handler.handle(command(Some("client_abc"), Some("s3cret"))).await;

        assert_eq!(wrong.unwrap_err(), EntitlementError::Unauthorized);
        assert_eq!(missing.unwrap_err(), EntitlementError::Unauthorized);
        assert!(right.is_ok());
    }

    #[tokio::test]
    async fn regrant_never_shortens_existing_premium() {
        let accounts = Arc::new(InMemoryAccountRepository::new());
        let handler = handler(accounts, None);

        let first = handler.handle(command(Some("client_abc"), None)).await.unwrap();
        let second = handler.handle(command(Some("client_abc"), None)).await.unwrap();

        assert!(second.premium_until >= first.premium_until);
    }
}
