//! In-memory account store.
//!
//! Useful for development and the integration tests. Each operation runs its
//! check and its write under one write-lock acquisition, which gives the same
//! atomicity the PostgreSQL conditional updates give. Not for production:
//! state is lost on restart and not shared between instances.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::entitlement::{ClientAccount, EntitlementPolicy};
use crate::domain::foundation::{ClientId, DomainError, Timestamp};
use crate::ports::{AccountRepository, PremiumGrant};

/// In-memory implementation of the AccountRepository port.
#[derive(Default)]
pub struct InMemoryAccountRepository {
    accounts: RwLock<HashMap<ClientId, ClientAccount>>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store an account as-is, replacing any existing record.
    pub async fn insert(&self, account: ClientAccount) {
        self.accounts
            .write()
            .await
            .insert(account.client_id.clone(), account);
    }

    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn find(&self, client_id: &ClientId) -> Result<Option<ClientAccount>, DomainError> {
        Ok(self.accounts.read().await.get(client_id).cloned())
    }

    async fn find_or_create(
        &self,
        client_id: &ClientId,
        now: Timestamp,
    ) -> Result<ClientAccount, DomainError> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .entry(client_id.clone())
            .or_insert_with(|| ClientAccount::unclaimed(client_id.clone(), now));
        Ok(account.clone())
    }

    async fn start_trial(
        &self,
        client_id: &ClientId,
        policy: &EntitlementPolicy,
        now: Timestamp,
    ) -> Result<ClientAccount, DomainError> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .entry(client_id.clone())
            .or_insert_with(|| ClientAccount::unclaimed(client_id.clone(), now));
        account.start_trial(policy, now);
        Ok(account.clone())
    }

    async fn try_debit_trial(
        &self,
        client_id: &ClientId,
        now: Timestamp,
    ) -> Result<Option<ClientAccount>, DomainError> {
        let mut accounts = self.accounts.write().await;
        let Some(account) = accounts.get_mut(client_id) else {
            return Ok(None);
        };
        match account.debit_trial(now) {
            Ok(()) => Ok(Some(account.clone())),
            Err(_) => Ok(None),
        }
    }

    async fn credit_trial(
        &self,
        client_id: &ClientId,
        cap: u32,
        now: Timestamp,
    ) -> Result<Option<ClientAccount>, DomainError> {
        let mut accounts = self.accounts.write().await;
        Ok(accounts.get_mut(client_id).map(|account| {
            account.credit_trial(cap, now);
            account.clone()
        }))
    }

    async fn grant_premium(
        &self,
        grant: &PremiumGrant,
        now: Timestamp,
    ) -> Result<ClientAccount, DomainError> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .entry(grant.client_id.clone())
            .or_insert_with(|| ClientAccount::unclaimed(grant.client_id.clone(), now));
        account.grant_premium(
            grant.until,
            grant.stripe_customer_id.clone(),
            grant.promo_type.clone(),
            now,
        );
        Ok(account.clone())
    }

    async fn revoke_premium(
        &self,
        client_id: &ClientId,
        now: Timestamp,
    ) -> Result<bool, DomainError> {
        let mut accounts = self.accounts.write().await;
        Ok(match accounts.get_mut(client_id) {
            Some(account) => {
                account.revoke_premium(now);
                true
            }
            None => false,
        })
    }
}
