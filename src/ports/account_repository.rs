//! AccountRepository port - persistence of per-client entitlement records.
//!
//! Every mutation here is a single conditional statement against the store.
//! Implementations must never split a check and its write across an await
//! point visible to other requests; the trial debit in particular is the
//! double-spend guard for concurrent generation requests.

use async_trait::async_trait;

use crate::domain::entitlement::{ClientAccount, EntitlementPolicy};
use crate::domain::foundation::{ClientId, DomainError, Timestamp};

/// Premium grant applied through a conflict-safe upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PremiumGrant {
    pub client_id: ClientId,

    /// Candidate expiry. The stored value becomes `max(existing, until)`.
    pub until: Timestamp,

    /// Recorded when present, never cleared when absent.
    pub stripe_customer_id: Option<String>,

    /// Marks the promotional checkout as used when present.
    pub promo_type: Option<String>,
}

impl PremiumGrant {
    pub fn new(client_id: ClientId, until: Timestamp) -> Self {
        Self {
            client_id,
            until,
            stripe_customer_id: None,
            promo_type: None,
        }
    }

    pub fn with_customer(mut self, customer_id: Option<String>) -> Self {
        self.stripe_customer_id = customer_id.filter(|id| !id.trim().is_empty());
        self
    }

    pub fn with_promo(mut self, promo_type: Option<String>) -> Self {
        self.promo_type = promo_type;
        self
    }
}

/// Repository port for client accounts.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Find an account without creating one.
    async fn find(&self, client_id: &ClientId) -> Result<Option<ClientAccount>, DomainError>;

    /// Load the account, inserting a zero-allowance record when absent.
    async fn find_or_create(
        &self,
        client_id: &ClientId,
        now: Timestamp,
    ) -> Result<ClientAccount, DomainError>;

    /// Upsert the account with a fresh allowance and window.
    ///
    /// An existing account has its trial reset.
    async fn start_trial(
        &self,
        client_id: &ClientId,
        policy: &EntitlementPolicy,
        now: Timestamp,
    ) -> Result<ClientAccount, DomainError>;

    /// Atomically take one trial unit.
    ///
    /// Returns the updated account, or `None` when the account had no unit
    /// left, its window had elapsed, or it does not exist.
    async fn try_debit_trial(
        &self,
        client_id: &ClientId,
        now: Timestamp,
    ) -> Result<Option<ClientAccount>, DomainError>;

    /// Give one trial unit back, capped at `cap`. `used_count` is untouched.
    async fn credit_trial(
        &self,
        client_id: &ClientId,
        cap: u32,
        now: Timestamp,
    ) -> Result<Option<ClientAccount>, DomainError>;

    /// Upsert the account to premium.
    async fn grant_premium(
        &self,
        grant: &PremiumGrant,
        now: Timestamp,
    ) -> Result<ClientAccount, DomainError>;

    /// Clear the premium flag. Returns false when no account matched.
    async fn revoke_premium(&self, client_id: &ClientId, now: Timestamp)
        -> Result<bool, DomainError>;
}
