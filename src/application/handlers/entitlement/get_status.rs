//! GetStatusHandler - Query handler for the entitlement status view.

use std::sync::Arc;

use crate::domain::entitlement::{EntitlementError, EntitlementPolicy, EntitlementSnapshot};
use crate::domain::foundation::{ClientId, Timestamp};
use crate::ports::AccountRepository;

/// Query for a client's entitlement status.
#[derive(Debug, Clone)]
pub struct GetStatusQuery {
    pub client_id: ClientId,
}

/// Status view rendered by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetStatusResult {
    /// Re-validated against `premium_until`, never the raw stored flag.
    pub is_premium: bool,
    pub free_plays_left: u32,
    pub days_left: Option<i64>,
    pub premium_until: Option<Timestamp>,
    pub snapshot: EntitlementSnapshot,
}

/// Handler for status queries. Never writes.
pub struct GetStatusHandler {
    accounts: Arc<dyn AccountRepository>,
    policy: EntitlementPolicy,
}

impl GetStatusHandler {
    pub fn new(accounts: Arc<dyn AccountRepository>, policy: EntitlementPolicy) -> Self {
        Self { accounts, policy }
    }

    pub async fn handle(&self, query: GetStatusQuery) -> Result<GetStatusResult, EntitlementError> {
        let now = Timestamp::now();

        let Some(account) = self.accounts.find(&query.client_id).await? else {
            return Ok(GetStatusResult {
                is_premium: false,
                free_plays_left: self.policy.trial_allowance,
                days_left: None,
                premium_until: None,
                snapshot: EntitlementSnapshot::unclaimed(&self.policy),
            });
        };

        let is_premium = account.is_premium_active(now);

        Ok(GetStatusResult {
            is_premium,
            free_plays_left: account.trial_messages_left,
            days_left: account.premium_days_left(now),
            premium_until: if is_premium { account.premium_until } else { None },
            snapshot: EntitlementSnapshot::for_account(&account, &self.policy, now),
        })
    }
}
