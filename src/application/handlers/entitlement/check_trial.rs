//! CheckTrialHandler - Query handler for the legacy trial check.

use std::sync::Arc;

use crate::domain::entitlement::{EntitlementError, EntitlementPolicy};
use crate::domain::foundation::{ClientId, Timestamp};
use crate::ports::AccountRepository;

/// Query for the legacy trial check.
#[derive(Debug, Clone)]
pub struct CheckTrialQuery {
    pub client_id: ClientId,
}

/// Legacy trial view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckTrialResult {
    pub premium: bool,
    pub used_count: u64,
    pub limit: u32,
    /// End of the trial window, `None` when no trial was started.
    pub expires_at: Option<Timestamp>,
}

/// Handler for the legacy check. Never writes.
pub struct CheckTrialHandler {
    accounts: Arc<dyn AccountRepository>,
    policy: EntitlementPolicy,
}

impl CheckTrialHandler {
    pub fn new(accounts: Arc<dyn AccountRepository>, policy: EntitlementPolicy) -> Self {
        Self { accounts, policy }
    }

    pub async fn handle(&self, query: CheckTrialQuery) -> Result<CheckTrialResult, EntitlementError> {
        let account = self.accounts.find(&query.client_id).await?;

        Ok(match account {
            Some(account) => CheckTrialResult {
                premium: account.is_premium_active(Timestamp::now()),
                used_count: account.used_count,
                limit: self.policy.trial_allowance,
                expires_at: account.trial_expires_at,
            },
            None => CheckTrialResult {
                premium: false,
                used_count: 0,
                limit: self.policy.trial_allowance,
                expires_at: None,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryAccountRepository;
    use crate::domain::entitlement::ClientAccount;

    fn client() -> ClientId {
        ClientId::new("client_abc").unwrap()
    }

    #[tokio::test]
    async fn unknown_client_reports_defaults() {
        let accounts = Arc::new(InMemoryAccountRepository::new());
        let handler = CheckTrialHandler::new(accounts.clone(), EntitlementPolicy::default());

        let result = handler.handle(CheckTrialQuery { client_id: client() }).await.unwrap();

        assert_eq!(
            result,
            CheckTrialResult {
                premium: false,
                used_count: 0,
                limit: 2,
                expires_at: None,
            }
        );
        assert!(accounts.is_empty().await);
    }

    #[tokio::test]
    async fn reports_usage_and_window() {
        let accounts = Arc::new(InMemoryAccountRepository::new());
        let now = Timestamp::now();
        let mut account = ClientAccount::unclaimed(client(), now);
        account.start_trial(&EntitlementPolicy::default(), now);
        account.debit_trial(now).unwrap();
        accounts.insert(account).await;
        let handler = CheckTrialHandler::new(accounts, EntitlementPolicy::default());

        let result = handler.handle(CheckTrialQuery { client_id: client() }).await.unwrap();

        assert!(!result.premium);
        assert_eq!(result.used_count, 1);
        assert_eq!(result.expires_at, Some(now.add_days(2)));
    }
}
