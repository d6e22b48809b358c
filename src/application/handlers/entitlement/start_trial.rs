//! StartTrialHandler - Command handler for granting or resetting a trial.

use std::sync::Arc;

use serde_json::json;

use crate::adapters::analytics::AnalyticsDispatcher;
use crate::domain::analytics::{AnalyticsEvent, AnalyticsEventType};
use crate::domain::entitlement::{
    ClientAccount, EntitlementError, EntitlementPolicy, IpGate, OriginAddress, TrialOriginRecord,
};
use crate::domain::foundation::{ClientId, Timestamp};
use crate::ports::{AccountRepository, TrialOriginRepository};

/// Command to start a trial.
#[derive(Debug, Clone)]
pub struct StartTrialCommand {
    pub client_id: ClientId,
    /// Network origin of the request, `unknown` when it could not be derived.
    pub origin: OriginAddress,
}

/// Result of a started trial.
#[derive(Debug, Clone)]
pub struct StartTrialResult {
    pub messages_left: u32,
    pub expires_at: Timestamp,
    pub account: ClientAccount,
}

/// Handler for starting trials.
///
/// A restart resets the allowance and window of an existing account. The only
/// guards are the origin gate and an already-exhausted trial.
pub struct StartTrialHandler {
    accounts: Arc<dyn AccountRepository>,
    origins: Arc<dyn TrialOriginRepository>,
    analytics: AnalyticsDispatcher,
    policy: EntitlementPolicy,
}

impl StartTrialHandler {
    pub fn new(
        accounts: Arc<dyn AccountRepository>,
        origins: Arc<dyn TrialOriginRepository>,
        analytics: AnalyticsDispatcher,
        policy: EntitlementPolicy,
    ) -> Self {
        Self {
            accounts,
            origins,
            analytics,
            policy,
        }
    }

    pub async fn handle(&self, cmd: StartTrialCommand) -> Result<StartTrialResult, EntitlementError> {
        let now = Timestamp::now();

        // 1. Origin gate
        if self.origin_claimed_by_other(&cmd).await {
            tracing::info!(
                client_id = %cmd.client_id,
                origin = %cmd.origin,
                "Trial refused: origin already claimed"
            );
            return Err(EntitlementError::TrialAlreadyUsed);
        }

        // 2. An exhausted trial cannot be restarted
        if let Some(existing) = self.accounts.find(&cmd.client_id).await? {
            if existing.trial_exhausted() {
                tracing::info!(client_id = %cmd.client_id, "Trial refused: already exhausted");
                return Err(EntitlementError::TrialAlreadyUsed);
            }
        }

        // 3. Grant (or reset) the allowance
        let account = self
            .accounts
            .start_trial(&cmd.client_id, &self.policy, now)
            .await?;

        // 4. Best-effort side effects
        self.register_origin(&cmd, now).await;
        self.analytics.dispatch(
            AnalyticsEvent::new(AnalyticsEventType::TrialStarted, cmd.client_id.clone())
                .with_metadata(json!({ "origin": cmd.origin.as_str() })),
        );

        let expires_at = account
            .trial_expires_at
            .unwrap_or_else(|| now.add_days(self.policy.trial_window_days));

        tracing::info!(
            client_id = %cmd.client_id,
            messages_left = account.trial_messages_left,
            "Trial started"
        );

        Ok(StartTrialResult {
            messages_left: account.trial_messages_left,
            expires_at,
            account,
        })
    }

    async fn origin_claimed_by_other(&self, cmd: &StartTrialCommand) -> bool {
        if self.policy.ip_gate == IpGate::Off || !cmd.origin.is_known() {
            return false;
        }

        match self.origins.find(&cmd.origin).await {
            Ok(Some(record)) => record.claimed_by_other(&cmd.client_id),
            Ok(None) => false,
            Err(e) => {
                // The gate is abuse mitigation only; an unreadable gate lets the trial through.
                tracing::warn!(origin = %cmd.origin, error = %e, "Trial origin lookup failed");
                false
            }
        }
    }

    async fn register_origin(&self, cmd: &StartTrialCommand, now: Timestamp) {
        if !cmd.origin.is_known() {
            return;
        }

        let record = TrialOriginRecord::new(cmd.origin.clone(), cmd.client_id.clone(), now);
        if let Err(e) = self.origins.register(&record).await {
            tracing::warn!(
                client_id = %cmd.client_id,
                origin = %cmd.origin,
                error = %e,
                "Failed to register trial origin"
            );
        }
    }
}
