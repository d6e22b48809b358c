//! Uniform entitlement projection handed to clients.

use serde::Serialize;

use crate::domain::foundation::Timestamp;

use super::{ClientAccount, EntitlementPolicy};

/// Coarse state of an account at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntitlementState {
    /// Paid access, not yet lapsed.
    Premium,
    /// Trial units remain inside the trial window.
    Trial,
    /// Trial used up or window elapsed.
    Expired,
    /// No trial was ever started.
    Unclaimed,
}

/// Snapshot of a client's entitlement, rendered identically by every endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntitlementSnapshot {
    pub state: EntitlementState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages_left: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub used_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_left: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub premium_until: Option<Timestamp>,
}

impl EntitlementSnapshot {
    /// View reported for a client with no stored record.
    pub fn unclaimed(policy: &EntitlementPolicy) -> Self {
        Self {
            state: EntitlementState::Unclaimed,
            messages_left: Some(policy.trial_allowance),
            used_count: Some(0),
            limit: Some(policy.trial_allowance),
            expires_at: None,
            days_left: None,
            premium_until: None,
        }
    }

    /// Projects a stored account.
    pub fn for_account(account: &ClientAccount, policy: &EntitlementPolicy, now: Timestamp) -> Self {
        let premium = account.is_premium_active(now);

        let state = if premium {
            EntitlementState::Premium
        } else if account.trial_active(now) {
            EntitlementState::Trial
        } else if account.trial_expires_at.is_none() && account.used_count == 0 {
            EntitlementState::Unclaimed
        } else {
            EntitlementState::Expired
        };

        Self {
            state,
            messages_left: Some(account.trial_messages_left),
            used_count: Some(account.used_count),
            limit: Some(policy.trial_allowance),
            expires_at: account.trial_expires_at,
            days_left: account.premium_days_left(now),
            premium_until: if premium { account.premium_until } else { None },
        }
    }

    /// Paywall view: allowance forced to zero, counters kept.
    pub fn paywall(account: &ClientAccount, policy: &EntitlementPolicy, now: Timestamp) -> Self {
        let mut snapshot = Self::for_account(account, policy, now);
        snapshot.state = EntitlementState::Expired;
        snapshot.messages_left = Some(0);
        snapshot
    }

    pub fn is_premium(&self) -> bool {
        self.state == EntitlementState::Premium
    }
}
