//! ClientAccount aggregate - per-device entitlement record.
//!
//! Holds the trial counters, premium grant and payment linkage for one
//! client identifier. Every decision about whether a client may perform a
//! paid action is derived from this record plus the current time.

use serde::Serialize;

use crate::domain::foundation::{ClientId, Timestamp};

use super::{EntitlementPolicy, PaywallReason};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Per-device entitlement record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientAccount {
    pub client_id: ClientId,
    pub is_premium: bool,
    pub premium_until: Option<Timestamp>,
    pub trial_messages_left: u32,
    pub trial_start: Option<Timestamp>,
    pub trial_expires_at: Option<Timestamp>,
    pub used_count: u64,
    pub stripe_customer_id: Option<String>,
    pub promo_applied: bool,
    pub promo_type: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ClientAccount {
    /// Zero-allowance, non-premium record created on first contact.
    pub fn unclaimed(client_id: ClientId, now: Timestamp) -> Self {
        Self {
            client_id,
            is_premium: false,
            premium_until: None,
            trial_messages_left: 0,
            trial_start: None,
            trial_expires_at: None,
            used_count: 0,
            stripe_customer_id: None,
            promo_applied: false,
            promo_type: None,
            created_at: now,
            updated_at: now,
        }
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Queries
    // ════════════════════════════════════════════════════════════════════════════

    /// Premium flag re-validated against the expiry.
    pub fn is_premium_active(&self, now: Timestamp) -> bool {
        self.is_premium && self.premium_until.is_some_and(|until| now < until)
    }

    /// Trial units remain and the window is still open.
    pub fn trial_active(&self, now: Timestamp) -> bool {
        self.trial_messages_left > 0 && self.trial_expires_at.is_some_and(|expires| now < expires)
    }

    /// May this client perform a paid action right now.
    pub fn is_entitled(&self, now: Timestamp) -> bool {
        self.is_premium_active(now) || self.trial_active(now)
    }

    /// The trial was consumed down to zero at least once.
    pub fn trial_exhausted(&self) -> bool {
        self.trial_messages_left == 0 && self.used_count > 0
    }

    /// Why a non-entitled client is being turned away.
    pub fn paywall_reason(&self, now: Timestamp) -> PaywallReason {
        if self.trial_exhausted() {
            PaywallReason::Exhausted
        } else if self.trial_expires_at.is_none() {
            PaywallReason::NotStarted
        } else if self.trial_expires_at.is_some_and(|expires| now >= expires) {
            PaywallReason::Expired
        } else {
            PaywallReason::Exhausted
        }
    }

    /// Whole days of premium remaining, rounded up. `None` when not premium.
    pub fn premium_days_left(&self, now: Timestamp) -> Option<i64> {
        if !self.is_premium_active(now) {
            return None;
        }
        let until = self.premium_until?;
        let millis = until.duration_since(&now).num_milliseconds();
        Some((millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY)
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Transitions
    // ════════════════════════════════════════════════════════════════════════════

    /// Grants (or re-grants) the trial allowance and window.
    pub fn start_trial(&mut self, policy: &EntitlementPolicy, now: Timestamp) {
        self.trial_messages_left = policy.trial_allowance;
        self.trial_start = Some(now);
        self.trial_expires_at = Some(now.add_days(policy.trial_window_days));
        self.updated_at = now;
    }

    /// Debits one trial unit. Refused unless the trial is active.
    pub fn debit_trial(&mut self, now: Timestamp) -> Result<(), PaywallReason> {
        if !self.trial_active(now) {
            return Err(self.paywall_reason(now));
        }
        self.trial_messages_left = self.trial_messages_left.saturating_sub(1);
        self.used_count = self.used_count.saturating_add(1);
        self.updated_at = now;
        Ok(())
    }

    /// Returns one trial unit, never exceeding `cap`.
    pub fn credit_trial(&mut self, cap: u32, now: Timestamp) {
        self.trial_messages_left = self.trial_messages_left.saturating_add(1).min(cap);
        self.updated_at = now;
    }

    /// Grants premium until `until`, never shortening an existing grant.
    pub fn grant_premium(
        &mut self,
        until: Timestamp,
        stripe_customer_id: Option<String>,
        promo_type: Option<String>,
        now: Timestamp,
    ) {
        self.is_premium = true;
        self.premium_until = Some(match self.premium_until {
            Some(existing) if existing > until => existing,
            _ => until,
        });
        if stripe_customer_id.is_some() {
            self.stripe_customer_id = stripe_customer_id;
        }
        if let Some(promo) = promo_type {
            self.promo_applied = true;
            self.promo_type.get_or_insert(promo);
        }
        self.updated_at = now;
    }

    /// Clears the premium flag. Payment linkage stays.
    pub fn revoke_premium(&mut self, now: Timestamp) {
        self.is_premium = false;
        self.updated_at = now;
    }
}
