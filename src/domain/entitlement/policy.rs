//! Entitlement policy constants.

use serde::Deserialize;
use std::time::Duration;

/// Default number of paid actions granted by a trial.
pub const DEFAULT_TRIAL_ALLOWANCE: u32 = 2;

/// Default trial window length in days.
pub const DEFAULT_TRIAL_WINDOW_DAYS: i64 = 2;

/// Default premium period granted per completed checkout, in days.
pub const DEFAULT_PREMIUM_PERIOD_DAYS: i64 = 7;

/// Default cap on returned suggestions.
pub const DEFAULT_MAX_SUGGESTIONS: usize = 4;

/// Default budget for one suggestion generator call, in seconds.
pub const DEFAULT_GENERATOR_TIMEOUT_SECS: u64 = 25;

/// How trial starts are gated on the caller's network origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpGate {
    /// An origin already claimed by another client blocks new trials.
    #[default]
    Strict,
    /// Origins are recorded but never block.
    Off,
}

/// Tunable rules of the trial/premium state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitlementPolicy {
    pub trial_allowance: u32,
    pub trial_window_days: i64,
    pub premium_period_days: i64,
    pub max_suggestions: usize,
    pub generator_timeout: Duration,
    pub ip_gate: IpGate,
    /// Give the trial unit back when the generator fails after the debit.
    pub refund_on_upstream_failure: bool,
}

impl Default for EntitlementPolicy {
    fn default() -> Self {
        Self {
            trial_allowance: DEFAULT_TRIAL_ALLOWANCE,
            trial_window_days: DEFAULT_TRIAL_WINDOW_DAYS,
            premium_period_days: DEFAULT_PREMIUM_PERIOD_DAYS,
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
            generator_timeout: Duration::from_secs(DEFAULT_GENERATOR_TIMEOUT_SECS),
            ip_gate: IpGate::Strict,
            refund_on_upstream_failure: false,
        }
    }
}
