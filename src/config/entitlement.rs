//! Entitlement policy configuration

use serde::Deserialize;
use std::time::Duration;

use crate::domain::entitlement::{
    EntitlementPolicy, IpGate, DEFAULT_GENERATOR_TIMEOUT_SECS, DEFAULT_MAX_SUGGESTIONS,
    DEFAULT_PREMIUM_PERIOD_DAYS, DEFAULT_TRIAL_ALLOWANCE, DEFAULT_TRIAL_WINDOW_DAYS,
};

use super::error::ValidationError;

/// Trial and premium knobs
#[derive(Debug, Clone, Deserialize)]
pub struct EntitlementConfig {
    #[serde(default = "default_trial_allowance")]
    pub trial_allowance: u32,

    #[serde(default = "default_trial_window_days")]
    pub trial_window_days: i64,

    #[serde(default = "default_premium_period_days")]
    pub premium_period_days: i64,

    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,

    /// Whole budget for one generation, retries included
    #[serde(default = "default_generator_timeout")]
    pub generator_timeout_secs: u64,

    #[serde(default)]
    pub ip_gate: IpGate,

    #[serde(default)]
    pub refund_on_upstream_failure: bool,
}

impl EntitlementConfig {
    pub fn to_policy(&self) -> EntitlementPolicy {
        EntitlementPolicy {
            trial_allowance: self.trial_allowance,
            trial_window_days: self.trial_window_days,
            premium_period_days: self.premium_period_days,
            max_suggestions: self.max_suggestions,
            generator_timeout: Duration::from_secs(self.generator_timeout_secs),
            ip_gate: self.ip_gate,
            refund_on_upstream_failure: self.refund_on_upstream_failure,
        }
    }

    /// Validate against the request timeout the generator must fit into
    pub fn validate(&self, request_timeout_secs: u64) -> Result<(), ValidationError> {
        if self.trial_allowance == 0 {
            return Err(ValidationError::InvalidTrialAllowance);
        }
        if self.trial_window_days <= 0 || self.premium_period_days <= 0 {
            return Err(ValidationError::InvalidPeriod);
        }
        if self.generator_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.generator_timeout_secs >= request_timeout_secs {
            return Err(ValidationError::GeneratorTimeoutTooLong);
        }
        Ok(())
    }
}

impl Default for EntitlementConfig {
    fn default() -> Self {
        Self {
            trial_allowance: default_trial_allowance(),
            trial_window_days: default_trial_window_days(),
            premium_period_days: default_premium_period_days(),
            max_suggestions: default_max_suggestions(),
            generator_timeout_secs: default_generator_timeout(),
            ip_gate: IpGate::default(),
            refund_on_upstream_failure: false,
        }
    }
}

fn default_trial_allowance() -> u32 {
    DEFAULT_TRIAL_ALLOWANCE
}

fn default_trial_window_days() -> i64 {
    DEFAULT_TRIAL_WINDOW_DAYS
}

fn default_premium_period_days() -> i64 {
    DEFAULT_PREMIUM_PERIOD_DAYS
}

fn default_max_suggestions() -> usize {
    DEFAULT_MAX_SUGGESTIONS
}

fn default_generator_timeout() -> u64 {
    DEFAULT_GENERATOR_TIMEOUT_SECS
}
