//! Entitlement module - trial and premium state machine.
//!
//! A client may perform a paid action when it holds an unexpired premium
//! grant, or when it has trial units left inside its trial window.

mod account;
mod errors;
mod policy;
mod snapshot;
mod trial_origin;

pub use account::ClientAccount;
pub use errors::{EntitlementError, PaywallReason};
pub use policy::{
    EntitlementPolicy, IpGate, DEFAULT_GENERATOR_TIMEOUT_SECS, DEFAULT_MAX_SUGGESTIONS,
    DEFAULT_PREMIUM_PERIOD_DAYS, DEFAULT_TRIAL_ALLOWANCE, DEFAULT_TRIAL_WINDOW_DAYS,
};
pub use snapshot::{EntitlementSnapshot, EntitlementState};
pub use trial_origin::{OriginAddress, TrialOriginRecord};
