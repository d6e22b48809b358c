//! Entitlement handlers.
//!
//! ## Commands
//! - Starting (or resetting) a trial
//! - Generating suggestions behind the entitlement gate
//! - Granting premium manually
//!
//! ## Queries
//! - Status snapshot for the UI
//! - Legacy trial check

mod check_trial;
mod generate_suggestions;
mod get_status;
mod grant_premium;
mod start_trial;

// Commands
pub use generate_suggestions::{
    GenerateSuggestionsCommand, GenerateSuggestionsHandler, GenerateSuggestionsResult,
};
pub use grant_premium::{GrantPremiumCommand, GrantPremiumHandler, GrantPremiumResult};
pub use start_trial::{StartTrialCommand, StartTrialHandler, StartTrialResult};

// Queries
pub use check_trial::{CheckTrialHandler, CheckTrialQuery, CheckTrialResult};
pub use get_status::{GetStatusHandler, GetStatusQuery, GetStatusResult};
