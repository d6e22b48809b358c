//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod analytics;
pub mod billing;
pub mod entitlement;

pub use analytics::{RecordAnalyticsCommand, RecordAnalyticsHandler};
pub use billing::{
    CheckoutSettings, ConfirmCheckoutCommand, ConfirmCheckoutHandler, ConfirmCheckoutResult,
    CreateCheckoutCommand, CreateCheckoutHandler, CreateCheckoutResult,
    CreatePortalSessionCommand, CreatePortalSessionHandler, CreatePortalSessionResult,
    CreatePromoCheckoutHandler, HandlePaymentWebhookCommand, HandlePaymentWebhookHandler,
    HandlePaymentWebhookResult,
};
pub use entitlement::{
    CheckTrialHandler, CheckTrialQuery, CheckTrialResult, GenerateSuggestionsCommand,
    GenerateSuggestionsHandler, GenerateSuggestionsResult, GetStatusHandler, GetStatusQuery,
    GetStatusResult, GrantPremiumCommand, GrantPremiumHandler, GrantPremiumResult,
    StartTrialCommand, StartTrialHandler, StartTrialResult,
};
