//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Command handlers mutate entitlement or billing state; query handlers only
//! read it.

pub mod handlers;

pub use handlers::{
    // Entitlement handlers
    CheckTrialHandler, CheckTrialQuery, CheckTrialResult,
    GenerateSuggestionsCommand, GenerateSuggestionsHandler, GenerateSuggestionsResult,
    GetStatusHandler, GetStatusQuery, GetStatusResult,
    GrantPremiumCommand, GrantPremiumHandler, GrantPremiumResult,
    StartTrialCommand, StartTrialHandler, StartTrialResult,
    // Billing handlers
    CheckoutSettings,
    ConfirmCheckoutCommand, ConfirmCheckoutHandler, ConfirmCheckoutResult,
    CreateCheckoutCommand, CreateCheckoutHandler, CreateCheckoutResult,
    CreatePortalSessionCommand, CreatePortalSessionHandler, CreatePortalSessionResult,
    CreatePromoCheckoutHandler,
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, HandlePaymentWebhookResult,
    // Analytics handlers
    RecordAnalyticsCommand, RecordAnalyticsHandler,
};
