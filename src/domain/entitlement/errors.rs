//! Entitlement-specific error types.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | InvalidParameter | 400 |
//! | MissingClientId | 400 (401 on authenticated routes) |
//! | TrialExpired | 402 |
//! | TrialAlreadyUsed | 403 |
//! | PromoAlreadyUsed | 400 |
//! | AlreadyPremium | 400 |
//! | NotPremium | 403 |
//! | AccountNotFound | 404 |
//! | NoSubscription | 404 |
//! | NoClientReference | 400 |
//! | InvalidSession | 400 |
//! | Unauthorized | 401 |
//! | Upstream | 500 |
//! | Store | 500 |

use thiserror::Error;

use crate::domain::foundation::{DomainError, ValidationError};

use super::EntitlementSnapshot;

/// Why a paid action was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaywallReason {
    /// No trial was ever started for this client.
    NotStarted,
    /// The allowance was used up.
    Exhausted,
    /// The trial window elapsed.
    Expired,
}

impl PaywallReason {
    /// Wire code the client branches on.
    pub fn code(&self) -> &'static str {
        match self {
            PaywallReason::Exhausted => "trial_exhausted",
            PaywallReason::NotStarted | PaywallReason::Expired => "trial_expired",
        }
    }
}

/// Errors surfaced by the entitlement operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntitlementError {
    #[error("{message}")]
    InvalidParameter { code: &'static str, message: String },

    #[error("Client identifier is required")]
    MissingClientId,

    #[error("Trial is no longer available")]
    TrialExpired {
        snapshot: EntitlementSnapshot,
        reason: PaywallReason,
    },

    #[error("Trial already used")]
    TrialAlreadyUsed,

    #[error("Promotional checkout already used")]
    PromoAlreadyUsed,

    #[error("Client is already premium")]
    AlreadyPremium,

    #[error("Client is not premium")]
    NotPremium,

    #[error("Account not found")]
    AccountNotFound,

    #[error("No subscription linked to this client")]
    NoSubscription,

    #[error("Checkout session carries no client reference")]
    NoClientReference,

    #[error("Invalid checkout session: {0}")]
    InvalidSession(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Upstream service failed: {0}")]
    Upstream(String),

    #[error("Store failure: {0}")]
    Store(String),
}

impl EntitlementError {
    pub fn invalid_parameter(code: &'static str, message: impl Into<String>) -> Self {
        EntitlementError::InvalidParameter {
            code,
            message: message.into(),
        }
    }

    pub fn trial_expired(snapshot: EntitlementSnapshot, reason: PaywallReason) -> Self {
        EntitlementError::TrialExpired { snapshot, reason }
    }

    pub fn invalid_session(message: impl Into<String>) -> Self {
        EntitlementError::InvalidSession(message.into())
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        EntitlementError::Upstream(message.into())
    }

    pub fn store(message: impl Into<String>) -> Self {
        EntitlementError::Store(message.into())
    }

    /// Returns the wire code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            EntitlementError::InvalidParameter { code, .. } => code,
            EntitlementError::MissingClientId => "missing_client_id",
            EntitlementError::TrialExpired { reason, .. } => reason.code(),
            EntitlementError::TrialAlreadyUsed => "trial_already_used",
            EntitlementError::PromoAlreadyUsed => "promo_already_used",
            EntitlementError::AlreadyPremium => "already_premium",
            EntitlementError::NotPremium => "not_premium",
            EntitlementError::AccountNotFound => "account_not_found",
            EntitlementError::NoSubscription => "no_subscription",
            EntitlementError::NoClientReference => "no_client_reference",
            EntitlementError::InvalidSession(_) => "invalid_session",
            EntitlementError::Unauthorized => "unauthorized",
            EntitlementError::Upstream(_) => "upstream_error",
            EntitlementError::Store(_) => "internal_error",
        }
    }

    /// Returns a user-safe message. Infrastructure detail is withheld.
    pub fn message(&self) -> String {
        match self {
            EntitlementError::InvalidParameter { message, .. } => message.clone(),
            EntitlementError::TrialExpired { .. } => {
                "Your free trial has ended. Subscribe to keep generating suggestions.".to_string()
            }
            EntitlementError::TrialAlreadyUsed => {
                "A free trial was already used. Subscribe to continue.".to_string()
            }
            EntitlementError::InvalidSession(_) => "Invalid checkout session".to_string(),
            EntitlementError::Upstream(_) => {
                "The service is temporarily unavailable. Please try again.".to_string()
            }
            EntitlementError::Store(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }

    /// Returns true if the caller may retry the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EntitlementError::Upstream(_) | EntitlementError::Store(_))
    }

    /// Expected business outcome rather than a system failure.
    pub fn is_business_outcome(&self) -> bool {
        !matches!(self, EntitlementError::Upstream(_) | EntitlementError::Store(_))
    }
}

impl From<DomainError> for EntitlementError {
    fn from(err: DomainError) -> Self {
        EntitlementError::Store(err.to_string())
    }
}

impl From<ValidationError> for EntitlementError {
    fn from(err: ValidationError) -> Self {
        EntitlementError::invalid_parameter("validation_failed", err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entitlement::EntitlementPolicy;
    use crate::domain::foundation::ErrorCode;

    #[test]
    fn paywall_reason_codes() {
        assert_eq!(PaywallReason::Exhausted.code(), "trial_exhausted");
        assert_eq!(PaywallReason::Expired.code(), "trial_expired");
        assert_eq!(PaywallReason::NotStarted.code(), "trial_expired");
    }

    #[test]
    fn trial_expired_code_follows_reason() {
        let snapshot = EntitlementSnapshot::unclaimed(&EntitlementPolicy::default());
        let err = EntitlementError::trial_expired(snapshot, PaywallReason::Exhausted);
        assert_eq!(err.code(), "trial_exhausted");
        assert!(err.is_business_outcome());
        assert!(!err.is_retryable());
    }

    #[test]
    fn store_error_hides_detail() {
        let err: EntitlementError =
            DomainError::new(ErrorCode::DatabaseError, "connection refused at 10.0.0.3").into();
        assert_eq!(err.code(), "internal_error");
        assert_eq!(err.message(), "Internal server error");
        assert!(err.is_retryable());
    }

    #[test]
    fn upstream_error_hides_detail() {
        let err = EntitlementError::upstream("openai 503: overloaded");
        assert_eq!(err.code(), "upstream_error");
        assert!(!err.message().contains("openai"));
    }

    #[test]
    fn validation_error_converts_to_invalid_parameter() {
        let err: EntitlementError = ValidationError::empty_field("client_id").into();
        assert_eq!(err.code(), "validation_failed");
        assert!(err.message().contains("client_id"));
    }

    #[test]
    fn business_errors_display_plain_messages() {
        assert_eq!(EntitlementError::PromoAlreadyUsed.message(), "Promotional checkout already used");
        assert_eq!(EntitlementError::AlreadyPremium.code(), "already_premium");
    }
}
