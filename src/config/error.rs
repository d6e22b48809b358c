//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid body size limit")]
    InvalidBodyLimit,

    #[error("Invalid database URL format")]
    InvalidDatabaseUrl,

    #[error("Pool min_connections exceeds max_connections")]
    InvalidPoolSize,

    #[error("Pool size exceeds maximum allowed (100)")]
    PoolSizeTooLarge,

    #[error("In-memory storage is not allowed in production")]
    MemoryBackendInProduction,

    #[error("Invalid Stripe API key format")]
    InvalidStripeKey,

    #[error("Invalid Stripe webhook secret format")]
    InvalidStripeWebhookSecret,

    #[error("Success URL must carry the {{CHECKOUT_SESSION_ID}} placeholder")]
    InvalidSuccessUrl,

    #[error("Promotional charge must be positive")]
    InvalidPromoAmount,

    #[error("Invalid sampling temperature")]
    InvalidTemperature,

    #[error("Trial allowance must be positive")]
    InvalidTrialAllowance,

    #[error("Entitlement periods must be positive")]
    InvalidPeriod,

    #[error("Generator timeout must be shorter than the request timeout")]
    GeneratorTimeoutTooLong,
}
