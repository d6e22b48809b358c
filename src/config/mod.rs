//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables using the
//! `config` and `dotenvy` crates. Variables carry the `XAVECO` prefix and
//! nested values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use xaveco::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}", config.server.socket_addr());
//! ```

mod ai;
mod database;
mod entitlement;
mod error;
mod payment;
mod server;

pub use ai::AiConfig;
pub use database::{DatabaseConfig, StorageBackend};
pub use entitlement::EntitlementConfig;
pub use error::{ConfigError, ValidationError};
pub use payment::PaymentConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, admin token)
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage configuration (PostgreSQL or in-memory)
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Payment configuration (Stripe)
    #[serde(default)]
    pub payment: PaymentConfig,

    /// Suggestion generator configuration (OpenAI)
    #[serde(default)]
    pub ai: AiConfig,

    /// Trial and premium rules
    #[serde(default)]
    pub entitlement: EntitlementConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `XAVECO` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `XAVECO__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `XAVECO__ENTITLEMENT__IP_GATE=off` -> `entitlement.ip_gate = off`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("XAVECO")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` for the first invalid section.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate(self.is_production())?;
        self.payment.validate()?;
        self.ai.validate()?;
        self.entitlement
            .validate(self.server.request_timeout_secs)?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entitlement::IpGate;
    use std::env;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "XAVECO__DATABASE__URL",
        "XAVECO__DATABASE__BACKEND",
        "XAVECO__AI__OPENAI_API_KEY",
        "XAVECO__PAYMENT__STRIPE_API_KEY",
        "XAVECO__PAYMENT__STRIPE_WEBHOOK_SECRET",
        "XAVECO__PAYMENT__WEEKLY_PRICE_ID",
        "XAVECO__SERVER__PORT",
        "XAVECO__SERVER__ENVIRONMENT",
        "XAVECO__ENTITLEMENT__IP_GATE",
        "XAVECO__ENTITLEMENT__REFUND_ON_UPSTREAM_FAILURE",
    ];

    /// Helper to set environment variables for testing
    fn set_minimal_env() {
        env::set_var("XAVECO__DATABASE__URL", "postgresql://test@localhost/test");
        env::set_var("XAVECO__AI__OPENAI_API_KEY", "sk-xxx");
        env::set_var("XAVECO__PAYMENT__STRIPE_API_KEY", "sk_test_xxx");
        env::set_var("XAVECO__PAYMENT__STRIPE_WEBHOOK_SECRET", "whsec_xxx");
        env::set_var("XAVECO__PAYMENT__WEEKLY_PRICE_ID", "price_weekly");
    }

    /// Helper to clear environment variables after testing
    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_ok(), "Failed to load config: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.database.url, "postgresql://test@localhost/test");
        assert_eq!(config.payment.weekly_price_id, "price_weekly");
    }

    #[test]
    fn test_validate_full_config() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custom_port_and_policy_knobs() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("XAVECO__SERVER__PORT", "3000");
        env::set_var("XAVECO__ENTITLEMENT__IP_GATE", "off");
        env::set_var("XAVECO__ENTITLEMENT__REFUND_ON_UPSTREAM_FAILURE", "true");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.server.port, 3000);
        let policy = config.entitlement.to_policy();
        assert_eq!(policy.ip_gate, IpGate::Off);
        assert!(policy.refund_on_upstream_failure);
    }

    #[test]
    fn test_memory_backend_refused_in_production() {
        let _guard = ENV_MUTEX.lock().unwrap();
        set_minimal_env();
        env::set_var("XAVECO__DATABASE__BACKEND", "memory");
        env::set_var("XAVECO__SERVER__ENVIRONMENT", "production");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert!(config.is_production());
        assert_eq!(
            config.validate(),
            Err(ValidationError::MemoryBackendInProduction)
        );
    }

    #[test]
    fn test_missing_payment_keys_fail_validation() {
        let config = AppConfig {
            database: DatabaseConfig {
                backend: StorageBackend::Memory,
                ..Default::default()
            },
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("STRIPE_API_KEY"))
        );
    }
}
