//! SuggestionGenerator port - the AI capability behind paid generations.
//!
//! The generator is opaque: it receives mode, tone and context and returns
//! raw text that the caller parses. Prompt wording is the adapter's concern.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::suggestion::SuggestionContext;

/// Port for producing raw suggestion text.
#[async_trait]
pub trait SuggestionGenerator: Send + Sync {
    /// Generate raw output for the given context.
    ///
    /// Callers bound this with their own timeout.
    async fn generate(&self, context: &SuggestionContext) -> Result<String, GeneratorError>;

    /// Short provider name for logs.
    fn name(&self) -> &'static str;
}

/// Errors from the generator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneratorError {
    /// Rate limited by provider.
    #[error("rate limited")]
    RateLimited,

    /// API key or authentication failed.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Provider is unavailable.
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// Network error during request.
    #[error("network error: {0}")]
    Network(String),

    /// Failed to parse provider envelope.
    #[error("parse error: {0}")]
    Parse(String),

    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
}

impl GeneratorError {
    /// Whether a retry inside the same request may help.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            GeneratorError::RateLimited | GeneratorError::Unavailable(_) | GeneratorError::Network(_)
        )
    }
}
