//! Mock suggestion generator for testing.
//!
//! # Features
//!
//! - Pre-configured responses (consumed in order, the last one repeats)
//! - Simulated delays for timeout testing
//! - Error injection
//! - Call tracking
//!
//! # Example
//!
//! ```ignore
//! let generator = MockSuggestionGenerator::new()
//!     .with_response(r#"["oi", "tudo bem?"]"#)
//!     .with_delay(Duration::from_millis(100));
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::sleep;

use crate::domain::suggestion::SuggestionContext;
use crate::ports::{GeneratorError, SuggestionGenerator};

/// Default output: a well-formed array of two suggestions.
const DEFAULT_RESPONSE: &str = r#"["e aí, bora marcar algo?", "adorei essa foto, onde foi?"]"#;

/// Mock generator for testing.
#[derive(Debug, Clone, Default)]
pub struct MockSuggestionGenerator {
    /// Pre-configured results (consumed in order).
    responses: Arc<Mutex<VecDeque<Result<String, GeneratorError>>>>,
    /// Simulated latency per request.
    delay: Duration,
    /// Contexts received, for verification.
    calls: Arc<Mutex<Vec<SuggestionContext>>>,
}

impl MockSuggestionGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful raw response.
    pub fn with_response(self, raw: impl Into<String>) -> Self {
        lock(&self.responses).push_back(Ok(raw.into()));
        self
    }

    /// Queue an error.
    pub fn with_error(self, error: GeneratorError) -> Self {
        lock(&self.responses).push_back(Err(error));
        self
    }

    /// Sleep this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Number of generate calls made.
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Contexts passed to generate, in order.
    pub fn calls(&self) -> Vec<SuggestionContext> {
        lock(&self.calls).clone()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl SuggestionGenerator for MockSuggestionGenerator {
    async fn generate(&self, context: &SuggestionContext) -> Result<String, GeneratorError> {
        lock(&self.calls).push(context.clone());

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        let mut responses = lock(&self.responses);
        match responses.len() {
            0 => Ok(DEFAULT_RESPONSE.to_string()),
            1 => responses
                .front()
                .cloned()
                .unwrap_or_else(|| Ok(DEFAULT_RESPONSE.to_string())),
            _ => responses
                .pop_front()
                .unwrap_or_else(|| Ok(DEFAULT_RESPONSE.to_string())),
        }
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}
