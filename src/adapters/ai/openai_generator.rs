//! OpenAI generator - SuggestionGenerator backed by chat completions.
//!
//! # Configuration
//!
//! ```ignore
//! let config = OpenAIConfig::new(api_key)
//!     .with_model("gpt-4o-mini")
//!     .with_base_url("https://api.openai.com/v1");
//!
//! let generator = OpenAIGenerator::new(config)?;
//! ```
//!
//! The caller bounds the whole call with its own timeout, so retries here
//! only ever spend the budget the caller granted.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tokio::time::sleep;

use crate::domain::entitlement::DEFAULT_MAX_SUGGESTIONS;
use crate::domain::suggestion::SuggestionContext;
use crate::ports::{GeneratorError, SuggestionGenerator};

use super::prompts::{system_prompt, user_prompt};

/// Base delay for exponential backoff between retries.
const BACKOFF_BASE_MS: u64 = 500;

/// Configuration for the OpenAI generator.
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API key for authentication.
    api_key: SecretString,
    /// Model to use.
    pub model: String,
    /// Base URL for the API (default: https://api.openai.com/v1).
    pub base_url: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Per-attempt HTTP timeout.
    pub timeout: Duration,
    /// Maximum retries on transient failures.
    pub max_retries: u32,
    /// Upper bound on suggestions requested in the prompt.
    pub max_suggestions: usize,
}

impl OpenAIConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: SecretString::new(api_key.into()),
            model: "gpt-4o-mini".to_string(),
            base_url: "https://api.openai.com/v1".to_string(),
            temperature: 0.8,
            timeout: Duration::from_secs(25),
            max_retries: 2,
            max_suggestions: DEFAULT_MAX_SUGGESTIONS,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_max_suggestions(mut self, max: usize) -> Self {
        self.max_suggestions = max;
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// OpenAI chat-completions generator.
pub struct OpenAIGenerator {
    config: OpenAIConfig,
    client: Client,
}

impl OpenAIGenerator {
    /// Creates a new generator with the given configuration.
    pub fn new(config: OpenAIConfig) -> Result<Self, GeneratorError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GeneratorError::Unavailable(format!("HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.config.base_url)
    }

    /// Converts the context to OpenAI's request format.
    fn to_openai_request(&self, context: &SuggestionContext) -> OpenAIRequest {
        let text = user_prompt(context, self.config.max_suggestions);

        let user_content = match &context.image {
            Some(image) => UserContent::Parts(vec![
                ContentPart::Text { text },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: image.as_data_url().to_string(),
                    },
                },
            ]),
            None => UserContent::Text(text),
        };

        OpenAIRequest {
            model: self.config.model.clone(),
            messages: vec![
                OpenAIMessage {
                    role: "system",
                    content: UserContent::Text(system_prompt(
                        context.mode,
                        context.tone,
                        self.config.max_suggestions,
                    )),
                },
                OpenAIMessage {
                    role: "user",
                    content: user_content,
                },
            ],
            temperature: self.config.temperature,
        }
    }

    async fn send_request(&self, request: &OpenAIRequest) -> Result<Response, GeneratorError> {
        self.client
            .post(self.completions_url())
            .header("Authorization", format!("Bearer {}", self.config.api_key()))
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GeneratorError::Timeout {
                        timeout_secs: self.config.timeout.as_secs(),
                    }
                } else if e.is_connect() {
                    GeneratorError::Network(format!("Connection failed: {}", e))
                } else {
                    GeneratorError::Network(e.to_string())
                }
            })
    }

    async fn parse_response(response: Response) -> Result<String, GeneratorError> {
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(map_status(status.as_u16(), &body));
        }

        let parsed: OpenAIResponse = response
            .json()
            .await
            .map_err(|e| GeneratorError::Parse(format!("Failed to parse response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| GeneratorError::Parse("No choices in response".to_string()))
    }
}

/// Maps a non-success status to a generator error.
fn map_status(status: u16, body: &str) -> GeneratorError {
    match status {
        401 | 403 => GeneratorError::AuthenticationFailed,
        429 => GeneratorError::RateLimited,
        500..=599 => GeneratorError::Unavailable(format!("Server error {}", status)),
        _ => GeneratorError::Unavailable(format!(
            "Unexpected status {}: {}",
            status,
            body.chars().take(200).collect::<String>()
        )),
    }
}

#[async_trait]
impl SuggestionGenerator for OpenAIGenerator {
    async fn generate(&self, context: &SuggestionContext) -> Result<String, GeneratorError> {
        let request = self.to_openai_request(context);
        let mut retry_count = 0;

        loop {
            let result = match self.send_request(&request).await {
                Ok(response) => Self::parse_response(response).await,
                Err(err) => Err(err),
            };

            match result {
                Ok(content) => return Ok(content),
                Err(err) if err.is_retryable() && retry_count < self.config.max_retries => {
                    tracing::debug!(error = %err, retry = retry_count + 1, "Retrying generator call");
                }
                Err(err) => return Err(err),
            }

            // Exponential backoff: 0.5s, 1s, 2s, ...
            sleep(Duration::from_millis(BACKOFF_BASE_MS << retry_count)).await;
            retry_count += 1;
        }
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// OpenAI API Types
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: &'static str,
    content: UserContent,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum UserContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    #[serde(default)]
    content: Option<String>,
}
