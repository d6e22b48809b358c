//! Suggestion generator adapters.
//!
//! ## Available Adapters
//!
//! - `OpenAIGenerator` - OpenAI chat completions with vision input
//! - `MockSuggestionGenerator` - Configurable mock for testing

mod mock_generator;
mod openai_generator;
mod prompts;

pub use mock_generator::MockSuggestionGenerator;
pub use openai_generator::{OpenAIConfig, OpenAIGenerator};
