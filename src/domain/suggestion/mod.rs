//! Suggestion module - vocabulary and output handling for the generator.

mod parse;
mod vocabulary;

pub use parse::{parse_suggestions, ParsedSuggestions, FALLBACK_SUGGESTION};
pub use vocabulary::{ImageData, Mode, SuggestionContext, Tone};
