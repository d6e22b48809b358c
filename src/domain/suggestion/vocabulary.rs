//! Modes, tones and request context for suggestion generation.

use std::fmt;
use std::str::FromStr;

use crate::domain::entitlement::EntitlementError;

/// What the user wants help with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    /// Answer a message the user received.
    Reply,
    /// Open a conversation.
    Initiate,
    /// Push a stalled conversation forward.
    Tension,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Reply, Mode::Initiate, Mode::Tension];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Reply => "reply",
            Mode::Initiate => "initiate",
            Mode::Tension => "tension",
        }
    }
}

impl FromStr for Mode {
    type Err = EntitlementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reply" => Ok(Mode::Reply),
            "initiate" => Ok(Mode::Initiate),
            "tension" => Ok(Mode::Tension),
            other => Err(EntitlementError::invalid_parameter(
                "invalid_mode",
                format!("Invalid mode parameter: '{}'", other),
            )),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Voice the suggestions should carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tone {
    Casual,
    Provocative,
    Playful,
    Indifferent,
    Romantic,
    Funny,
}

impl Tone {
    pub const ALL: [Tone; 6] = [
        Tone::Casual,
        Tone::Provocative,
        Tone::Playful,
        Tone::Indifferent,
        Tone::Romantic,
        Tone::Funny,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Casual => "casual",
            Tone::Provocative => "provocative",
            Tone::Playful => "playful",
            Tone::Indifferent => "indifferent",
            Tone::Romantic => "romantic",
            Tone::Funny => "funny",
        }
    }
}

impl FromStr for Tone {
    type Err = EntitlementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "casual" => Ok(Tone::Casual),
            "provocative" => Ok(Tone::Provocative),
            "playful" => Ok(Tone::Playful),
            "indifferent" => Ok(Tone::Indifferent),
            "romantic" => Ok(Tone::Romantic),
            "funny" => Ok(Tone::Funny),
            other => Err(EntitlementError::invalid_parameter(
                "invalid_tone",
                format!("Invalid tone parameter: '{}'", other),
            )),
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Image attached to a request, normalized to a data URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData(String);

impl ImageData {
    /// Accepts a `data:image/...` URL or bare base64 (assumed JPEG).
    pub fn new(raw: impl Into<String>) -> Result<Self, EntitlementError> {
        let raw = raw.into();
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(EntitlementError::invalid_parameter(
                "invalid_image",
                "Image payload is empty",
            ));
        }
        if trimmed.starts_with("data:") {
            if !trimmed.starts_with("data:image/") || !trimmed.contains(";base64,") {
                return Err(EntitlementError::invalid_parameter(
                    "invalid_image",
                    "Image must be a base64 data URL",
                ));
            }
            return Ok(Self(trimmed.to_string()));
        }

        Ok(Self(format!("data:image/jpeg;base64,{}", trimmed)))
    }

    pub fn as_data_url(&self) -> &str {
        &self.0
    }
}

/// Everything the generator needs for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionContext {
    pub mode: Mode,
    pub tone: Tone,
    pub input: Option<String>,
    pub image: Option<ImageData>,
}

impl SuggestionContext {
    /// Builds a context. Blank input counts as absent; both may be absent.
    pub fn new(mode: Mode, tone: Tone, input: Option<String>, image: Option<ImageData>) -> Self {
        let input = input
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());

        Self {
            mode,
            tone,
            input,
            image,
        }
    }

    /// True when neither text nor image was supplied.
    pub fn is_blank(&self) -> bool {
        self.input.is_none() && self.image.is_none()
    }
}
