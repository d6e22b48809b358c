//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::{Timestamp, ValidationError};

/// Prefix carried by identifiers minted through [`ClientId::generate`].
pub const CLIENT_ID_PREFIX: &str = "client_";

/// Maximum accepted identifier length in bytes.
pub const CLIENT_ID_MAX_LEN: usize = 128;

/// Opaque per-device identifier supplied by the caller.
///
/// The server treats the value as an opaque key: it only requires the value
/// to be non-empty, bounded, and free of control characters. Identifiers
/// created by [`ClientId::generate`] additionally follow the
/// `client_<unix-millis>_<random>` shape that device-side resolvers check
/// before reusing a stored value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClientId(String);

impl ClientId {
    /// Creates a ClientId, trimming surrounding whitespace.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        let trimmed = id.trim();

        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("client_id"));
        }
        if trimmed.len() > CLIENT_ID_MAX_LEN {
            return Err(ValidationError::too_long("client_id", CLIENT_ID_MAX_LEN));
        }
        if trimmed.chars().any(char::is_control) {
            return Err(ValidationError::invalid_format(
                "client_id",
                "contains control characters",
            ));
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Mints a fresh identifier in the `client_<unix-millis>_<random>` format.
    pub fn generate() -> Self {
        let random = Uuid::new_v4().simple().to_string();
        Self(format!(
            "{}{}_{}",
            CLIENT_ID_PREFIX,
            Timestamp::now().as_unix_millis(),
            &random[..9]
        ))
    }

    /// Returns true when the identifier has the shape produced by [`ClientId::generate`].
    pub fn is_generated_format(&self) -> bool {
        let Some(rest) = self.0.strip_prefix(CLIENT_ID_PREFIX) else {
            return false;
        };
        let Some((millis, random)) = rest.split_once('_') else {
            return false;
        };

        !millis.is_empty()
            && millis.chars().all(|c| c.is_ascii_digit())
            && !random.is_empty()
            && random.chars().all(|c| c.is_ascii_alphanumeric())
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ClientId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ClientId {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ClientId> for String {
    fn from(id: ClientId) -> Self {
        id.0
    }
}
