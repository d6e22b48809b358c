//! Network origin bookkeeping for trial starts.

use std::fmt;

use crate::domain::foundation::{ClientId, Timestamp};

const UNKNOWN: &str = "unknown";

/// Network address a request originated from, or `unknown`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OriginAddress(String);

impl OriginAddress {
    /// Builds an origin from a raw header value. Blank input becomes `unknown`.
    pub fn new(raw: impl AsRef<str>) -> Self {
        let trimmed = raw.as_ref().trim();
        if trimmed.is_empty() {
            Self::unknown()
        } else {
            Self(trimmed.to_string())
        }
    }

    pub fn unknown() -> Self {
        Self(UNKNOWN.to_string())
    }

    /// Unknown origins never participate in gating.
    pub fn is_known(&self) -> bool {
        self.0 != UNKNOWN
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OriginAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// First client to start a trial from a given origin. Never updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialOriginRecord {
    pub origin: OriginAddress,
    pub client_id: ClientId,
    pub first_seen: Timestamp,
}

impl TrialOriginRecord {
    pub fn new(origin: OriginAddress, client_id: ClientId, first_seen: Timestamp) -> Self {
        Self {
            origin,
            client_id,
            first_seen,
        }
    }

    /// True when the record belongs to someone other than `client_id`.
    pub fn claimed_by_other(&self, client_id: &ClientId) -> bool {
        &self.client_id != client_id
    }
}
