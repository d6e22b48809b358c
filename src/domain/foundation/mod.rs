//! Foundation module - Shared domain primitives.
//!
//! Contains value objects, identifiers, and error types
//! that form the vocabulary of the Xaveco domain.

mod errors;
mod ids;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{ClientId, CLIENT_ID_MAX_LEN, CLIENT_ID_PREFIX};
pub use timestamp::Timestamp;
