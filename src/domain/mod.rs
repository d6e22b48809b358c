//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, errors)
//! - `entitlement` - Trial and premium state machine
//! - `suggestion` - Generator vocabulary and output parsing
//! - `billing` - Stripe events, signature verification, audit records
//! - `analytics` - Best-effort product events

pub mod analytics;
pub mod billing;
pub mod entitlement;
pub mod foundation;
pub mod suggestion;
