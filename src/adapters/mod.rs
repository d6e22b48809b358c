//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `postgres` - sqlx-backed stores
//! - `memory` - process-local stores for development and tests
//! - `stripe` - Stripe REST payment provider
//! - `ai` - OpenAI suggestion generator
//! - `analytics` - non-blocking event dispatch
//! - `http` - axum REST surface

pub mod ai;
pub mod analytics;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod stripe;

pub use analytics::AnalyticsDispatcher;
pub use http::{app_router, AppState};
