//! Analytics module - best-effort product events.

mod event;

pub use event::{AnalyticsEvent, AnalyticsEventType};
