//! Analytics handlers.

mod record_event;

pub use record_event::{RecordAnalyticsCommand, RecordAnalyticsHandler};
