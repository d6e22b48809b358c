//! Analytics adapters.
//!
//! Best-effort event dispatch in front of an `AnalyticsSink`.

mod dispatcher;

pub use dispatcher::AnalyticsDispatcher;
