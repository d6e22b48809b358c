//! Non-blocking analytics dispatch.
//!
//! Events are recorded on a detached task. Sink failures are logged at
//! `debug` and then dropped: callers never wait on analytics and never see
//! its errors.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::domain::analytics::AnalyticsEvent;
use crate::ports::AnalyticsSink;

/// Fire-and-forget front for an analytics sink.
#[derive(Clone)]
pub struct AnalyticsDispatcher {
    sink: Arc<dyn AnalyticsSink>,
}

impl AnalyticsDispatcher {
    pub fn new(sink: Arc<dyn AnalyticsSink>) -> Self {
        Self { sink }
    }

    /// Records the event in the background.
    ///
    /// The handle is only useful to tests that want to wait for the write;
    /// production callers drop it.
    pub fn dispatch(&self, event: AnalyticsEvent) -> JoinHandle<()> {
        let sink = Arc::clone(&self.sink);
        tokio::spawn(async move {
            if let Err(e) = sink.record(&event).await {
                tracing::debug!(
                    event_type = %event.event_type,
                    client_id = %event.client_id,
                    error = %e,
                    "Analytics event discarded"
                );
            }
        })
    }
}
