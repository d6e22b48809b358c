//! In-memory analytics sink.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::analytics::{AnalyticsEvent, AnalyticsEventType};
use crate::domain::foundation::DomainError;
use crate::ports::AnalyticsSink;

/// Keeps events in a vector. Used in development and tests.
#[derive(Default)]
pub struct InMemoryAnalyticsSink {
    events: RwLock<Vec<AnalyticsEvent>>,
}

impl InMemoryAnalyticsSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all recorded events.
    pub async fn events(&self) -> Vec<AnalyticsEvent> {
        self.events.read().await.clone()
    }

    /// Number of recorded events of one type.
    pub async fn count(&self, event_type: AnalyticsEventType) -> usize {
        self.events
            .read()
            .await
            .iter()
            .filter(|e| e.event_type == event_type)
            .count()
    }
}

#[async_trait]
impl AnalyticsSink for InMemoryAnalyticsSink {
    async fn record(&self, event: &AnalyticsEvent) -> Result<(), DomainError> {
        self.events.write().await.push(event.clone());
        Ok(())
    }
}
