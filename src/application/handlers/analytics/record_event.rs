//! RecordAnalyticsHandler - accepts browser-submitted analytics events.

use crate::adapters::analytics::AnalyticsDispatcher;
use crate::domain::analytics::{AnalyticsEvent, AnalyticsEventType};
use crate::domain::entitlement::EntitlementError;
use crate::domain::foundation::ClientId;

/// Command to record an analytics event.
#[derive(Debug, Clone)]
pub struct RecordAnalyticsCommand {
    pub event_type: String,
    /// Header value first, body value second; resolved by the caller.
    pub client_id: Option<String>,
}

/// Handler for client analytics. Returns as soon as the event is dispatched.
pub struct RecordAnalyticsHandler {
    analytics: AnalyticsDispatcher,
}

impl RecordAnalyticsHandler {
    pub fn new(analytics: AnalyticsDispatcher) -> Self {
        Self { analytics }
    }

    pub fn handle(&self, cmd: RecordAnalyticsCommand) -> Result<(), EntitlementError> {
        let event_type: AnalyticsEventType = cmd.event_type.parse()?;
        if !event_type.is_client_submittable() {
            return Err(EntitlementError::invalid_parameter(
                "invalid_event_type",
                format!("Event type {} cannot be submitted by clients", event_type),
            ));
        }

        let client_id = match cmd.client_id.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => ClientId::new(raw)?,
            _ => return Err(EntitlementError::MissingClientId),
        };

        self.analytics
            .dispatch(AnalyticsEvent::new(event_type, client_id));

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryAnalyticsSink;
    use std::sync::Arc;

    fn command(event_type: &str, client: Option<&str>) -> RecordAnalyticsCommand {
        RecordAnalyticsCommand {
            event_type: event_type.to_string(),
            client_id: client.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn checkout_click_is_recorded() {
        let sink = Arc::new(InMemoryAnalyticsSink::new());
        let handler = RecordAnalyticsHandler::new(AnalyticsDispatcher::new(sink.clone()));

        handler.handle(command("checkout_click", Some("client_abc"))).unwrap();

        for _ in 0..50 {
            if sink.count(AnalyticsEventType::CheckoutClick).await == 1 {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        panic!("event never reached the sink");
    }

    #[tokio::test]
    async fn unknown_type_is_rejected() {
        let handler =
            RecordAnalyticsHandler::new(AnalyticsDispatcher::new(Arc::new(InMemoryAnalyticsSink::new())));

        let err = handler.handle(command("page_view", Some("client_abc"))).unwrap_err();

        assert_eq!(err.code(), "invalid_event_type");
    }

    #[tokio::test]
    async fn internal_type_cannot_be_submitted() {
        let handler =
            RecordAnalyticsHandler::new(AnalyticsDispatcher::new(Arc::new(InMemoryAnalyticsSink::new())));

        let err = handler.handle(command("paywall_shown", Some("client_abc"))).unwrap_err();

        assert_eq!(err.code(), "invalid_event_type");
    }

    #[tokio::test]
    async fn missing_client_is_rejected() {
        let handler =
            RecordAnalyticsHandler::new(AnalyticsDispatcher::new(Arc::new(InMemoryAnalyticsSink::new())));

        let err = handler.handle(command("checkout_click", None)).unwrap_err();

        assert_eq!(err, EntitlementError::MissingClientId);
    }
}
