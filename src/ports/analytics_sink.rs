//! AnalyticsSink port - destination for product analytics events.

use async_trait::async_trait;

use crate::domain::analytics::AnalyticsEvent;
use crate::domain::foundation::DomainError;

/// Persists analytics events. Callers treat every failure as non-fatal.
#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    async fn record(&self, event: &AnalyticsEvent) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analytics_sink_is_object_safe() {
        fn _accepts_dyn(_sink: &dyn AnalyticsSink) {}
    }
}
