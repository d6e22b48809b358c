//! BillingEventRepository port - audit rows for payment events.
//!
//! Stripe may deliver the same webhook multiple times:
//! - network timeouts
//! - a 5xx from our endpoint triggers a retry
//! - our endpoint answered but Stripe never saw the response
//!
//! The event id is unique in storage and is the idempotency gate.

use async_trait::async_trait;

use crate::domain::billing::BillingEvent;
use crate::domain::foundation::DomainError;

/// Result of attempting an insert-if-absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveResult {
    /// Record was inserted (first time seeing this key).
    Inserted,
    /// Record already exists (duplicate).
    AlreadyExists,
}

/// Port for storing processed payment events.
///
/// Implementations should use a database constraint on the event id so that
/// concurrent deliveries cannot both insert.
#[async_trait]
pub trait BillingEventRepository: Send + Sync {
    /// Whether an event with this Stripe id was already recorded.
    async fn exists(&self, stripe_event_id: &str) -> Result<bool, DomainError>;

    /// Insert the event with `ON CONFLICT DO NOTHING` semantics.
    async fn save(&self, event: &BillingEvent) -> Result<SaveResult, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn billing_event_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn BillingEventRepository) {}
    }
}
