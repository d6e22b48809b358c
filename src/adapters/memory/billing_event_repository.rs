//! In-memory billing event store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::billing::BillingEvent;
use crate::domain::foundation::DomainError;
use crate::ports::{BillingEventRepository, SaveResult};

/// In-memory implementation of the BillingEventRepository port.
#[derive(Default)]
pub struct InMemoryBillingEventRepository {
    events: RwLock<HashMap<String, BillingEvent>>,
}

impl InMemoryBillingEventRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all recorded events.
    pub async fn events(&self) -> Vec<BillingEvent> {
        self.events.read().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.events.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.events.read().await.is_empty()
    }
}

#[async_trait]
impl BillingEventRepository for InMemoryBillingEventRepository {
    async fn exists(&self, stripe_event_id: &str) -> Result<bool, DomainError> {
        Ok(self.events.read().await.contains_key(stripe_event_id))
    }

    async fn save(&self, event: &BillingEvent) -> Result<SaveResult, DomainError> {
        let mut events = self.events.write().await;
        if events.contains_key(&event.stripe_event_id) {
            return Ok(SaveResult::AlreadyExists);
        }
        events.insert(event.stripe_event_id.clone(), event.clone());
        Ok(SaveResult::Inserted)
    }
}
