//! In-memory trial origin store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::entitlement::{OriginAddress, TrialOriginRecord};
use crate::domain::foundation::DomainError;
use crate::ports::{SaveResult, TrialOriginRepository};

/// In-memory implementation of the TrialOriginRepository port.
#[derive(Default)]
pub struct InMemoryTrialOriginRepository {
    records: RwLock<HashMap<OriginAddress, TrialOriginRecord>>,
}

impl InMemoryTrialOriginRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TrialOriginRepository for InMemoryTrialOriginRepository {
    async fn find(&self, origin: &OriginAddress) -> Result<Option<TrialOriginRecord>, DomainError> {
        Ok(self.records.read().await.get(origin).cloned())
    }

    async fn register(&self, record: &TrialOriginRecord) -> Result<SaveResult, DomainError> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.origin) {
            return Ok(SaveResult::AlreadyExists);
        }
        records.insert(record.origin.clone(), record.clone());
        Ok(SaveResult::Inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{ClientId, Timestamp};

    #[tokio::test]
    async fn first_claimant_wins() {
        let repo = InMemoryTrialOriginRepository::new();
        let origin = OriginAddress::new("203.0.113.7");
        let first = TrialOriginRecord::new(
            origin.clone(),
            ClientId::new("client_a").unwrap(),
            Timestamp::now(),
        );
        let second = TrialOriginRecord::new(
            origin.clone(),
            ClientId::new("client_b").unwrap(),
            Timestamp::now(),
        );

        assert_eq!(repo.register(&first).await.unwrap(), SaveResult::Inserted);
        assert_eq!(repo.register(&second).await.unwrap(), SaveResult::AlreadyExists);

        let stored = repo.find(&origin).await.unwrap().unwrap();
        assert_eq!(stored.client_id.as_str(), "client_a");
    }
}
