//! TrialOriginRepository port - first claimant per network origin.

use async_trait::async_trait;

use crate::domain::entitlement::{OriginAddress, TrialOriginRecord};
use crate::domain::foundation::DomainError;

use super::SaveResult;

/// Records which client first started a trial from an origin.
///
/// Records are written once and never updated.
#[async_trait]
pub trait TrialOriginRepository: Send + Sync {
    async fn find(&self, origin: &OriginAddress) -> Result<Option<TrialOriginRecord>, DomainError>;

    /// Insert-if-absent. A concurrent second claimant gets `AlreadyExists`.
    async fn register(&self, record: &TrialOriginRecord) -> Result<SaveResult, DomainError>;
}
