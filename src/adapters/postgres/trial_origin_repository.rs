//! PostgreSQL implementation of TrialOriginRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::entitlement::{OriginAddress, TrialOriginRecord};
use crate::domain::foundation::{ClientId, DomainError, ErrorCode, Timestamp};
use crate::ports::{SaveResult, TrialOriginRepository};

/// PostgreSQL implementation of the TrialOriginRepository port.
pub struct PostgresTrialOriginRepository {
    pool: PgPool,
}

impl PostgresTrialOriginRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TrialOriginRow {
    ip_address: String,
    client_id: String,
    first_seen: DateTime<Utc>,
}

impl TryFrom<TrialOriginRow> for TrialOriginRecord {
    type Error = DomainError;

    fn try_from(row: TrialOriginRow) -> Result<Self, Self::Error> {
        let client_id = ClientId::new(row.client_id).map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid client_id: {}", e))
        })?;
        Ok(TrialOriginRecord::new(
            OriginAddress::new(row.ip_address),
            client_id,
            Timestamp::from_datetime(row.first_seen),
        ))
    }
}

#[async_trait]
impl TrialOriginRepository for PostgresTrialOriginRepository {
    async fn find(&self, origin: &OriginAddress) -> Result<Option<TrialOriginRecord>, DomainError> {
        let row: Option<TrialOriginRow> = sqlx::query_as(
            r#"
            SELECT ip_address, client_id, first_seen
            FROM trial_origins
            WHERE ip_address = $1
            "#,
        )
        .bind(origin.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to find trial origin: {}", e))
        })?;

        row.map(TrialOriginRecord::try_from).transpose()
    }

    async fn register(&self, record: &TrialOriginRecord) -> Result<SaveResult, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO trial_origins (ip_address, client_id, first_seen)
            VALUES ($1, $2, $3)
            ON CONFLICT (ip_address) DO NOTHING
            "#,
        )
        .bind(record.origin.as_str())
        .bind(record.client_id.as_str())
        .bind(record.first_seen.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to register trial origin: {}", e),
            )
        })?;

        if result.rows_affected() > 0 {
            Ok(SaveResult::Inserted)
        } else {
            Ok(SaveResult::AlreadyExists)
        }
    }
}
