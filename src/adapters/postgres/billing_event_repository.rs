//! PostgreSQL implementation of BillingEventRepository.
//!
//! The primary key on `stripe_event_id` makes concurrent deliveries of the
//! same event race safely: exactly one insert wins.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::billing::BillingEvent;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{BillingEventRepository, SaveResult};

/// PostgreSQL implementation of the BillingEventRepository port.
pub struct PostgresBillingEventRepository {
    pool: PgPool,
}

impl PostgresBillingEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BillingEventRepository for PostgresBillingEventRepository {
    async fn exists(&self, stripe_event_id: &str) -> Result<bool, DomainError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM billing_events WHERE stripe_event_id = $1)",
        )
        .bind(stripe_event_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to check billing event: {}", e),
            )
        })
    }

    async fn save(&self, event: &BillingEvent) -> Result<SaveResult, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO billing_events (
                stripe_event_id, event_type, client_id, amount, currency, plan,
                raw_payload, processed_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (stripe_event_id) DO NOTHING
            "#,
        )
        .bind(&event.stripe_event_id)
        .bind(&event.event_type)
        .bind(event.client_id.as_ref().map(|id| id.as_str()))
        .bind(event.amount)
        .bind(&event.currency)
        .bind(&event.plan)
        .bind(&event.raw_payload)
        .bind(event.processed_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to save billing event: {}", e),
            )
        })?;

        if result.rows_affected() > 0 {
            Ok(SaveResult::Inserted)
        } else {
            Ok(SaveResult::AlreadyExists)
        }
    }
}
