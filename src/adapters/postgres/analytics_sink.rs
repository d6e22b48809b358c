//! PostgreSQL implementation of AnalyticsSink.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::analytics::AnalyticsEvent;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::AnalyticsSink;

/// Appends analytics events to the `analytics_events` table.
pub struct PostgresAnalyticsSink {
    pool: PgPool,
}

impl PostgresAnalyticsSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AnalyticsSink for PostgresAnalyticsSink {
    async fn record(&self, event: &AnalyticsEvent) -> Result<(), DomainError> {
        let metadata = if event.metadata.is_null() {
            serde_json::json!({})
        } else {
            event.metadata.clone()
        };

        sqlx::query(
            r#"
            INSERT INTO analytics_events (id, event_type, client_id, metadata, occurred_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(event.event_type.as_str())
        .bind(event.client_id.as_str())
        .bind(metadata)
        .bind(event.occurred_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to record analytics event: {}", e),
            )
        })?;

        Ok(())
    }
}
