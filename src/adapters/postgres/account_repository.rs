//! PostgreSQL implementation of AccountRepository.
//!
//! Every mutation is one statement. The trial debit is a conditional
//! `UPDATE ... RETURNING`, so two concurrent requests for the last unit
//! serialize on the row lock and only one of them sees a returned row.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::entitlement::{ClientAccount, EntitlementPolicy};
use crate::domain::foundation::{ClientId, DomainError, ErrorCode, Timestamp};
use crate::ports::{AccountRepository, PremiumGrant};

const ACCOUNT_COLUMNS: &str = "client_id, is_premium, premium_until, trial_messages_left, \
     trial_start, trial_expires_at, used_count, stripe_customer_id, promo_applied, promo_type, \
     created_at, updated_at";

/// PostgreSQL implementation of the AccountRepository port.
pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    /// Creates a new PostgresAccountRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a client account.
#[derive(Debug, sqlx::FromRow)]
struct AccountRow {
    client_id: String,
    is_premium: bool,
    premium_until: Option<DateTime<Utc>>,
    trial_messages_left: i32,
    trial_start: Option<DateTime<Utc>>,
    trial_expires_at: Option<DateTime<Utc>>,
    used_count: i64,
    stripe_customer_id: Option<String>,
    promo_applied: bool,
    promo_type: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for ClientAccount {
    type Error = DomainError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        Ok(ClientAccount {
            client_id: ClientId::new(row.client_id).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid client_id: {}", e))
            })?,
            is_premium: row.is_premium,
            premium_until: row.premium_until.map(Timestamp::from_datetime),
            // The column carries a CHECK (>= 0); clamp anyway.
            trial_messages_left: u32::try_from(row.trial_messages_left).unwrap_or(0),
            trial_start: row.trial_start.map(Timestamp::from_datetime),
            trial_expires_at: row.trial_expires_at.map(Timestamp::from_datetime),
            used_count: u64::try_from(row.used_count).unwrap_or(0),
            stripe_customer_id: row.stripe_customer_id,
            promo_applied: row.promo_applied,
            promo_type: row.promo_type,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn db_error(operation: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Failed to {}: {}", operation, e),
    )
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn find(&self, client_id: &ClientId) -> Result<Option<ClientAccount>, DomainError> {
        let row: Option<AccountRow> = sqlx::query_as(&format!(
            "SELECT {} FROM client_accounts WHERE client_id = $1",
            ACCOUNT_COLUMNS
        ))
        .bind(client_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("find account", e))?;

        row.map(ClientAccount::try_from).transpose()
    }

    async fn find_or_create(
        &self,
        client_id: &ClientId,
        now: Timestamp,
    ) -> Result<ClientAccount, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO client_accounts (client_id, created_at, updated_at)
            VALUES ($1, $2, $2)
            ON CONFLICT (client_id) DO NOTHING
            "#,
        )
        .bind(client_id.as_str())
        .bind(now.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("create account", e))?;

        self.find(client_id).await?.ok_or_else(|| {
            DomainError::new(ErrorCode::AccountNotFound, "Account vanished after insert")
                .with_detail("client_id", client_id.as_str())
        })
    }

    async fn start_trial(
        &self,
        client_id: &ClientId,
        policy: &EntitlementPolicy,
        now: Timestamp,
    ) -> Result<ClientAccount, DomainError> {
        let allowance = i32::try_from(policy.trial_allowance).unwrap_or(i32::MAX);
        let expires_at = now.add_days(policy.trial_window_days);

        let row: AccountRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO client_accounts (
                client_id, trial_messages_left, trial_start, trial_expires_at, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $3, $3)
            ON CONFLICT (client_id) DO UPDATE SET
                trial_messages_left = EXCLUDED.trial_messages_left,
                trial_start = EXCLUDED.trial_start,
                trial_expires_at = EXCLUDED.trial_expires_at,
                updated_at = EXCLUDED.updated_at
            RETURNING {}
            "#,
            ACCOUNT_COLUMNS
        ))
        .bind(client_id.as_str())
        .bind(allowance)
        .bind(now.as_datetime())
        .bind(expires_at.as_datetime())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("start trial", e))?;

        ClientAccount::try_from(row)
    }

    async fn try_debit_trial(
        &self,
        client_id: &ClientId,
        now: Timestamp,
    ) -> Result<Option<ClientAccount>, DomainError> {
        let row: Option<AccountRow> = sqlx::query_as(&format!(
            r#"
            UPDATE client_accounts SET
                trial_messages_left = trial_messages_left - 1,
                used_count = used_count + 1,
                updated_at = $2
            WHERE client_id = $1
              AND trial_messages_left > 0
              AND trial_expires_at > $2
            RETURNING {}
            "#,
            ACCOUNT_COLUMNS
        ))
        .bind(client_id.as_str())
        .bind(now.as_datetime())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("debit trial", e))?;

        row.map(ClientAccount::try_from).transpose()
    }

    async fn credit_trial(
        &self,
        client_id: &ClientId,
        cap: u32,
        now: Timestamp,
    ) -> Result<Option<ClientAccount>, DomainError> {
        let cap = i32::try_from(cap).unwrap_or(i32::MAX);

        let row: Option<AccountRow> = sqlx::query_as(&format!(
            r#"
            UPDATE client_accounts SET
                trial_messages_left = LEAST(trial_messages_left + 1, $2),
                updated_at = $3
            WHERE client_id = $1
            RETURNING {}
            "#,
            ACCOUNT_COLUMNS
        ))
        .bind(client_id.as_str())
        .bind(cap)
        .bind(now.as_datetime())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("credit trial", e))?;

        row.map(ClientAccount::try_from).transpose()
    }

    async fn grant_premium(
        &self,
        grant: &PremiumGrant,
        now: Timestamp,
    ) -> Result<ClientAccount, DomainError> {
        // GREATEST ignores NULL, so a first grant takes the candidate as-is.
        let row: AccountRow = sqlx::query_as(&format!(
            r#"
            INSERT INTO client_accounts (
                client_id, is_premium, premium_until, stripe_customer_id,
                promo_applied, promo_type, created_at, updated_at
            ) VALUES ($1, TRUE, $2, $3, $4::text IS NOT NULL, $4, $5, $5)
            ON CONFLICT (client_id) DO UPDATE SET
                is_premium = TRUE,
                premium_until = GREATEST(client_accounts.premium_until, EXCLUDED.premium_until),
                stripe_customer_id = COALESCE(EXCLUDED.stripe_customer_id, client_accounts.stripe_customer_id),
                promo_applied = client_accounts.promo_applied OR EXCLUDED.promo_applied,
                promo_type = COALESCE(client_accounts.promo_type, EXCLUDED.promo_type),
                updated_at = EXCLUDED.updated_at
            RETURNING {}
            "#,
            ACCOUNT_COLUMNS
        ))
        .bind(grant.client_id.as_str())
        .bind(grant.until.as_datetime())
        .bind(&grant.stripe_customer_id)
        .bind(&grant.promo_type)
        .bind(now.as_datetime())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("grant premium", e))?;

        ClientAccount::try_from(row)
    }

    async fn revoke_premium(
        &self,
        client_id: &ClientId,
        now: Timestamp,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE client_accounts SET is_premium = FALSE, updated_at = $2
            WHERE client_id = $1
            "#,
        )
        .bind(client_id.as_str())
        .bind(now.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("revoke premium", e))?;

        Ok(result.rows_affected() > 0)
    }
}
