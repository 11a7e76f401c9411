//! SQLite-backed verification code store.

use std::time::Duration;

use chrono::{DateTime, Utc};
use duka_core::validation::normalize_msisdn;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use super::{generate_code, VerificationStore, MAX_ATTEMPTS};
use crate::error::{DbError, DbResult};

#[derive(Debug, sqlx::FromRow)]
struct StoredCode {
    code: String,
    attempts: i64,
    expires_at: DateTime<Utc>,
}

/// Verification codes in the `verification_codes` table.
#[derive(Debug, Clone)]
pub struct SqliteVerificationStore {
    pool: SqlitePool,
}

impl SqliteVerificationStore {
    pub fn new(pool: SqlitePool) -> Self {
        SqliteVerificationStore { pool }
    }
}

impl VerificationStore for SqliteVerificationStore {
    async fn issue(&self, phone: &str, ttl: Duration) -> DbResult<String> {
        let phone = normalize_msisdn(phone)?;
        let code = generate_code();
        let now = Utc::now();
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| DbError::Internal(format!("verification ttl out of range: {e}")))?;

        sqlx::query(
            r#"
            INSERT INTO verification_codes (phone, code, attempts, expires_at, created_at)
            VALUES (?1, ?2, 0, ?3, ?4)
            ON CONFLICT (phone) DO UPDATE SET
                code = excluded.code,
                attempts = 0,
                expires_at = excluded.expires_at,
                created_at = excluded.created_at
            "#,
        )
        .bind(&phone)
        .bind(&code)
        .bind(now + ttl)
        .bind(now)
        .execute(&self.pool)
        .await?;

        debug!(phone = %phone, ttl_secs = ttl.num_seconds(), "Verification code issued");
        Ok(code)
    }

    async fn verify(&self, phone: &str, code: &str) -> DbResult<bool> {
        let phone = normalize_msisdn(phone)?;
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // write lock first so concurrent guesses count correctly
        sqlx::query("UPDATE verification_codes SET attempts = attempts WHERE phone = ?1")
            .bind(&phone)
            .execute(&mut *tx)
            .await?;

        let stored = sqlx::query_as::<_, StoredCode>(
            "SELECT code, attempts, expires_at FROM verification_codes WHERE phone = ?1",
        )
        .bind(&phone)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(stored) = stored else {
            return Ok(false);
        };

        let expired = stored.expires_at <= now;
        let matched = !expired && stored.attempts < MAX_ATTEMPTS && stored.code == code.trim();
        let attempts = stored.attempts + 1;

        if expired || matched || attempts >= MAX_ATTEMPTS {
            sqlx::query("DELETE FROM verification_codes WHERE phone = ?1")
                .bind(&phone)
                .execute(&mut *tx)
                .await?;
        } else {
            sqlx::query("UPDATE verification_codes SET attempts = ?1 WHERE phone = ?2")
                .bind(attempts)
                .bind(&phone)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        if matched {
            info!(phone = %phone, "Phone verified");
        } else if !expired && attempts >= MAX_ATTEMPTS {
            warn!(phone = %phone, "Verification code discarded after too many attempts");
        }

        Ok(matched)
    }

    async fn purge_expired(&self) -> DbResult<u64> {
        let result = sqlx::query("DELETE FROM verification_codes WHERE expires_at <= ?1")
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        let purged = result.rows_affected();
        if purged > 0 {
            info!(purged, "Purged expired verification codes");
        }
        Ok(purged)
    }
}
