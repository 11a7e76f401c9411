//! # Spin Repository
//!
//! Spin-wheel prizes and draws.
//!
//! A spin reads the wheel, draws a roll, decrements limited stock and
//! records the result in one transaction, so two customers can never both
//! win the last unit of a prize.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use duka_core::spin::{pick_prize, total_weight};
use duka_core::validation::{validate_spin_prizes, validate_tenant_id};
use duka_core::{SpinPrize, DEFAULT_TENANT_ID};

const PRIZE_COLUMNS: &str =
    "id, tenant_id, label, weight, reward_value, stock_remaining, is_active";

/// Result of one spin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpinOutcome {
    pub result_id: String,
    /// The prize as it stands after the draw (stock already decremented).
    pub prize: SpinPrize,
    pub roll: i64,
    pub total_weight: i64,
    pub created_at: DateTime<Utc>,
}

/// Repository for spin wheel database operations.
#[derive(Debug, Clone)]
pub struct SpinRepository {
    pool: SqlitePool,
}

impl SpinRepository {
    /// Creates a new SpinRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SpinRepository { pool }
    }

    /// Adds a prize. The wheel as a whole must remain winnable.
    pub async fn insert_prize(&self, prize: &SpinPrize) -> DbResult<()> {
        validate_tenant_id(&prize.tenant_id)?;

        let mut tx = self.pool.begin().await?;

        sqlx::query("UPDATE spin_prizes SET weight = weight WHERE tenant_id = ?1")
            .bind(DEFAULT_TENANT_ID)
            .execute(&mut *tx)
            .await?;

        let sql = format!("SELECT {PRIZE_COLUMNS} FROM spin_prizes WHERE tenant_id = ?1 ORDER BY rowid");
        let mut wheel = sqlx::query_as::<_, SpinPrize>(&sql)
            .bind(DEFAULT_TENANT_ID)
            .fetch_all(&mut *tx)
            .await?;
        wheel.push(prize.clone());
        validate_spin_prizes(&wheel)?;

        debug!(id = %prize.id, label = %prize.label, weight = prize.weight, "Inserting spin prize");

        sqlx::query(
            r#"
            INSERT INTO spin_prizes (id, tenant_id, label, weight, reward_value, stock_remaining, is_active)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&prize.id)
        .bind(&prize.tenant_id)
        .bind(&prize.label)
        .bind(prize.weight)
        .bind(prize.reward_value)
        .bind(prize.stock_remaining)
        .bind(prize.is_active)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Every prize on the wheel, in insertion order.
    pub async fn list_prizes(&self) -> DbResult<Vec<SpinPrize>> {
        let sql = format!("SELECT {PRIZE_COLUMNS} FROM spin_prizes WHERE tenant_id = ?1 ORDER BY rowid");
        let prizes = sqlx::query_as::<_, SpinPrize>(&sql)
            .bind(DEFAULT_TENANT_ID)
            .fetch_all(&self.pool)
            .await?;

        Ok(prizes)
    }

    /// Spins the wheel for `user_id`.
    ///
    /// ## Errors
    /// - `NotFound` when no prize can currently be won
    pub async fn spin(&self, user_id: &str) -> DbResult<SpinOutcome> {
        self.spin_with(user_id, |total| rand::rng().random_range(0..total))
            .await
    }

    async fn spin_with<F>(&self, user_id: &str, draw: F) -> DbResult<SpinOutcome>
    where
        F: FnOnce(i64) -> i64,
    {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // write lock before reading stock
        sqlx::query("UPDATE spin_prizes SET weight = weight WHERE tenant_id = ?1")
            .bind(DEFAULT_TENANT_ID)
            .execute(&mut *tx)
            .await?;

        let sql = format!("SELECT {PRIZE_COLUMNS} FROM spin_prizes WHERE tenant_id = ?1 ORDER BY rowid");
        let wheel = sqlx::query_as::<_, SpinPrize>(&sql)
            .bind(DEFAULT_TENANT_ID)
            .fetch_all(&mut *tx)
            .await?;

        let total = total_weight(&wheel);
        if total <= 0 {
            return Err(DbError::not_found("SpinPrize", "eligible"));
        }

        let roll = draw(total);
        let mut prize = pick_prize(&wheel, roll)
            .cloned()
            .ok_or_else(|| DbError::Internal(format!("roll {roll} outside 0..{total}")))?;

        if let Some(stock) = prize.stock_remaining {
            let claimed = sqlx::query(
                "UPDATE spin_prizes SET stock_remaining = stock_remaining - 1 WHERE id = ?1 AND stock_remaining > 0",
            )
            .bind(&prize.id)
            .execute(&mut *tx)
            .await?;

            if claimed.rows_affected() == 0 {
                return Err(DbError::Internal(format!("prize {} out of stock", prize.id)));
            }
            prize.stock_remaining = Some(stock - 1);
        }

        let result_id = Uuid::new_v4().to_string();
        sqlx::query(
            r#"
            INSERT INTO spin_results (id, user_id, prize_id, roll, total_weight, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&result_id)
        .bind(user_id)
        .bind(&prize.id)
        .bind(roll)
        .bind(total)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            user_id = %user_id,
            prize = %prize.label,
            roll,
            total_weight = total,
            "Spin recorded"
        );

        Ok(SpinOutcome {
            result_id,
            prize,
            roll,
            total_weight: total,
            created_at: now,
        })
    }

    /// How many times a user has spun.
    pub async fn spin_count(&self, user_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM spin_results WHERE user_id = ?1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
