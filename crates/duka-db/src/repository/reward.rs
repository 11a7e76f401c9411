//! # Reward Repository
//!
//! Spending brackets and the per-user ten-order accumulator.
//!
//! ## Order Completion
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  record_order_completion(user, order, amount)                           │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │   ├── INSERT reward_states row if missing ── takes the write lock       │
//! │   ├── reward_events has this order? ──yes──► return recorded outcome    │
//! │   ├── SELECT state, SELECT brackets                                     │
//! │   ├── record_order (duka-core)                                          │
//! │   ├── UPDATE reward_states  (reset to 0/0 when a bracket closes)        │
//! │   └── INSERT reward_events  (UNIQUE order_id)                           │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Replaying the same order id returns the first outcome and changes nothing.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use duka_core::rewards::record_order;
use duka_core::validation::{validate_amount, validate_brackets, validate_tenant_id};
use duka_core::{Money, RewardBracketState, RewardOutcome, SpendingBracket, DEFAULT_TENANT_ID};

/// Ledger row written for every completed order.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RewardEvent {
    pub id: String,
    pub user_id: String,
    pub order_id: String,
    pub order_amount: i64,
    pub bracket_completed: bool,
    pub completed_spend: i64,
    pub reward_awarded: i64,
    pub manual_review: bool,
    pub bracket_label: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl RewardEvent {
    fn into_outcome(self, state: RewardBracketState) -> RewardOutcome {
        RewardOutcome {
            state,
            bracket_completed: self.bracket_completed,
            reward_awarded: Money::from_minor(self.reward_awarded),
            manual_review: self.manual_review,
            completed_spend: Money::from_minor(self.completed_spend),
            bracket_label: self.bracket_label,
        }
    }
}

const BRACKETS_BY_MIN_SPEND: &str = r#"
    SELECT id, tenant_id, label, min_spend, max_spend, reward_value
    FROM spending_brackets
    WHERE tenant_id = ?1
    ORDER BY min_spend
"#;

const EVENT_COLUMNS: &str = r#"
    id, user_id, order_id, order_amount, bracket_completed, completed_spend,
    reward_awarded, manual_review, bracket_label, created_at
"#;

/// Repository for reward bracket database operations.
#[derive(Debug, Clone)]
pub struct RewardRepository {
    pool: SqlitePool,
}

impl RewardRepository {
    /// Creates a new RewardRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RewardRepository { pool }
    }

    /// Adds a bracket.
    ///
    /// The whole table, new bracket included, must stay ascending and
    /// non-overlapping with at most one open-ended bracket at the top.
    /// Validation and insert run in one transaction.
    pub async fn insert_bracket(&self, bracket: &SpendingBracket) -> DbResult<()> {
        validate_tenant_id(&bracket.tenant_id)?;

        let mut tx = self.pool.begin().await?;

        // write lock before reading the table
        sqlx::query("UPDATE spending_brackets SET min_spend = min_spend WHERE tenant_id = ?1")
            .bind(DEFAULT_TENANT_ID)
            .execute(&mut *tx)
            .await?;

        let mut table = sqlx::query_as::<_, SpendingBracket>(BRACKETS_BY_MIN_SPEND)
            .bind(DEFAULT_TENANT_ID)
            .fetch_all(&mut *tx)
            .await?;
        table.push(bracket.clone());
        table.sort_by_key(|b| b.min_spend);
        validate_brackets(&table)?;

        debug!(
            id = %bracket.id,
            label = %bracket.label,
            min_spend = bracket.min_spend,
            max_spend = ?bracket.max_spend,
            "Inserting spending bracket"
        );

        sqlx::query(
            r#"
            INSERT INTO spending_brackets (id, tenant_id, label, min_spend, max_spend, reward_value)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&bracket.id)
        .bind(&bracket.tenant_id)
        .bind(&bracket.label)
        .bind(bracket.min_spend)
        .bind(bracket.max_spend)
        .bind(bracket.reward_value)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// All brackets, lowest first.
    pub async fn list_brackets(&self) -> DbResult<Vec<SpendingBracket>> {
        let brackets = sqlx::query_as::<_, SpendingBracket>(BRACKETS_BY_MIN_SPEND)
            .bind(DEFAULT_TENANT_ID)
            .fetch_all(&self.pool)
            .await?;

        Ok(brackets)
    }

    /// Current accumulator for a user; zeroed if they have no orders yet.
    pub async fn get_state(&self, user_id: &str) -> DbResult<RewardBracketState> {
        let state = sqlx::query_as::<_, RewardBracketState>(
            "SELECT user_id, cumulative_spend, order_count FROM reward_states WHERE user_id = ?1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(state.unwrap_or_else(|| RewardBracketState::new(user_id)))
    }

    /// Feeds one completed order into the user's accumulator.
    ///
    /// Idempotent per `order_id`.
    ///
    /// ## Errors
    /// - `Validation` for a negative amount
    /// - `UniqueViolation` if `order_id` was already recorded for another user
    pub async fn record_order_completion(
        &self,
        user_id: &str,
        order_id: &str,
        order_amount: Money,
    ) -> DbResult<RewardOutcome> {
        validate_amount(order_amount.minor())?;

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO reward_states (user_id, cumulative_spend, order_count, updated_at)
            VALUES (?1, 0, 0, ?2)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let state = sqlx::query_as::<_, RewardBracketState>(
            "SELECT user_id, cumulative_spend, order_count FROM reward_states WHERE user_id = ?1",
        )
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        let sql = format!("SELECT {EVENT_COLUMNS} FROM reward_events WHERE order_id = ?1");
        let existing = sqlx::query_as::<_, RewardEvent>(&sql)
            .bind(order_id)
            .fetch_optional(&mut *tx)
            .await?;

        if let Some(event) = existing {
            tx.rollback().await?;
            if event.user_id != user_id {
                return Err(DbError::duplicate("reward_events.order_id", order_id));
            }
            debug!(user_id = %user_id, order_id = %order_id, "Order already recorded");
            return Ok(event.into_outcome(state));
        }

        let brackets = sqlx::query_as::<_, SpendingBracket>(BRACKETS_BY_MIN_SPEND)
            .bind(DEFAULT_TENANT_ID)
            .fetch_all(&mut *tx)
            .await?;

        let outcome = record_order(&state, order_amount, &brackets);

        sqlx::query(
            r#"
            UPDATE reward_states
            SET cumulative_spend = ?1, order_count = ?2, updated_at = ?3
            WHERE user_id = ?4
            "#,
        )
        .bind(outcome.state.cumulative_spend)
        .bind(outcome.state.order_count)
        .bind(now)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO reward_events (
                id, user_id, order_id, order_amount, bracket_completed, completed_spend,
                reward_awarded, manual_review, bracket_label, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id)
        .bind(order_id)
        .bind(order_amount.minor())
        .bind(outcome.bracket_completed)
        .bind(outcome.completed_spend.minor())
        .bind(outcome.reward_awarded.minor())
        .bind(outcome.manual_review)
        .bind(&outcome.bracket_label)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        if outcome.manual_review {
            warn!(
                user_id = %user_id,
                spend = outcome.completed_spend.minor(),
                "Bracket completed without an automatic reward, needs manual review"
            );
        } else if outcome.bracket_completed {
            info!(
                user_id = %user_id,
                spend = outcome.completed_spend.minor(),
                reward = outcome.reward_awarded.minor(),
                bracket = outcome.bracket_label.as_deref().unwrap_or("none"),
                "Reward bracket completed"
            );
        }

        Ok(outcome)
    }

    /// Completed brackets waiting for an administrator to set the bonus.
    pub async fn list_pending_reviews(&self) -> DbResult<Vec<RewardEvent>> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM reward_events WHERE manual_review = 1 ORDER BY created_at"
        );
        let events = sqlx::query_as::<_, RewardEvent>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(events)
    }
}
