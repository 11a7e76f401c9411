//! # Coupon Repository
//!
//! Database operations for coupons and their redemptions.
//!
//! ## Redemption Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  redeem(SAVE10, user, order, KES 1000)                                  │
//! │                                                                         │
//! │  BEGIN                                                                  │
//! │   ├── no-op UPDATE on the coupon row ── takes the write lock first      │
//! │   │        └── 0 rows ──► NotFound                                      │
//! │   ├── SELECT coupon                                                     │
//! │   ├── COUNT usages for (coupon, user)                                   │
//! │   ├── validate_and_price (duka-core) ──► Expired / BelowMinimum / ...   │
//! │   ├── UPDATE used_count + 1 WHERE used_count < max_uses                 │
//! │   │        └── 0 rows ──► GlobalLimitReached                            │
//! │   └── INSERT coupon_usages (UNIQUE coupon_id, order_id)                 │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  Any error drops the transaction, which rolls it back.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Taking the write lock before the reads means two checkouts racing on the
//! same code run one after the other, so the per-user count and the global
//! cap are both checked against committed data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use duka_core::coupon::{normalize_code, validate_and_price};
use duka_core::validation::{
    validate_amount, validate_coupon_code, validate_coupon_value, validate_tenant_id,
};
use duka_core::{Coupon, CouponError, CouponPricing, CouponUsage, Money, DEFAULT_TENANT_ID};

const COUPON_COLUMNS: &str = r#"
    id, tenant_id, code, description, kind, value,
    min_order_amount, max_uses, max_uses_per_user, used_count,
    starts_at, ends_at, is_active, created_at, updated_at
"#;

/// A checkout's request to apply a coupon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedeemCoupon {
    /// As typed by the customer; normalized before lookup.
    pub code: String,
    pub user_id: String,
    pub order_id: String,
    pub order_amount: Money,
}

/// A committed redemption.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Redemption {
    pub usage: CouponUsage,
    pub pricing: CouponPricing,
}

/// Repository for coupon database operations.
#[derive(Debug, Clone)]
pub struct CouponRepository {
    pool: SqlitePool,
}

impl CouponRepository {
    /// Creates a new CouponRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CouponRepository { pool }
    }

    /// Inserts a coupon. The code is stored normalized.
    ///
    /// ## Errors
    /// - `Validation` for a malformed code, out-of-range value or foreign tenant
    /// - `UniqueViolation` if the code already exists
    pub async fn insert(&self, coupon: &Coupon) -> DbResult<()> {
        validate_tenant_id(&coupon.tenant_id)?;
        validate_coupon_code(&coupon.code)?;
        validate_coupon_value(coupon.kind, coupon.value)?;
        if let Some(minimum) = coupon.min_order_amount {
            validate_amount(minimum)?;
        }

        let code = normalize_code(&coupon.code);
        debug!(id = %coupon.id, code = %code, kind = %coupon.kind, "Inserting coupon");

        sqlx::query(
            r#"
            INSERT INTO coupons (
                id, tenant_id, code, description, kind, value,
                min_order_amount, max_uses, max_uses_per_user, used_count,
                starts_at, ends_at, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
        )
        .bind(&coupon.id)
        .bind(&coupon.tenant_id)
        .bind(&code)
        .bind(&coupon.description)
        .bind(coupon.kind)
        .bind(coupon.value)
        .bind(coupon.min_order_amount)
        .bind(coupon.max_uses)
        .bind(coupon.max_uses_per_user)
        .bind(coupon.used_count)
        .bind(coupon.starts_at)
        .bind(coupon.ends_at)
        .bind(coupon.is_active)
        .bind(coupon.created_at)
        .bind(coupon.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a coupon by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Coupon>> {
        let sql = format!("SELECT {COUPON_COLUMNS} FROM coupons WHERE id = ?1");
        let coupon = sqlx::query_as::<_, Coupon>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(coupon)
    }

    /// Gets a coupon by code. Case and surrounding whitespace are ignored.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Coupon>> {
        let sql = format!("SELECT {COUPON_COLUMNS} FROM coupons WHERE tenant_id = ?1 AND code = ?2");
        let coupon = sqlx::query_as::<_, Coupon>(&sql)
            .bind(DEFAULT_TENANT_ID)
            .bind(normalize_code(code))
            .fetch_optional(&self.pool)
            .await?;

        Ok(coupon)
    }

    /// Active coupons whose validity window contains `now`.
    pub async fn list_active(&self, now: DateTime<Utc>) -> DbResult<Vec<Coupon>> {
        let sql = format!(
            "SELECT {COUPON_COLUMNS} FROM coupons WHERE tenant_id = ?1 AND is_active = 1 ORDER BY code"
        );
        let coupons = sqlx::query_as::<_, Coupon>(&sql)
            .bind(DEFAULT_TENANT_ID)
            .fetch_all(&self.pool)
            .await?;

        Ok(coupons
            .into_iter()
            .filter(|c| c.is_within_window(now))
            .collect())
    }

    /// Enables or soft-disables a coupon. Coupons are never deleted.
    pub async fn set_active(&self, id: &str, active: bool) -> DbResult<()> {
        let result = sqlx::query("UPDATE coupons SET is_active = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(active)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Coupon", id));
        }

        info!(id = %id, active, "Coupon active flag changed");
        Ok(())
    }

    /// How many times `user_id` has redeemed `coupon_id`.
    pub async fn user_usage_count(&self, coupon_id: &str, user_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM coupon_usages WHERE coupon_id = ?1 AND user_id = ?2",
        )
        .bind(coupon_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Prices a coupon for the cart without redeeming it.
    ///
    /// The answer can go stale before checkout; only [`Self::redeem`] is
    /// authoritative.
    pub async fn preview(
        &self,
        code: &str,
        user_id: &str,
        order_amount: Money,
    ) -> DbResult<CouponPricing> {
        validate_amount(order_amount.minor())?;

        let coupon = self.get_by_code(code).await?.ok_or_else(|| CouponError::NotFound {
            code: normalize_code(code),
        })?;
        let prior = self.user_usage_count(&coupon.id, user_id).await?;

        Ok(validate_and_price(&coupon, order_amount, prior, Utc::now())?)
    }

    /// Atomically validates a coupon and records its use on an order.
    ///
    /// ## Errors
    /// - `Coupon(NotFound | Expired | BelowMinimum | GlobalLimitReached | UserLimitReached)`
    /// - `UniqueViolation` if this coupon was already applied to the order
    pub async fn redeem(&self, request: &RedeemCoupon) -> DbResult<Redemption> {
        validate_amount(request.order_amount.minor())?;

        let code = normalize_code(&request.code);
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;

        // write lock first, reads after
        let locked = sqlx::query(
            "UPDATE coupons SET used_count = used_count WHERE tenant_id = ?1 AND code = ?2",
        )
        .bind(DEFAULT_TENANT_ID)
        .bind(&code)
        .execute(&mut *tx)
        .await?;

        if locked.rows_affected() == 0 {
            warn!(code = %code, "Coupon not found");
            return Err(CouponError::NotFound { code }.into());
        }

        let sql = format!("SELECT {COUPON_COLUMNS} FROM coupons WHERE tenant_id = ?1 AND code = ?2");
        let coupon = sqlx::query_as::<_, Coupon>(&sql)
            .bind(DEFAULT_TENANT_ID)
            .bind(&code)
            .fetch_one(&mut *tx)
            .await?;

        let prior: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM coupon_usages WHERE coupon_id = ?1 AND user_id = ?2",
        )
        .bind(&coupon.id)
        .bind(&request.user_id)
        .fetch_one(&mut *tx)
        .await?;

        let pricing = match validate_and_price(&coupon, request.order_amount, prior, now) {
            Ok(pricing) => pricing,
            Err(err) => {
                warn!(
                    code = %code,
                    user_id = %request.user_id,
                    reason = err.code(),
                    "Coupon rejected"
                );
                return Err(err.into());
            }
        };

        let claimed = sqlx::query(
            r#"
            UPDATE coupons
            SET used_count = used_count + 1, updated_at = ?1
            WHERE id = ?2 AND (max_uses IS NULL OR used_count < max_uses)
            "#,
        )
        .bind(now)
        .bind(&coupon.id)
        .execute(&mut *tx)
        .await?;

        if claimed.rows_affected() == 0 {
            warn!(code = %code, "Coupon global limit reached at claim");
            return Err(CouponError::GlobalLimitReached { code }.into());
        }

        let usage = CouponUsage {
            id: Uuid::new_v4().to_string(),
            coupon_id: coupon.id.clone(),
            user_id: request.user_id.clone(),
            order_id: request.order_id.clone(),
            discount_amount: pricing.applied_discount(request.order_amount).minor(),
            created_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO coupon_usages (id, coupon_id, user_id, order_id, discount_amount, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(&usage.id)
        .bind(&usage.coupon_id)
        .bind(&usage.user_id)
        .bind(&usage.order_id)
        .bind(usage.discount_amount)
        .bind(usage.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            code = %code,
            user_id = %usage.user_id,
            order_id = %usage.order_id,
            discount = usage.discount_amount,
            "Coupon redeemed"
        );

        Ok(Redemption { usage, pricing })
    }

    /// Redemptions recorded against an order.
    pub async fn usages_for_order(&self, order_id: &str) -> DbResult<Vec<CouponUsage>> {
        let usages = sqlx::query_as::<_, CouponUsage>(
            r#"
            SELECT id, coupon_id, user_id, order_id, discount_amount, created_at
            FROM coupon_usages
            WHERE order_id = ?1
            ORDER BY created_at
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(usages)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Duration;
    use duka_core::DiscountKind;

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn coupon(code: &str, kind: DiscountKind, value: i64) -> Coupon {
        let now = Utc::now();
        Coupon {
            id: Uuid::new_v4().to_string(),
            tenant_id: DEFAULT_TENANT_ID.to_string(),
            code: code.to_string(),
            description: None,
            kind,
            value,
            min_order_amount: None,
            max_uses: None,
            max_uses_per_user: None,
            used_count: 0,
            starts_at: now - Duration::days(1),
            ends_at: now + Duration::days(30),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn request(code: &str, user: &str, order: &str, amount: i64) -> RedeemCoupon {
        RedeemCoupon {
            code: code.to_string(),
            user_id: user.to_string(),
            order_id: order.to_string(),
            order_amount: Money::from_minor(amount),
        }
    }

    fn coupon_code(err: DbError) -> &'static str {
        err.as_coupon_error().map(|e| e.code()).unwrap_or("not a coupon error")
    }

    #[tokio::test]
    async fn test_insert_and_lookup_normalizes_code() {
        let db = setup().await;
        let repo = db.coupons();
        let c = coupon("save10", DiscountKind::Percentage, 10);
        repo.insert(&c).await.unwrap();

        let found = repo.get_by_code("  Save10 ").await.unwrap().unwrap();
        assert_eq!(found.code, "SAVE10");
        assert_eq!(found.kind, DiscountKind::Percentage);
        assert_eq!(found.id, c.id);

        let by_id = repo.get_by_id(&c.id).await.unwrap().unwrap();
        assert_eq!(by_id.code, "SAVE10");
        assert!(repo.get_by_code("MISSING").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_insert_rejects_bad_input_and_duplicates() {
        let db = setup().await;
        let repo = db.coupons();

        let bad = coupon("SAVE", DiscountKind::Percentage, 150);
        assert!(matches!(repo.insert(&bad).await, Err(DbError::Validation(_))));

        repo.insert(&coupon("DUP", DiscountKind::Fixed, 100)).await.unwrap();
        let again = coupon("dup", DiscountKind::Fixed, 100);
        assert!(matches!(
            repo.insert(&again).await,
            Err(DbError::UniqueViolation { .. })
        ));
    }

    #[tokio::test]
    async fn test_foreign_tenant_coupon_rejected() {
        let db = setup().await;
        let repo = db.coupons();
        let mut c = coupon("ELSEWHERE", DiscountKind::Fixed, 100);
        c.tenant_id = "other-store".to_string();

        assert!(matches!(repo.insert(&c).await, Err(DbError::Validation(_))));
        assert!(repo.get_by_code("ELSEWHERE").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_redeem_percentage() {
        let db = setup().await;
        let repo = db.coupons();
        repo.insert(&coupon("SAVE10", DiscountKind::Percentage, 10)).await.unwrap();

        let r = repo.redeem(&request("save10", "u1", "o1", 100_000)).await.unwrap();
        assert_eq!(r.pricing.discount_amount.minor(), 10_000);
        assert_eq!(r.pricing.final_amount.minor(), 90_000);
        assert_eq!(r.usage.discount_amount, 10_000);

        let stored = repo.get_by_code("SAVE10").await.unwrap().unwrap();
        assert_eq!(stored.used_count, 1);
        assert_eq!(repo.user_usage_count(&stored.id, "u1").await.unwrap(), 1);
        assert_eq!(repo.usages_for_order("o1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_redeem_fixed_larger_than_order_persists_applied_amount() {
        let db = setup().await;
        let repo = db.coupons();
        repo.insert(&coupon("BIG", DiscountKind::Fixed, 50_000)).await.unwrap();

        let r = repo.redeem(&request("BIG", "u1", "o1", 20_000)).await.unwrap();
        assert_eq!(r.pricing.discount_amount.minor(), 50_000);
        assert_eq!(r.pricing.final_amount, Money::zero());
        assert_eq!(r.usage.discount_amount, 20_000);
    }

    #[tokio::test]
    async fn test_redeem_not_found() {
        let db = setup().await;
        let err = db.coupons().redeem(&request("NOPE", "u1", "o1", 1_000)).await.unwrap_err();
        assert_eq!(coupon_code(err), "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_redeem_rejections_leave_no_trace() {
        let db = setup().await;
        let repo = db.coupons();

        let mut expired = coupon("OLD", DiscountKind::Fixed, 100);
        expired.ends_at = Utc::now() - Duration::hours(1);
        repo.insert(&expired).await.unwrap();

        let mut minimum = coupon("MIN", DiscountKind::Fixed, 100);
        minimum.min_order_amount = Some(50_000);
        repo.insert(&minimum).await.unwrap();

        let err = repo.redeem(&request("OLD", "u1", "o1", 1_000)).await.unwrap_err();
        assert_eq!(coupon_code(err), "EXPIRED");

        let err = repo.redeem(&request("MIN", "u1", "o1", 49_999)).await.unwrap_err();
        assert_eq!(coupon_code(err), "BELOW_MINIMUM");

        let stored = repo.get_by_code("MIN").await.unwrap().unwrap();
        assert_eq!(stored.used_count, 0);
        assert!(repo.usages_for_order("o1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_global_limit() {
        let db = setup().await;
        let repo = db.coupons();
        let mut c = coupon("FIRST2", DiscountKind::Fixed, 500);
        c.max_uses = Some(2);
        repo.insert(&c).await.unwrap();

        repo.redeem(&request("FIRST2", "u1", "o1", 10_000)).await.unwrap();
        repo.redeem(&request("FIRST2", "u2", "o2", 10_000)).await.unwrap();
        let err = repo.redeem(&request("FIRST2", "u3", "o3", 10_000)).await.unwrap_err();
        assert_eq!(coupon_code(err), "GLOBAL_LIMIT_REACHED");

        let stored = repo.get_by_id(&c.id).await.unwrap().unwrap();
        assert_eq!(stored.used_count, 2);
    }

    #[tokio::test]
    async fn test_user_limit() {
        let db = setup().await;
        let repo = db.coupons();
        let mut c = coupon("WELCOME", DiscountKind::Percentage, 15);
        c.max_uses_per_user = Some(1);
        repo.insert(&c).await.unwrap();

        repo.redeem(&request("WELCOME", "u1", "o1", 10_000)).await.unwrap();
        let err = repo.redeem(&request("WELCOME", "u1", "o2", 10_000)).await.unwrap_err();
        assert_eq!(coupon_code(err), "USER_LIMIT_REACHED");

        // a different customer is unaffected
        repo.redeem(&request("WELCOME", "u2", "o3", 10_000)).await.unwrap();
    }

    #[tokio::test]
    async fn test_same_order_twice_is_rejected_and_rolled_back() {
        let db = setup().await;
        let repo = db.coupons();
        let c = coupon("TWICE", DiscountKind::Fixed, 100);
        repo.insert(&c).await.unwrap();

        repo.redeem(&request("TWICE", "u1", "o1", 10_000)).await.unwrap();
        let err = repo.redeem(&request("TWICE", "u1", "o1", 10_000)).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        // the used_count bump was rolled back with the failed insert
        let stored = repo.get_by_id(&c.id).await.unwrap().unwrap();
        assert_eq!(stored.used_count, 1);
    }

    #[tokio::test]
    async fn test_concurrent_redemptions_respect_global_cap() {
        let path = std::env::temp_dir().join(format!("duka-coupon-{}.db", Uuid::new_v4()));
        let db = Database::new(DbConfig::new(&path).max_connections(4)).await.unwrap();
        let repo = db.coupons();
        let mut c = coupon("RACE", DiscountKind::Fixed, 100);
        c.max_uses = Some(3);
        repo.insert(&c).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..8 {
            let repo = db.coupons();
            handles.push(tokio::spawn(async move {
                repo.redeem(&request("RACE", &format!("u{i}"), &format!("o{i}"), 10_000))
                    .await
            }));
        }

        let mut ok = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => ok += 1,
                Err(err) => assert_eq!(coupon_code(err), "GLOBAL_LIMIT_REACHED"),
            }
        }
        assert_eq!(ok, 3);
        assert_eq!(repo.get_by_id(&c.id).await.unwrap().unwrap().used_count, 3);

        db.close().await;
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_set_active_and_list_active() {
        let db = setup().await;
        let repo = db.coupons();
        let a = coupon("AAA", DiscountKind::Fixed, 100);
        let mut future = coupon("LATER", DiscountKind::Fixed, 100);
        future.starts_at = Utc::now() + Duration::days(2);
        repo.insert(&a).await.unwrap();
        repo.insert(&future).await.unwrap();

        let active = repo.list_active(Utc::now()).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].code, "AAA");

        repo.set_active(&a.id, false).await.unwrap();
        assert!(repo.list_active(Utc::now()).await.unwrap().is_empty());

        let err = repo.redeem(&request("AAA", "u1", "o1", 1_000)).await.unwrap_err();
        assert_eq!(coupon_code(err), "EXPIRED");

        assert!(matches!(
            repo.set_active("missing", true).await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_preview_does_not_consume() {
        let db = setup().await;
        let repo = db.coupons();
        let mut c = coupon("PEEK", DiscountKind::Percentage, 20);
        c.max_uses = Some(1);
        repo.insert(&c).await.unwrap();

        let p = repo.preview("peek", "u1", Money::from_minor(5_000)).await.unwrap();
        assert_eq!(p.discount_amount.minor(), 1_000);
        let p = repo.preview("peek", "u1", Money::from_minor(5_000)).await.unwrap();
        assert_eq!(p.final_amount.minor(), 4_000);

        assert_eq!(repo.get_by_id(&c.id).await.unwrap().unwrap().used_count, 0);
    }
}
