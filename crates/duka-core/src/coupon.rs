//! # Coupon Module
//!
//! Validates a coupon against an order and prices the discount.
//!
//! ## Where This Sits
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  checkout route                                                         │
//! │       │ normalize_code("save10") → "SAVE10"                             │
//! │       ▼                                                                 │
//! │  CouponRepository::redeem  (duka-db, one transaction)                   │
//! │       │  lookup ──► NotFound                                            │
//! │       │  count user usages                                              │
//! │       ▼                                                                 │
//! │  validate_and_price  ← THIS MODULE (pure, snapshot only)                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  guarded UPDATE used_count + INSERT coupon_usages                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The evaluator answers "is this legal and what does it cost" for one
//! snapshot. It does not make redemption atomic; the repository does.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CouponError;
use crate::money::Money;
use crate::types::{Coupon, DiscountKind};

/// Result of pricing a coupon against an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CouponPricing {
    /// The coupon's face discount. For fixed coupons this can exceed the
    /// order amount; it is reported as-is.
    pub discount_amount: Money,
    /// `max(0, order_amount - discount_amount)`.
    pub final_amount: Money,
}

impl CouponPricing {
    /// The amount actually taken off the order: never negative and never
    /// more than the order amount. This is what gets persisted.
    pub fn applied_discount(&self, order_amount: Money) -> Money {
        order_amount - self.final_amount
    }
}

/// Normalizes a customer-entered code for lookup (trimmed, uppercase).
///
/// ```rust
/// use duka_core::coupon::normalize_code;
///
/// assert_eq!(normalize_code("  save10 "), "SAVE10");
/// ```
pub fn normalize_code(code: &str) -> String {
    code.trim().to_uppercase()
}

/// Checks `coupon` against an order and prices it.
///
/// ## Arguments
/// * `order_amount` - Order subtotal in minor units
/// * `user_prior_usage` - How many times this user has already redeemed it
/// * `now` - Current time in UTC (passed in to keep this function pure)
///
/// ## Validation Order (first failure wins)
/// 1. inactive, or `now` outside `[starts_at, ends_at]` → `Expired`
/// 2. `order_amount < min_order_amount` → `BelowMinimum`
/// 3. `used_count >= max_uses` → `GlobalLimitReached`
/// 4. `user_prior_usage >= max_uses_per_user` → `UserLimitReached`
///
/// ## Pricing
/// - percentage: `floor(order_amount × value / 100)`
/// - fixed: `value`
/// - `final_amount = max(0, order_amount - discount_amount)`
///
/// ```rust
/// use chrono::{Duration, Utc};
/// use duka_core::coupon::validate_and_price;
/// use duka_core::{Coupon, DiscountKind, Money};
///
/// let now = Utc::now();
/// let coupon = Coupon {
///     id: "c1".into(),
///     tenant_id: "t1".into(),
///     code: "SAVE10".into(),
///     description: None,
///     kind: DiscountKind::Percentage,
///     value: 10,
///     min_order_amount: None,
///     max_uses: None,
///     max_uses_per_user: None,
///     used_count: 0,
///     starts_at: now - Duration::days(1),
///     ends_at: now + Duration::days(1),
///     is_active: true,
///     created_at: now,
///     updated_at: now,
/// };
///
/// let pricing = validate_and_price(&coupon, Money::from_minor(100_000), 0, now).unwrap();
/// assert_eq!(pricing.discount_amount.minor(), 10_000);
/// assert_eq!(pricing.final_amount.minor(), 90_000);
/// ```
pub fn validate_and_price(
    coupon: &Coupon,
    order_amount: Money,
    user_prior_usage: i64,
    now: DateTime<Utc>,
) -> Result<CouponPricing, CouponError> {
    if !coupon.is_active || !coupon.is_within_window(now) {
        return Err(CouponError::Expired {
            code: coupon.code.clone(),
        });
    }

    if let Some(minimum) = coupon.min_order() {
        if order_amount < minimum {
            return Err(CouponError::BelowMinimum {
                minimum,
                actual: order_amount,
            });
        }
    }

    if let Some(max_uses) = coupon.max_uses {
        if coupon.used_count >= max_uses {
            return Err(CouponError::GlobalLimitReached {
                code: coupon.code.clone(),
            });
        }
    }

    if let Some(per_user) = coupon.max_uses_per_user {
        if user_prior_usage >= per_user {
            return Err(CouponError::UserLimitReached {
                code: coupon.code.clone(),
            });
        }
    }

    Ok(price(coupon, order_amount))
}

/// Prices a coupon without any eligibility checks (admin previews).
pub fn price(coupon: &Coupon, order_amount: Money) -> CouponPricing {
    let discount_amount = match coupon.kind {
        DiscountKind::Percentage => order_amount.percentage_floor(coupon.value),
        DiscountKind::Fixed => Money::from_minor(coupon.value),
    };

    CouponPricing {
        discount_amount,
        final_amount: (order_amount - discount_amount).clamp_non_negative(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
