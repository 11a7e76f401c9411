//! # Domain Types
//!
//! Core domain types used throughout Duka.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   Coordinate    │   │  DeliveryZone   │   │     Coupon      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  latitude       │◄──│  center         │   │  code (UPPER)   │       │
//! │  │  longitude      │   │  radius_km      │   │  kind, value    │       │
//! │  └─────────────────┘   │  free_delivery  │   │  caps, window   │       │
//! │                        │  fee            │   │  used_count     │       │
//! │                        └─────────────────┘   └────────┬────────┘       │
//! │                                                       │ 1..n           │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌────────▼────────┐       │
//! │  │ SpendingBracket │   │RewardBracketState│  │  CouponUsage    │       │
//! │  │  min..max spend │   │  cumulative spend│  │  coupon+order   │       │
//! │  │  reward_value   │   │  order_count     │  │  (unique pair)  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐                                                   │
//! │  │   SpinPrize     │  weight + limited stock                           │
//! │  └─────────────────┘                                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Money Fields
//! Entities store amounts as `i64` minor units (that is what the database
//! holds) and expose `Money` accessors for arithmetic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Coordinate
// =============================================================================

/// A WGS84 position in decimal degrees.
///
/// Range checks live in [`crate::validation::validate_coordinate`]; pricing
/// functions assume well-formed input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    #[inline]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Coordinate {
            latitude,
            longitude,
        }
    }
}

// =============================================================================
// Delivery Zone
// =============================================================================

/// A circular delivery area around a center point.
///
/// Zones are configuration data: created by an administrator, read by the
/// matcher, soft-disabled via `is_active`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct DeliveryZone {
    pub id: String,
    pub tenant_id: String,
    /// Display name, e.g. "Westlands".
    pub name: String,
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub center: Coordinate,
    /// Radius in kilometers (never negative).
    pub radius_km: f64,
    /// Zones flagged free win over paid zones when both contain a point.
    pub free_delivery: bool,
    /// Fee in minor units charged for paid zones.
    pub fee: i64,
    /// Estimated delivery time shown at checkout.
    pub estimated_minutes: i64,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl DeliveryZone {
    #[inline]
    pub fn fee(&self) -> Money {
        if self.free_delivery {
            Money::zero()
        } else {
            Money::from_minor(self.fee)
        }
    }
}

// =============================================================================
// Discount Kind
// =============================================================================

/// How a coupon's `value` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    /// `value` is a whole percentage (10 = 10% off).
    Percentage,
    /// `value` is an amount in minor units.
    Fixed,
}

impl std::fmt::Display for DiscountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DiscountKind::Percentage => write!(f, "percentage"),
            DiscountKind::Fixed => write!(f, "fixed"),
        }
    }
}

// =============================================================================
// Coupon
// =============================================================================

/// A discount code.
///
/// ## Lifecycle
/// - Created by an administrator
/// - `used_count` increments on each successful redemption
/// - Never physically deleted; `is_active = false` disables it
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Coupon {
    pub id: String,
    pub tenant_id: String,
    /// Always stored uppercase (see [`crate::coupon::normalize_code`]).
    pub code: String,
    pub description: Option<String>,
    pub kind: DiscountKind,
    /// Percentage (0-100) or fixed amount in minor units, depending on `kind`.
    pub value: i64,
    pub min_order_amount: Option<i64>,
    /// Global redemption cap.
    pub max_uses: Option<i64>,
    pub max_uses_per_user: Option<i64>,
    pub used_count: i64,
    #[ts(as = "String")]
    pub starts_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub ends_at: DateTime<Utc>,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Coupon {
    /// Returns the minimum order amount, if the coupon has one.
    #[inline]
    pub fn min_order(&self) -> Option<Money> {
        self.min_order_amount.map(Money::from_minor)
    }

    /// True while `now` sits inside the inclusive validity window.
    pub fn is_within_window(&self, now: DateTime<Utc>) -> bool {
        self.starts_at <= now && now <= self.ends_at
    }

    /// Remaining global redemptions, `None` when uncapped.
    pub fn remaining_uses(&self) -> Option<i64> {
        self.max_uses.map(|max| (max - self.used_count).max(0))
    }
}

// =============================================================================
// Coupon Usage
// =============================================================================

/// One redemption of a coupon on an order.
///
/// At most one row exists per (coupon, order); the per-user count of these
/// rows enforces `max_uses_per_user`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CouponUsage {
    pub id: String,
    pub coupon_id: String,
    pub user_id: String,
    pub order_id: String,
    /// Amount actually taken off the order.
    pub discount_amount: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Spending Bracket
// =============================================================================

/// A contiguous spend range mapped to a bonus reward.
///
/// `max_spend = None` marks the open-ended "customizable" bracket. It carries
/// no automatic reward; an administrator decides the bonus by hand.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SpendingBracket {
    pub id: String,
    pub tenant_id: String,
    pub label: String,
    /// Inclusive lower bound in minor units.
    pub min_spend: i64,
    /// Inclusive upper bound in minor units.
    pub max_spend: Option<i64>,
    pub reward_value: i64,
}

impl SpendingBracket {
    /// True if `spend` falls inside `[min_spend, max_spend]`.
    pub fn contains(&self, spend: Money) -> bool {
        let spend = spend.minor();
        spend >= self.min_spend && self.max_spend.map_or(true, |max| spend <= max)
    }

    #[inline]
    pub fn is_open_ended(&self) -> bool {
        self.max_spend.is_none()
    }

    #[inline]
    pub fn reward(&self) -> Money {
        Money::from_minor(self.reward_value)
    }
}

// =============================================================================
// Reward Bracket State
// =============================================================================

/// Per-user accumulator for the current bracket.
///
/// Reset to zero every time `order_count` reaches
/// [`crate::rewards::BRACKET_SIZE`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct RewardBracketState {
    pub user_id: String,
    pub cumulative_spend: i64,
    pub order_count: i64,
}

impl RewardBracketState {
    /// A fresh accumulator for a user with no orders in the current bracket.
    pub fn new(user_id: impl Into<String>) -> Self {
        RewardBracketState {
            user_id: user_id.into(),
            cumulative_spend: 0,
            order_count: 0,
        }
    }

    #[inline]
    pub fn spend(&self) -> Money {
        Money::from_minor(self.cumulative_spend)
    }
}

// =============================================================================
// Spin Prize
// =============================================================================

/// A slice of the spin wheel.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SpinPrize {
    pub id: String,
    pub tenant_id: String,
    pub label: String,
    /// Relative weight; 0 never wins.
    pub weight: i64,
    /// Value in minor units (0 for "try again" slices).
    pub reward_value: i64,
    /// `None` means unlimited.
    pub stock_remaining: Option<i64>,
    pub is_active: bool,
}

impl SpinPrize {
    /// Whether this slice can currently be won.
    pub fn is_eligible(&self) -> bool {
        self.is_active && self.weight > 0 && self.stock_remaining.map_or(true, |s| s > 0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn bracket(min: i64, max: Option<i64>, reward: i64) -> SpendingBracket {
        SpendingBracket {
            id: "b".to_string(),
            tenant_id: "t".to_string(),
            label: "test".to_string(),
            min_spend: min,
            max_spend: max,
            reward_value: reward,
        }
    }

    #[test]
    fn test_bracket_contains_is_inclusive() {
        let b = bracket(30_100, Some(50_000), 2_000);
        assert!(b.contains(Money::from_minor(30_100)));
        assert!(b.contains(Money::from_minor(50_000)));
        assert!(!b.contains(Money::from_minor(30_099)));
        assert!(!b.contains(Money::from_minor(50_001)));
    }

    #[test]
    fn test_open_ended_bracket() {
        let b = bracket(100_100, None, 0);
        assert!(b.is_open_ended());
        assert!(b.contains(Money::from_minor(i64::MAX)));
    }

    #[test]
    fn test_coupon_window_and_remaining() {
        let now = Utc::now();
        let coupon = Coupon {
            id: "c".to_string(),
            tenant_id: "t".to_string(),
            code: "SAVE".to_string(),
            description: None,
            kind: DiscountKind::Fixed,
            value: 100,
            min_order_amount: None,
            max_uses: Some(3),
            max_uses_per_user: None,
            used_count: 5,
            starts_at: now - Duration::days(1),
            ends_at: now,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        assert!(coupon.is_within_window(now));
        assert!(!coupon.is_within_window(now + Duration::seconds(1)));
        assert_eq!(coupon.remaining_uses(), Some(0));
    }

    #[test]
    fn test_spin_prize_eligibility() {
        let mut prize = SpinPrize {
            id: "p".to_string(),
            tenant_id: "t".to_string(),
            label: "Free delivery".to_string(),
            weight: 10,
            reward_value: 0,
            stock_remaining: None,
            is_active: true,
        };
        assert!(prize.is_eligible());
        prize.stock_remaining = Some(0);
        assert!(!prize.is_eligible());
        prize.stock_remaining = Some(1);
        prize.weight = 0;
        assert!(!prize.is_eligible());
    }

    #[test]
    fn test_discount_kind_serde() {
        assert_eq!(
            serde_json::to_string(&DiscountKind::Percentage).unwrap(),
            "\"percentage\""
        );
        assert_eq!(DiscountKind::Fixed.to_string(), "fixed");
    }
}
