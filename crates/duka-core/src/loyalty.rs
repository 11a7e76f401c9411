//! # Loyalty Module
//!
//! Points earned per order and the tier a customer's lifetime points put
//! them in.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

/// Loyalty tiers, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum LoyaltyTier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

impl std::fmt::Display for LoyaltyTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoyaltyTier::Bronze => write!(f, "bronze"),
            LoyaltyTier::Silver => write!(f, "silver"),
            LoyaltyTier::Gold => write!(f, "gold"),
            LoyaltyTier::Platinum => write!(f, "platinum"),
        }
    }
}

/// Earning rate and tier thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LoyaltyConfig {
    /// Minor units of spend per point (10_000 = one point per KES 100).
    pub minor_units_per_point: i64,
    /// Lifetime points needed for Silver.
    pub silver_threshold: i64,
    pub gold_threshold: i64,
    pub platinum_threshold: i64,
}

impl Default for LoyaltyConfig {
    fn default() -> Self {
        LoyaltyConfig {
            minor_units_per_point: 10_000,
            silver_threshold: 500,
            gold_threshold: 2_000,
            platinum_threshold: 5_000,
        }
    }
}

/// Points earned for an order of `amount`. Floors; never negative.
///
/// ```rust
/// use duka_core::loyalty::{points_for_order, LoyaltyConfig};
/// use duka_core::Money;
///
/// let config = LoyaltyConfig::default();
/// assert_eq!(points_for_order(Money::from_major_minor(1_299, 0), &config), 12);
/// ```
pub fn points_for_order(amount: Money, config: &LoyaltyConfig) -> i64 {
    if config.minor_units_per_point <= 0 || !amount.is_positive() {
        return 0;
    }
    amount.minor() / config.minor_units_per_point
}

/// Tier for a lifetime point balance.
pub fn tier_for_points(points: i64, config: &LoyaltyConfig) -> LoyaltyTier {
    if points >= config.platinum_threshold {
        LoyaltyTier::Platinum
    } else if points >= config.gold_threshold {
        LoyaltyTier::Gold
    } else if points >= config.silver_threshold {
        LoyaltyTier::Silver
    } else {
        LoyaltyTier::Bronze
    }
}
