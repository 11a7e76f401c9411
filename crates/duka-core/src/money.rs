//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌                                  │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units                                      │
//! │    KES 1,000.00 is stored as 100000                                     │
//! │    10% off is floor(100000 × 10 / 100) = 10000 → KES 100.00             │
//! │                                                                         │
//! │  Floats only ever appear in distances (km), never in amounts.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use duka_core::money::Money;
//!
//! let subtotal = Money::from_minor(150_000); // KES 1,500.00
//! let discount = subtotal.percentage_floor(10);
//! assert_eq!(discount.minor(), 15_000);
//!
//! let fee = Money::from_minor(5_390).round_to_nearest(1_000);
//! assert_eq!(fee.minor(), 5_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

/// Currency label used by `Display`. Storage is currency-agnostic.
pub const CURRENCY: &str = "KES";

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: a discount larger than the order produces a negative
///   intermediate before clamping; keeping the sign makes that visible
/// - **Single field tuple struct**: zero-cost abstraction over i64
///
/// ## Where Money is Used
/// ```text
/// order amount ──► coupon pricing ──► final amount ──► payment request
///      │
///      └──► reward bracket spend ──► bracket reward
///
/// distance (km, f64) ──► delivery fee ──► rounded Money
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ```rust
    /// use duka_core::money::Money;
    ///
    /// let price = Money::from_minor(1099); // KES 10.99
    /// assert_eq!(price.minor(), 1099);
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// For negative amounts only the major unit should be negative:
    /// `from_major_minor(-5, 50)` is -5.50, not -4.50.
    ///
    /// ```rust
    /// use duka_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(10, 99).minor(), 1099);
    /// assert_eq!(Money::from_major_minor(-5, 50).minor(), -550);
    /// ```
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion (truncated toward zero).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns `self` or zero, whichever is larger.
    ///
    /// ```rust
    /// use duka_core::money::Money;
    ///
    /// let owed = Money::from_minor(20_000) - Money::from_minor(50_000);
    /// assert_eq!(owed.clamp_non_negative(), Money::zero());
    /// ```
    #[inline]
    pub const fn clamp_non_negative(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            Money(self.0)
        }
    }

    /// Returns `floor(self × pct / 100)`.
    ///
    /// Percentage coupons always round down so the customer never receives
    /// more than the advertised percentage.
    ///
    /// ```rust
    /// use duka_core::money::Money;
    ///
    /// assert_eq!(Money::from_minor(100_000).percentage_floor(10).minor(), 10_000);
    /// assert_eq!(Money::from_minor(999).percentage_floor(15).minor(), 149);
    /// ```
    pub fn percentage_floor(&self, pct: i64) -> Money {
        // i128 keeps large order amounts from overflowing before the division
        let product = self.0 as i128 * pct as i128;
        Money(product.div_euclid(100) as i64)
    }

    /// Rounds to the nearest multiple of `step` (half rounds up).
    ///
    /// A non-positive `step` leaves the value unchanged.
    ///
    /// ```rust
    /// use duka_core::money::Money;
    ///
    /// assert_eq!(Money::from_minor(5_390).round_to_nearest(1_000).minor(), 5_000);
    /// assert_eq!(Money::from_minor(5_500).round_to_nearest(1_000).minor(), 6_000);
    /// assert_eq!(Money::from_minor(5_394).round_to_nearest(10).minor(), 5_390);
    /// ```
    pub fn round_to_nearest(&self, step: i64) -> Money {
        if step <= 0 {
            return *self;
        }
        let half = step / 2;
        Money((self.0 + half).div_euclid(step) * step)
    }

    /// Multiplies by an item quantity.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly display (`KES 12.34`). Frontends do their own localisation.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}{} {}.{:02}",
            sign,
            CURRENCY,
            self.major().abs(),
            self.minor_part()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_minor() {
        let money = Money::from_minor(1099);
        assert_eq!(money.minor(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor_part(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_minor(1099).to_string(), "KES 10.99");
        assert_eq!(Money::from_minor(500).to_string(), "KES 5.00");
        assert_eq!(Money::from_minor(-550).to_string(), "-KES 5.50");
    }

    #[test]
    fn test_percentage_floor_rounds_down() {
        // 15% of 9.99 = 1.4985 → 1.49
        assert_eq!(Money::from_minor(999).percentage_floor(15).minor(), 149);
        assert_eq!(Money::from_minor(100_000).percentage_floor(100).minor(), 100_000);
        assert_eq!(Money::from_minor(0).percentage_floor(50).minor(), 0);
    }

    #[test]
    fn test_round_to_nearest() {
        assert_eq!(Money::from_minor(5_390).round_to_nearest(1_000).minor(), 5_000);
        assert_eq!(Money::from_minor(5_499).round_to_nearest(1_000).minor(), 5_000);
        assert_eq!(Money::from_minor(5_500).round_to_nearest(1_000).minor(), 6_000);
        assert_eq!(Money::from_minor(4).round_to_nearest(10).minor(), 0);
        assert_eq!(Money::from_minor(777).round_to_nearest(0).minor(), 777);
    }

    #[test]
    fn test_clamp_non_negative() {
        assert_eq!(Money::from_minor(-1).clamp_non_negative(), Money::zero());
        assert_eq!(Money::from_minor(42).clamp_non_negative().minor(), 42);
    }

    #[test]
    fn test_arithmetic_and_sum() {
        let a = Money::from_minor(1000);
        let b = Money::from_minor(500);
        assert_eq!((a + b).minor(), 1500);
        assert_eq!((a - b).minor(), 500);
        assert_eq!((a * 3).minor(), 3000);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.minor(), 2000);
    }
}
