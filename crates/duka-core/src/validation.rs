//! # Validation Module
//!
//! Input validation for the storefront's boundaries.
//!
//! ## Where Validation Runs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Storefront (browser)                                         │
//! │  ├── Map pin, basic format checks                                      │
//! │  └── Immediate customer feedback                                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Route handler / admin tooling (Rust)                         │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: ranges, formats, configuration sanity                │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Pricing functions (delivery, coupon, rewards)                │
//! │  └── Assume well-formed input, never error on it                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 4: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── UNIQUE (coupon code, coupon+order, reward event per order)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use duka_core::validation::{normalize_msisdn, validate_coordinate};
//!
//! validate_coordinate(-1.2864, 36.8172).unwrap();
//! assert_eq!(normalize_msisdn("0712 345 678").unwrap(), "254712345678");
//! ```

use crate::error::ValidationError;
use crate::geo::EARTH_RADIUS_KM;
use crate::spin::total_weight;
use crate::types::{DeliveryZone, DiscountKind, SpendingBracket, SpinPrize};
use crate::DEFAULT_TENANT_ID;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest possible great-circle distance.
const MAX_DISTANCE_KM: f64 = std::f64::consts::PI * EARTH_RADIUS_KM;

/// Kenya's country calling code.
const KENYA_PREFIX: &str = "254";

// =============================================================================
// Geo Validators
// =============================================================================

/// Validates a latitude/longitude pair in decimal degrees.
///
/// ## Rules
/// - latitude in `[-90, 90]`
/// - longitude in `[-180, 180]`
/// - NaN is rejected
pub fn validate_coordinate(latitude: f64, longitude: f64) -> ValidationResult<()> {
    check_range_f64("latitude", latitude, -90.0, 90.0)?;
    check_range_f64("longitude", longitude, -180.0, 180.0)
}

/// Validates a distance before it reaches the fee policy.
///
/// ```rust
/// use duka_core::validation::validate_distance_km;
///
/// assert!(validate_distance_km(1.39).is_ok());
/// assert!(validate_distance_km(-0.1).is_err());
/// assert!(validate_distance_km(f64::NAN).is_err());
/// ```
pub fn validate_distance_km(distance_km: f64) -> ValidationResult<()> {
    check_range_f64("distance_km", distance_km, 0.0, MAX_DISTANCE_KM)
}

fn check_range_f64(field: &str, value: f64, min: f64, max: f64) -> ValidationResult<()> {
    // written this way round so NaN fails
    if !(value >= min && value <= max) {
        return Err(ValidationError::OutOfRangeF64 {
            field: field.to_string(),
            min,
            max,
            value,
        });
    }
    Ok(())
}

// =============================================================================
// Money Validators
// =============================================================================

/// Validates an order amount in minor units.
///
/// ## Rules
/// - Must be non-negative (>= 0)
pub fn validate_amount(minor: i64) -> ValidationResult<()> {
    if minor < 0 {
        return Err(ValidationError::OutOfRange {
            field: "amount".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }
    Ok(())
}

// =============================================================================
// Coupon Validators
// =============================================================================

/// Validates a coupon code as entered by an administrator.
///
/// ## Rules
/// - 3 to 32 characters after trimming
/// - Letters, digits, hyphens, underscores
///
/// ```rust
/// use duka_core::validation::validate_coupon_code;
///
/// assert!(validate_coupon_code("WELCOME10").is_ok());
/// assert!(validate_coupon_code("AB").is_err());
/// assert!(validate_coupon_code("HAS SPACE").is_err());
/// ```
pub fn validate_coupon_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.chars().count() < 3 {
        return Err(ValidationError::TooShort {
            field: "code".to_string(),
            min: 3,
        });
    }

    if code.chars().count() > 32 {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: 32,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a coupon's `value` for its kind.
///
/// ## Rules
/// - percentage: 0 to 100 inclusive
/// - fixed: positive minor units
pub fn validate_coupon_value(kind: DiscountKind, value: i64) -> ValidationResult<()> {
    match kind {
        DiscountKind::Percentage if !(0..=100).contains(&value) => {
            Err(ValidationError::OutOfRange {
                field: "value".to_string(),
                min: 0,
                max: 100,
            })
        }
        DiscountKind::Fixed if value <= 0 => Err(ValidationError::MustBePositive {
            field: "value".to_string(),
        }),
        _ => Ok(()),
    }
}

// =============================================================================
// Zone Validators
// =============================================================================

/// Validates a delivery zone before it is stored.
pub fn validate_zone(zone: &DeliveryZone) -> ValidationResult<()> {
    if zone.name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if zone.name.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 100,
        });
    }

    validate_coordinate(zone.center.latitude, zone.center.longitude)?;
    check_range_f64("radius_km", zone.radius_km, 0.0, MAX_DISTANCE_KM)?;

    if zone.fee < 0 {
        return Err(ValidationError::OutOfRange {
            field: "fee".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    if zone.estimated_minutes < 0 {
        return Err(ValidationError::OutOfRange {
            field: "estimated_minutes".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Bracket Validators
// =============================================================================

/// Validates a spending-bracket table.
///
/// ## Rules
/// - Every bracket has `0 <= min_spend <= max_spend` and a non-negative reward
/// - Brackets are listed in ascending order and do not overlap
/// - At most one open-ended bracket, and it is the last one
///
/// The accumulator takes the first match, so an overlapping table would
/// silently shadow the later bracket. This catches it at setup time.
///
/// ```rust
/// use duka_core::validation::validate_brackets;
/// use duka_core::SpendingBracket;
///
/// let b = |min, max, reward| SpendingBracket {
///     id: String::new(),
///     tenant_id: String::new(),
///     label: String::new(),
///     min_spend: min,
///     max_spend: max,
///     reward_value: reward,
/// };
///
/// assert!(validate_brackets(&[b(0, Some(30_000), 1_000), b(30_100, None, 0)]).is_ok());
/// assert!(validate_brackets(&[b(0, Some(30_000), 1_000), b(20_000, Some(40_000), 0)]).is_err());
/// ```
pub fn validate_brackets(brackets: &[SpendingBracket]) -> ValidationResult<()> {
    let mut previous: Option<&SpendingBracket> = None;

    for (index, bracket) in brackets.iter().enumerate() {
        if bracket.min_spend < 0 {
            return Err(ValidationError::OutOfRange {
                field: "min_spend".to_string(),
                min: 0,
                max: i64::MAX,
            });
        }

        if bracket.reward_value < 0 {
            return Err(ValidationError::OutOfRange {
                field: "reward_value".to_string(),
                min: 0,
                max: i64::MAX,
            });
        }

        if let Some(max) = bracket.max_spend {
            if max < bracket.min_spend {
                return Err(invalid_brackets(format!(
                    "bracket {index} has max_spend {max} below min_spend {}",
                    bracket.min_spend
                )));
            }
        }

        if let Some(prev) = previous {
            match prev.max_spend {
                None => {
                    return Err(invalid_brackets(format!(
                        "open-ended bracket {} must be last",
                        index - 1
                    )));
                }
                Some(prev_max) if bracket.min_spend <= prev_max => {
                    return Err(invalid_brackets(format!(
                        "bracket {index} starts at {} which overlaps or precedes bracket {} ending at {prev_max}",
                        bracket.min_spend,
                        index - 1
                    )));
                }
                Some(_) => {}
            }
        }

        previous = Some(bracket);
    }

    Ok(())
}

fn invalid_brackets(reason: String) -> ValidationError {
    ValidationError::InvalidBrackets { reason }
}

// =============================================================================
// Spin Validators
// =============================================================================

/// Validates a spin wheel.
///
/// ## Rules
/// - Weights, reward values, and stock are non-negative
/// - At least one prize can be won
pub fn validate_spin_prizes(prizes: &[SpinPrize]) -> ValidationResult<()> {
    for prize in prizes {
        if prize.label.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "label".to_string(),
            });
        }
        if prize.weight < 0 {
            return Err(ValidationError::OutOfRange {
                field: "weight".to_string(),
                min: 0,
                max: i64::MAX,
            });
        }
        if prize.reward_value < 0 {
            return Err(ValidationError::OutOfRange {
                field: "reward_value".to_string(),
                min: 0,
                max: i64::MAX,
            });
        }
        if prize.stock_remaining.is_some_and(|s| s < 0) {
            return Err(ValidationError::OutOfRange {
                field: "stock_remaining".to_string(),
                min: 0,
                max: i64::MAX,
            });
        }
    }

    if total_weight(prizes) <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "total weight".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Identity Validators
// =============================================================================

/// Normalizes a Kenyan mobile number to `2547XXXXXXXX` / `2541XXXXXXXX`.
///
/// Accepts `07…`, `01…`, `+254…`, `254…` and the bare 9-digit form, with
/// spaces or hyphens anywhere.
///
/// ```rust
/// use duka_core::validation::normalize_msisdn;
///
/// assert_eq!(normalize_msisdn("+254 712-345-678").unwrap(), "254712345678");
/// assert_eq!(normalize_msisdn("0110123456").unwrap(), "254110123456");
/// assert!(normalize_msisdn("0812345678").is_err());
/// ```
pub fn normalize_msisdn(phone: &str) -> ValidationResult<String> {
    let trimmed = phone.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required {
            field: "phone".to_string(),
        });
    }

    let without_plus = trimmed.strip_prefix('+').unwrap_or(trimmed);
    let digits: String = without_plus
        .chars()
        .filter(|c| *c != ' ' && *c != '-')
        .collect();

    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid_phone("must contain only digits"));
    }

    let national = match digits.len() {
        12 if digits.starts_with(KENYA_PREFIX) => &digits[3..],
        10 if digits.starts_with('0') => &digits[1..],
        9 => digits.as_str(),
        _ => return Err(invalid_phone("must be a 9-digit Kenyan mobile number")),
    };

    if !(national.starts_with('7') || national.starts_with('1')) {
        return Err(invalid_phone("must be a Safaricom/Airtel mobile number (07 or 01)"));
    }

    Ok(format!("{KENYA_PREFIX}{national}"))
}

fn invalid_phone(reason: &str) -> ValidationError {
    ValidationError::InvalidFormat {
        field: "phone".to_string(),
        reason: reason.to_string(),
    }
}

/// Validates a UUID string format.
///
/// ```rust
/// use duka_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

/// Rejects rows addressed to any tenant other than the one this runtime serves.
///
/// Lookups are scoped to [`DEFAULT_TENANT_ID`], so a row stored under another
/// tenant could never be read back.
pub fn validate_tenant_id(tenant_id: &str) -> ValidationResult<()> {
    if tenant_id != DEFAULT_TENANT_ID {
        return Err(ValidationError::InvalidFormat {
            field: "tenant_id".to_string(),
            reason: format!("must be {DEFAULT_TENANT_ID}"),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Coordinate;
    use chrono::Utc;

    fn bracket(min: i64, max: Option<i64>) -> SpendingBracket {
        SpendingBracket {
            id: "b".to_string(),
            tenant_id: "t".to_string(),
            label: "b".to_string(),
            min_spend: min,
            max_spend: max,
            reward_value: 100,
        }
    }

    fn prize(weight: i64, stock: Option<i64>) -> SpinPrize {
        SpinPrize {
            id: "p".to_string(),
            tenant_id: "t".to_string(),
            label: "Prize".to_string(),
            weight,
            reward_value: 0,
            stock_remaining: stock,
            is_active: true,
        }
    }

    #[test]
    fn test_validate_coordinate() {
        assert!(validate_coordinate(0.0, 0.0).is_ok());
        assert!(validate_coordinate(90.0, 180.0).is_ok());
        assert!(validate_coordinate(-90.0, -180.0).is_ok());
        assert!(validate_coordinate(90.1, 0.0).is_err());
        assert!(validate_coordinate(0.0, -180.5).is_err());
        assert!(validate_coordinate(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_validate_distance_km() {
        assert!(validate_distance_km(0.0).is_ok());
        assert!(validate_distance_km(12.5).is_ok());
        assert!(validate_distance_km(-1.0).is_err());
        assert!(validate_distance_km(f64::INFINITY).is_err());
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount(0).is_ok());
        assert!(validate_amount(45_000).is_ok());
        assert!(validate_amount(-1).is_err());
    }

    #[test]
    fn test_validate_coupon_code() {
        assert!(validate_coupon_code("SAVE10").is_ok());
        assert!(validate_coupon_code("new_customer-2024").is_ok());
        assert!(validate_coupon_code("").is_err());
        assert!(validate_coupon_code("   ").is_err());
        assert!(validate_coupon_code("AB").is_err());
        assert!(validate_coupon_code(&"A".repeat(33)).is_err());
        assert!(validate_coupon_code("50%OFF").is_err());
    }

    #[test]
    fn test_validate_coupon_value() {
        assert!(validate_coupon_value(DiscountKind::Percentage, 0).is_ok());
        assert!(validate_coupon_value(DiscountKind::Percentage, 100).is_ok());
        assert!(validate_coupon_value(DiscountKind::Percentage, 101).is_err());
        assert!(validate_coupon_value(DiscountKind::Percentage, -5).is_err());
        assert!(validate_coupon_value(DiscountKind::Fixed, 10_000).is_ok());
        assert!(validate_coupon_value(DiscountKind::Fixed, 0).is_err());
    }

    #[test]
    fn test_validate_zone() {
        let mut zone = DeliveryZone {
            id: "z".to_string(),
            tenant_id: "t".to_string(),
            name: "Westlands".to_string(),
            center: Coordinate::new(-1.2676, 36.8108),
            radius_km: 3.0,
            free_delivery: false,
            fee: 15_000,
            estimated_minutes: 45,
            is_active: true,
            created_at: Utc::now(),
        };
        assert!(validate_zone(&zone).is_ok());

        zone.radius_km = -1.0;
        assert!(validate_zone(&zone).is_err());

        zone.radius_km = 3.0;
        zone.center = Coordinate::new(-95.0, 36.8);
        assert!(validate_zone(&zone).is_err());

        zone.center = Coordinate::new(-1.2676, 36.8108);
        zone.name = " ".to_string();
        assert!(validate_zone(&zone).is_err());
    }

    #[test]
    fn test_validate_brackets_accepts_ladder() {
        let ladder = vec![
            bracket(10_000, Some(30_000)),
            bracket(30_100, Some(50_000)),
            bracket(50_100, Some(100_000)),
            bracket(100_100, None),
        ];
        assert!(validate_brackets(&ladder).is_ok());
        assert!(validate_brackets(&[]).is_ok());
    }

    #[test]
    fn test_validate_brackets_rejects_overlap() {
        let overlapping = vec![bracket(0, Some(50_000)), bracket(40_000, Some(60_000))];
        assert!(matches!(
            validate_brackets(&overlapping),
            Err(ValidationError::InvalidBrackets { .. })
        ));

        let touching = vec![bracket(0, Some(50_000)), bracket(50_000, Some(60_000))];
        assert!(validate_brackets(&touching).is_err());
    }

    #[test]
    fn test_validate_brackets_rejects_bad_order_and_open_ended() {
        let descending = vec![bracket(50_100, Some(100_000)), bracket(0, Some(50_000))];
        assert!(validate_brackets(&descending).is_err());

        let open_not_last = vec![bracket(0, None), bracket(50_000, Some(60_000))];
        assert!(validate_brackets(&open_not_last).is_err());

        let two_open = vec![bracket(0, Some(10)), bracket(100, None), bracket(200, None)];
        assert!(validate_brackets(&two_open).is_err());

        let inverted = vec![bracket(500, Some(100))];
        assert!(validate_brackets(&inverted).is_err());

        let negative = vec![bracket(-1, Some(100))];
        assert!(matches!(
            validate_brackets(&negative),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_validate_tenant_id() {
        assert!(validate_tenant_id(DEFAULT_TENANT_ID).is_ok());
        assert!(matches!(
            validate_tenant_id("00000000-0000-0000-0000-000000000002"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(validate_tenant_id("").is_err());
    }

    #[test]
    fn test_validate_spin_prizes() {
        assert!(validate_spin_prizes(&[prize(5, None), prize(0, None)]).is_ok());
        assert!(validate_spin_prizes(&[]).is_err());
        assert!(validate_spin_prizes(&[prize(0, None)]).is_err());
        assert!(validate_spin_prizes(&[prize(5, Some(0))]).is_err());
        assert!(validate_spin_prizes(&[prize(-1, None), prize(5, None)]).is_err());
        assert!(validate_spin_prizes(&[prize(5, Some(-2))]).is_err());
    }

    #[test]
    fn test_normalize_msisdn() {
        for input in [
            "0712345678",
            "712345678",
            "254712345678",
            "+254712345678",
            " +254 712 345 678 ",
            "0712-345-678",
        ] {
            assert_eq!(normalize_msisdn(input).unwrap(), "254712345678", "{input}");
        }
        assert_eq!(normalize_msisdn("0110123456").unwrap(), "254110123456");

        assert!(normalize_msisdn("").is_err());
        assert!(normalize_msisdn("07123").is_err());
        assert!(normalize_msisdn("0512345678").is_err());
        assert!(normalize_msisdn("07123456789").is_err());
        assert!(normalize_msisdn("07l2345678").is_err());
        assert!(normalize_msisdn("255712345678").is_err());
    }

    #[test]
    fn test_validate_uuid() {
        assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
        assert!(validate_uuid("").is_err());
        assert!(validate_uuid("123").is_err());
    }
}
