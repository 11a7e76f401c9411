//! # Delivery Module
//!
//! Delivery fees by distance and delivery-zone matching.
//!
//! ## Two Ways to Price Delivery
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. Distance policy (single store location)                             │
//! │                                                                         │
//! │     store ──distance_km──► customer                                     │
//! │                 │                                                       │
//! │                 ├── <= free_radius_km ──► KES 0, "free"                 │
//! │                 │                                                       │
//! │                 └── > free_radius_km  ──► base + km × rate,             │
//! │                                           rounded to rounding_step      │
//! │                                                                         │
//! │  2. Named zones (configured circles)                                    │
//! │                                                                         │
//! │     customer ──► every zone containing the point                        │
//! │                    │                                                    │
//! │                    ├── any free zone?  ──► first free zone              │
//! │                    ├── any paid zone?  ──► first paid zone              │
//! │                    └── none            ──► outside service area         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Neither path raises errors. "Outside the free radius" and "no zone" are
//! ordinary outcomes.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::geo::distance_km;
use crate::money::Money;
use crate::types::{Coordinate, DeliveryZone};

/// Label for deliveries inside the free radius.
pub const FREE_LABEL: &str = "free";

/// Label for charged deliveries.
pub const PAID_LABEL: &str = "paid";

// =============================================================================
// Fee Policy
// =============================================================================

/// Distance-based fee settings for a store.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DeliveryFeeConfig {
    /// Deliveries at or inside this distance are free.
    pub free_radius_km: f64,
    /// Flat part of a paid delivery, minor units.
    pub base_fee: i64,
    /// Charge per kilometer, minor units.
    pub per_km_fee: i64,
    /// Fees are rounded to the nearest multiple of this (1000 = KES 10).
    pub rounding_step: i64,
}

impl Default for DeliveryFeeConfig {
    /// 700 m free radius, KES 40 base, KES 10/km, rounded to KES 10.
    fn default() -> Self {
        DeliveryFeeConfig {
            free_radius_km: 0.70,
            base_fee: 4_000,
            per_km_fee: 1_000,
            rounding_step: 1_000,
        }
    }
}

/// The priced result of the fee policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DeliveryFee {
    pub fee: Money,
    pub is_free: bool,
    /// `"free"` or `"paid"`.
    pub zone_label: String,
}

impl DeliveryFee {
    fn free() -> Self {
        DeliveryFee {
            fee: Money::zero(),
            is_free: true,
            zone_label: FREE_LABEL.to_string(),
        }
    }
}

/// Prices a delivery of `distance_km` under `config`.
///
/// Callers validate the distance first; negative values are rejected by
/// [`crate::validation::validate_distance_km`].
///
/// A positive raw fee never rounds down to zero: the smallest paid fee is one
/// rounding step.
///
/// ```rust
/// use duka_core::delivery::{delivery_fee, DeliveryFeeConfig};
///
/// let config = DeliveryFeeConfig::default();
///
/// let near = delivery_fee(0.5, &config);
/// assert!(near.is_free);
///
/// // 4000 + 1.39 × 1000 = 5390 → nearest KES 10 → 5000
/// let far = delivery_fee(1.39, &config);
/// assert_eq!(far.fee.minor(), 5_000);
/// assert!(!far.is_free);
/// ```
pub fn delivery_fee(distance_km: f64, config: &DeliveryFeeConfig) -> DeliveryFee {
    if distance_km <= config.free_radius_km {
        return DeliveryFee::free();
    }

    let step = config.rounding_step.max(1);
    let raw = config.base_fee as f64 + distance_km * config.per_km_fee as f64;

    // one rounding, half-up, straight from the exact raw fee
    let steps = (raw / step as f64 + 0.5).floor() as i64;
    let mut fee = Money::from_minor(steps * step);
    if raw > 0.0 && !fee.is_positive() {
        fee = Money::from_minor(step);
    }

    DeliveryFee {
        fee,
        is_free: false,
        zone_label: PAID_LABEL.to_string(),
    }
}

// =============================================================================
// Quote
// =============================================================================

/// Distance plus fee, as shown at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DeliveryQuote {
    pub distance_km: f64,
    #[serde(flatten)]
    pub fee: DeliveryFee,
}

/// Measures `origin → destination` and prices it.
pub fn quote(origin: Coordinate, destination: Coordinate, config: &DeliveryFeeConfig) -> DeliveryQuote {
    let distance = distance_km(origin, destination);
    DeliveryQuote {
        distance_km: distance,
        fee: delivery_fee(distance, config),
    }
}

// =============================================================================
// Zone Matcher
// =============================================================================

/// True if `point` lies inside `zone` (boundary inclusive).
pub fn zone_contains(zone: &DeliveryZone, point: Coordinate) -> bool {
    distance_km(point, zone.center) <= zone.radius_km
}

/// Finds the zone that serves `point`.
///
/// ## Tie-break
/// 1. Any matching free zone beats every matching paid zone, whatever the
///    input order.
/// 2. Among free zones (or, failing that, paid zones) the first in input
///    order wins.
///
/// `None` means the point is outside the service area.
pub fn find_zone(point: Coordinate, zones: &[DeliveryZone]) -> Option<&DeliveryZone> {
    let mut first_paid: Option<&DeliveryZone> = None;

    for zone in zones.iter().filter(|z| zone_contains(z, point)) {
        if zone.free_delivery {
            return Some(zone);
        }
        if first_paid.is_none() {
            first_paid = Some(zone);
        }
    }

    first_paid
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn zone(name: &str, center: Coordinate, radius_km: f64, free: bool, fee: i64) -> DeliveryZone {
        DeliveryZone {
            id: name.to_lowercase(),
            tenant_id: "t".to_string(),
            name: name.to_string(),
            center,
            radius_km,
            free_delivery: free,
            fee,
            estimated_minutes: 30,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    /// A point roughly `km` kilometers due north of `origin`.
    fn north_of(origin: Coordinate, km: f64) -> Coordinate {
        let degrees = km / (crate::geo::EARTH_RADIUS_KM * std::f64::consts::PI / 180.0);
        Coordinate::new(origin.latitude + degrees, origin.longitude)
    }

    #[test]
    fn test_inside_free_radius_is_free() {
        let config = DeliveryFeeConfig::default();
        for d in [0.0, 0.3, 0.70] {
            let fee = delivery_fee(d, &config);
            assert!(fee.is_free);
            assert_eq!(fee.fee, Money::zero());
            assert_eq!(fee.zone_label, FREE_LABEL);
        }
    }

    #[test]
    fn test_documented_example_rounds_to_nearest_ten_shillings() {
        let config = DeliveryFeeConfig {
            free_radius_km: 0.70,
            base_fee: 4_000,
            per_km_fee: 1_000,
            rounding_step: 1_000,
        };
        let fee = delivery_fee(1.39, &config);
        assert_eq!(fee.fee.minor(), 5_000);
        assert!(!fee.is_free);
        assert_eq!(fee.zone_label, PAID_LABEL);
    }

    #[test]
    fn test_fee_ladder() {
        let config = DeliveryFeeConfig::default();
        assert_eq!(delivery_fee(1.0, &config).fee.minor(), 5_000);
        assert_eq!(delivery_fee(2.0, &config).fee.minor(), 6_000);
        assert_eq!(delivery_fee(2.5, &config).fee.minor(), 7_000);
        assert_eq!(delivery_fee(4.0, &config).fee.minor(), 8_000);
    }

    #[test]
    fn test_fee_rounds_once_from_the_exact_raw_fee() {
        let config = DeliveryFeeConfig::default();
        // 4000 + 1499.6 = 5499.6, just under the half step
        assert_eq!(delivery_fee(1.4996, &config).fee.minor(), 5_000);
        assert_eq!(delivery_fee(1.4999, &config).fee.minor(), 5_000);
        assert_eq!(delivery_fee(1.5, &config).fee.minor(), 6_000);

        let fine = DeliveryFeeConfig {
            free_radius_km: 0.0,
            rounding_step: 10,
            ..DeliveryFeeConfig::default()
        };
        // 4000 + 4.996 = 4004.996 → nearest 10 is 4000, not 4010
        assert_eq!(delivery_fee(0.004_996, &fine).fee.minor(), 4_000);
    }

    #[test]
    fn test_outside_free_radius_is_never_zero() {
        let config = DeliveryFeeConfig {
            free_radius_km: 0.0,
            base_fee: 0,
            per_km_fee: 100,
            rounding_step: 1_000,
        };
        // raw fee is 1 minor unit, which would round to 0
        let fee = delivery_fee(0.01, &config);
        assert!(!fee.is_free);
        assert_eq!(fee.fee.minor(), 1_000);

        let config = DeliveryFeeConfig::default();
        for d in [0.71, 1.0, 3.3, 12.0, 250.0] {
            assert!(delivery_fee(d, &config).fee.is_positive());
        }
    }

    #[test]
    fn test_quote_uses_haversine_distance() {
        let store = Coordinate::new(-1.2864, 36.8172);
        let q = quote(store, store, &DeliveryFeeConfig::default());
        assert_eq!(q.distance_km, 0.0);
        assert!(q.fee.is_free);

        let customer = north_of(store, 3.0);
        let q = quote(store, customer, &DeliveryFeeConfig::default());
        assert!((q.distance_km - 3.0).abs() < 0.01);
        assert_eq!(q.fee.fee.minor(), 7_000);
    }

    #[test]
    fn test_free_zone_preferred_over_paid_zone() {
        let center = Coordinate::new(-1.2864, 36.8172);
        let zones = vec![
            zone("Paid", center, 5.0, false, 20_000),
            zone("Free", center, 1.0, true, 0),
        ];
        let point = north_of(center, 0.5);

        let found = find_zone(point, &zones).expect("point is inside both zones");
        assert_eq!(found.name, "Free");
        assert_eq!(found.fee(), Money::zero());
    }

    #[test]
    fn test_first_free_zone_in_input_order_wins() {
        let center = Coordinate::new(-1.2864, 36.8172);
        let zones = vec![
            zone("Paid", center, 5.0, false, 20_000),
            zone("FreeA", center, 2.0, true, 0),
            zone("FreeB", center, 3.0, true, 0),
        ];
        let found = find_zone(north_of(center, 1.0), &zones).unwrap();
        assert_eq!(found.name, "FreeA");
    }

    #[test]
    fn test_paid_zone_when_outside_free_zone() {
        let center = Coordinate::new(-1.2864, 36.8172);
        let zones = vec![
            zone("Free", center, 1.0, true, 0),
            zone("Inner", center, 3.0, false, 15_000),
            zone("Outer", center, 5.0, false, 25_000),
        ];
        let found = find_zone(north_of(center, 2.0), &zones).unwrap();
        assert_eq!(found.name, "Inner");
        assert_eq!(found.fee().minor(), 15_000);
    }

    #[test]
    fn test_no_zone_outside_service_area() {
        let center = Coordinate::new(-1.2864, 36.8172);
        let zones = vec![zone("Free", center, 1.0, true, 0)];
        assert!(find_zone(north_of(center, 10.0), &zones).is_none());
        assert!(find_zone(center, &[]).is_none());
    }

    #[test]
    fn test_zone_boundary_is_inclusive() {
        let center = Coordinate::new(-1.2864, 36.8172);
        let point = north_of(center, 2.0);
        let exact = distance_km(point, center);
        let z = zone("Edge", center, exact, false, 10_000);
        assert!(zone_contains(&z, point));

        let zero = zone("Dot", center, 0.0, false, 10_000);
        assert!(zone_contains(&zero, center));
    }
}
