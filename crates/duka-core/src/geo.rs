//! # Geo Module
//!
//! Great-circle distance between two coordinates.

use crate::types::Coordinate;

/// Mean Earth radius used by the Haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6_371.0;

/// Distance in kilometers between `a` and `b` along the Earth's surface.
///
/// Symmetric and total for well-formed input; identical points return 0.
///
/// ```rust
/// use duka_core::geo::distance_km;
/// use duka_core::Coordinate;
///
/// let cbd = Coordinate::new(-1.2864, 36.8172);
/// let westlands = Coordinate::new(-1.2676, 36.8108);
/// let d = distance_km(cbd, westlands);
/// assert!((d - 2.2).abs() < 0.1);
/// ```
pub fn distance_km(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lng = (b.longitude - a.longitude).to_radians();

    let sin_lat = (delta_lat / 2.0).sin();
    let sin_lng = (delta_lng / 2.0).sin();

    let haversine = sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lng * sin_lng;
    // Rounding can push the term a hair past 1.0 for antipodal points
    let central_angle = 2.0 * haversine.clamp(0.0, 1.0).sqrt().asin();

    EARTH_RADIUS_KM * central_angle
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_for_same_point() {
        let points = [
            Coordinate::new(-1.2864, 36.8172),
            Coordinate::new(90.0, 0.0),
            Coordinate::new(-90.0, 180.0),
            Coordinate::new(0.0, -180.0),
        ];
        for p in points {
            assert_eq!(distance_km(p, p), 0.0);
        }
    }

    #[test]
    fn distance_is_symmetric() {
        let pairs = [
            (Coordinate::new(-1.2864, 36.8172), Coordinate::new(-4.0435, 39.6682)),
            (Coordinate::new(51.5074, -0.1278), Coordinate::new(48.8566, 2.3522)),
            (Coordinate::new(0.0, 179.9), Coordinate::new(0.0, -179.9)),
        ];
        for (a, b) in pairs {
            assert_eq!(distance_km(a, b), distance_km(b, a));
        }
    }

    #[test]
    fn nairobi_to_mombasa_is_around_440_km() {
        let nairobi = Coordinate::new(-1.2864, 36.8172);
        let mombasa = Coordinate::new(-4.0435, 39.6682);
        let d = distance_km(nairobi, mombasa);
        assert!((d - 440.0).abs() < 10.0, "got {d}");
    }

    #[test]
    fn antipodal_points_are_half_the_circumference() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(0.0, 180.0);
        let expected = std::f64::consts::PI * EARTH_RADIUS_KM;
        assert!((distance_km(a, b) - expected).abs() < 1e-3);
    }

    #[test]
    fn crossing_the_antimeridian_is_short() {
        let a = Coordinate::new(0.0, 179.9);
        let b = Coordinate::new(0.0, -179.9);
        assert!(distance_km(a, b) < 25.0);
    }
}
