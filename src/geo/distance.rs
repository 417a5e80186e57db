//! Great-circle distance

use crate::constants::geo::EARTH_RADIUS_KM;
use crate::geo::Coordinate;

/// Calculate the distance between two points in kilometers (Haversine formula)
///
/// Inputs are not validated. The intermediate term is clamped to [0, 1] so
/// antipodal points do not produce NaN from rounding.
pub fn distance(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Check if a point lies within `radius_km` of a center
pub fn is_within(point: Coordinate, center: Coordinate, radius_km: f64) -> bool {
    distance(point, center) <= radius_km
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    const ANTIPODAL_KM: f64 = EARTH_RADIUS_KM * PI;

    #[test]
    fn test_identical_points() {
        let points = [
            Coordinate::new(0.0, 0.0),
            Coordinate::new(40.7128, -74.0060),
            Coordinate::new(-90.0, 180.0),
        ];
        for p in points {
            assert_eq!(distance(p, p), 0.0);
        }
    }

    #[test]
    fn test_symmetry() {
        let nyc = Coordinate::new(40.7128, -74.0060);
        let london = Coordinate::new(51.5074, -0.1278);

        assert_eq!(distance(nyc, london), distance(london, nyc));
    }

    #[test]
    fn test_one_degree_latitude() {
        let a = Coordinate::new(40.7128, -74.0060);
        let b = Coordinate::new(41.7128, -74.0060);

        assert_relative_eq!(distance(a, b), 111.195, epsilon = 0.01);
    }

    #[test]
    fn test_antipodal_points() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(0.0, 180.0);
        let d = distance(a, b);

        assert!(d.is_finite());
        assert_relative_eq!(d, ANTIPODAL_KM, epsilon = 1e-6);

        let north = Coordinate::new(90.0, 0.0);
        let south = Coordinate::new(-90.0, 0.0);
        assert_relative_eq!(distance(north, south), ANTIPODAL_KM, epsilon = 1e-6);
    }

    #[test]
    fn test_bounded_by_antipodal_maximum() {
        let samples = [
            Coordinate::new(12.5, -170.0),
            Coordinate::new(-45.0, 33.3),
            Coordinate::new(89.9, 0.1),
            Coordinate::new(-12.5, 10.0),
        ];
        for a in samples {
            for b in samples {
                let d = distance(a, b);
                assert!(d >= 0.0);
                assert!(d <= ANTIPODAL_KM + 1e-9, "distance {} exceeds maximum", d);
            }
        }
    }

    #[test]
    fn test_is_within() {
        let center = Coordinate::new(0.0, 0.0);

        // ~55 m east
        assert!(is_within(Coordinate::new(0.0, 0.0005), center, 0.1));
        // ~222 m east
        assert!(!is_within(Coordinate::new(0.0, 0.002), center, 0.1));
    }
}
