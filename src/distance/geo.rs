use std::f64::consts::PI;

use tracing::warn;

use crate::config::constant::EARTH_RADIUS_KM;
use crate::domain::types::Location;

/// Great-circle distance between two locations in kilometres.
pub fn distance(a: &Location, b: &Location) -> f64 {
    haversine_km(a.latitude, a.longitude, b.latitude, b.longitude)
}

/// Haversine distance in kilometres. Non-finite coordinates degrade to 0.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    if ![lat1, lon1, lat2, lon2].iter().all(|c| c.is_finite()) {
        warn!(
            "Invalid coordinates ({}, {}) -> ({}, {}), using distance 0",
            lat1, lon1, lat2, lon2
        );
        return 0.0;
    }

    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Polar angle of `point` around `origin`, in radians within (-PI, PI].
///
/// Longitude offsets are scaled by the cosine of the origin latitude so the
/// angle is measured on a locally flat projection.
pub fn polar_angle(origin: &Location, point: &Location) -> f64 {
    let dy = point.latitude - origin.latitude;
    let dx = (point.longitude - origin.longitude) * origin.latitude.to_radians().cos();
    let angle = dy.atan2(dx);
    if angle.is_finite() {
        angle
    } else {
        0.0
    }
}

/// Angle subtended at `origin` by `a` and `b`, in [0, PI].
pub fn subtended_angle(origin: &Location, a: &Location, b: &Location) -> f64 {
    let diff = (polar_angle(origin, a) - polar_angle(origin, b)).abs();
    if diff > PI {
        2.0 * PI - diff
    } else {
        diff
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_degree_of_latitude() {
        let d = haversine_km(0.0, 0.0, 1.0, 0.0);
        assert!((d - 111.19).abs() < 0.01, "got {}", d);
    }

    #[test]
    fn symmetric_and_zero_on_self() {
        let a = Location::new("a", 1.35, 103.8, 0);
        let b = Location::new("b", 1.29, 103.85, 0);
        assert_eq!(distance(&a, &a), 0.0);
        assert!((distance(&a, &b) - distance(&b, &a)).abs() < 1e-12);
    }

    #[test]
    fn invalid_coordinates_degrade_to_zero() {
        assert_eq!(haversine_km(f64::NAN, 0.0, 1.0, 1.0), 0.0);
        assert_eq!(haversine_km(0.0, f64::INFINITY, 1.0, 1.0), 0.0);
    }

    #[test]
    fn angles_around_origin() {
        let o = Location::depot("o", 0.0, 0.0);
        let east = Location::new("e", 0.0, 1.0, 0);
        let north = Location::new("n", 1.0, 0.0, 0);
        let west = Location::new("w", 0.0, -1.0, 0);

        assert!(polar_angle(&o, &east).abs() < 1e-12);
        assert!((polar_angle(&o, &north) - PI / 2.0).abs() < 1e-12);
        assert!((subtended_angle(&o, &east, &west) - PI).abs() < 1e-12);
        assert!((subtended_angle(&o, &east, &north) - PI / 2.0).abs() < 1e-12);
    }
}
