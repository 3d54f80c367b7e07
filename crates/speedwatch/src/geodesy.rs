//! Great-circle distance on a spherical Earth.

use std::f64::consts::PI;

/// Degrees to radians conversion factor.
const DTOR: f64 = PI / 180.0;

/// Mean Earth radius for the spherical approximation, in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Returns the haversine distance in meters between two points given in
/// degrees.
///
/// Assumes a spherical Earth and ignores altitude; accuracy is within ~0.5%
/// over the distances a moving device covers between fixes.
#[must_use]
pub fn haversine(lat0: f64, lon0: f64, lat1: f64, lon1: f64) -> f64 {
    let dlat = (lat1 - lat0) * DTOR;
    let dlon = (lon1 - lon0) * DTOR;

    let a = (dlat / 2.0).sin().powi(2)
        + (lat0 * DTOR).cos() * (lat1 * DTOR).cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-6;

    #[test]
    fn test_same_point_is_zero() {
        let dist = haversine(51.5, -0.1, 51.5, -0.1);
        assert!(dist.abs() < EPSILON);

        let dist = haversine(0.0, 0.0, 0.0, 0.0);
        assert!(dist.abs() < EPSILON);
    }

    #[test]
    fn test_london_paris() {
        // London to Paris, approximately 344 km
        let dist = haversine(51.5074, -0.1278, 48.8566, 2.3522);
        assert!((dist - 344_000.0).abs() < 5_000.0, "distance: {dist} meters");
    }

    #[test]
    fn test_one_degree_longitude_at_equator() {
        // One degree of longitude at the equator is 2*pi*R/360
        let expected = 2.0 * PI * EARTH_RADIUS_M / 360.0;
        let dist = haversine(0.0, 0.0, 0.0, 1.0);
        assert!((dist - expected).abs() < 1.0, "distance: {dist} meters");
    }

    #[test]
    fn test_symmetric() {
        let forward = haversine(10.0, 20.0, 30.0, 40.0);
        let backward = haversine(30.0, 40.0, 10.0, 20.0);
        assert!((forward - backward).abs() < EPSILON);
    }

    #[test]
    fn test_short_hop() {
        // ~111 meters per 0.001 degree of latitude
        let dist = haversine(0.0, 0.0, 0.001, 0.0);
        assert!((dist - 111.19).abs() < 0.5, "distance: {dist} meters");
    }
}
