//! Great-circle distance on a spherical Earth.

use gtms_entity::location::Coordinate;

/// Mean Earth radius in metres.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Haversine distance between two coordinates, in metres.
pub fn haversine_meters(a: Coordinate, b: Coordinate) -> f64 {
    let (lat1, lat2) = (a.latitude.to_radians(), b.latitude.to_radians());
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_METERS * c
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    #[test]
    fn test_same_point_is_zero() {
        assert_eq!(haversine_meters(at(13.0, 100.0), at(13.0, 100.0)), 0.0);
    }

    #[test]
    fn test_known_distance() {
        // One degree of latitude is about 111.2 km.
        let d = haversine_meters(at(13.0, 100.0), at(14.0, 100.0));
        assert!((d - 111_195.0).abs() < 5.0, "{d}");
    }

    #[test]
    fn test_symmetric() {
        let a = at(13.7563, 100.5018);
        let b = at(13.7650, 100.5380);
        assert!((haversine_meters(a, b) - haversine_meters(b, a)).abs() < 1e-6);
    }
}
