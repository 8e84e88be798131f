use crate::constants::EARTH_RADIUS_KM;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Result<Self, String> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(format!(
                "Invalid latitude: {} (must be between -90 and 90)",
                lat
            ));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(format!(
                "Invalid longitude: {} (must be between -180 and 180)",
                lng
            ));
        }
        Ok(Coordinates { lat, lng })
    }

    /// Calculate distance between two coordinates using Haversine formula
    /// Returns distance in kilometers
    pub fn distance_to(&self, other: &Coordinates) -> f64 {
        let lat1_rad = self.lat.to_radians();
        let lat2_rad = other.lat.to_radians();
        let delta_lat = (other.lat - self.lat).to_radians();
        let delta_lng = (other.lng - self.lng).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_KM * c
    }

    /// Initial bearing from this point to another, in degrees clockwise
    /// from north, normalized to [0, 360).
    pub fn bearing_to(&self, other: &Coordinates) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let delta_lng = (other.lng - self.lng).to_radians();

        let y = delta_lng.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * delta_lng.cos();

        normalize_bearing(y.atan2(x).to_degrees())
    }

    /// Project this point along a bearing (degrees clockwise from north) by
    /// a great-circle distance, using the direct geodesic formula on a sphere.
    pub fn project(&self, bearing_deg: f64, distance_km: f64) -> Coordinates {
        let angular = distance_km / EARTH_RADIUS_KM;
        let bearing = normalize_bearing(bearing_deg).to_radians();
        let lat1 = self.lat.to_radians();
        let lng1 = self.lng.to_radians();

        let lat2 =
            (lat1.sin() * angular.cos() + lat1.cos() * angular.sin() * bearing.cos()).asin();
        let lng2 = lng1
            + (bearing.sin() * angular.sin() * lat1.cos())
                .atan2(angular.cos() - lat1.sin() * lat2.sin());

        Coordinates {
            lat: lat2.to_degrees().clamp(-90.0, 90.0),
            lng: wrap_longitude(lng2.to_degrees()),
        }
    }

    /// Scale this point's offset from `origin` by a uniform factor in
    /// lat/lng space. Used by the calibration search, which only moves
    /// waypoints radially toward or away from the start.
    pub fn scale_from(&self, origin: &Coordinates, factor: f64) -> Coordinates {
        Coordinates {
            lat: origin.lat + (self.lat - origin.lat) * factor,
            lng: origin.lng + (self.lng - origin.lng) * factor,
        }
    }

    /// Round coordinates to specified decimal places for caching
    pub fn round(&self, decimal_places: u32) -> Self {
        let multiplier = 10_f64.powi(decimal_places as i32);
        Coordinates {
            lat: (self.lat * multiplier).round() / multiplier,
            lng: (self.lng * multiplier).round() / multiplier,
        }
    }
}

/// Normalize a bearing in degrees to [0, 360).
pub fn normalize_bearing(bearing_deg: f64) -> f64 {
    let b = bearing_deg % 360.0;
    if b < 0.0 {
        b + 360.0
    } else {
        b
    }
}

fn wrap_longitude(lng: f64) -> f64 {
    let mut wrapped = (lng + 180.0) % 360.0;
    if wrapped < 0.0 {
        wrapped += 360.0;
    }
    wrapped - 180.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_validation() {
        assert!(Coordinates::new(48.8566, 2.3522).is_ok());
        assert!(Coordinates::new(91.0, 0.0).is_err()); // Invalid lat
        assert!(Coordinates::new(0.0, 181.0).is_err()); // Invalid lng
    }

    #[test]
    fn test_distance_calculation() {
        let paris = Coordinates::new(48.8566, 2.3522).unwrap();
        let london = Coordinates::new(51.5074, -0.1278).unwrap();

        let distance = paris.distance_to(&london);
        // Paris to London is approximately 344 km
        assert!((distance - 344.0).abs() < 10.0);
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = Coordinates::new(51.5007, -0.1246).unwrap();
        let b = Coordinates::new(51.5200, -0.1000).unwrap();
        assert!((a.distance_to(&b) - b.distance_to(&a)).abs() < 1e-9);
    }

    #[test]
    fn test_bearing_cardinal_directions() {
        let start = Coordinates::new(51.5, 0.0).unwrap();

        let north = Coordinates::new(51.6, 0.0).unwrap();
        assert!(start.bearing_to(&north).abs() < 0.5);

        let east = Coordinates::new(51.5, 0.1).unwrap();
        assert!((start.bearing_to(&east) - 90.0).abs() < 0.5);

        let south = Coordinates::new(51.4, 0.0).unwrap();
        assert!((start.bearing_to(&south) - 180.0).abs() < 0.5);

        let west = Coordinates::new(51.5, -0.1).unwrap();
        assert!((start.bearing_to(&west) - 270.0).abs() < 0.5);
    }

    #[test]
    fn test_project_round_trip_distance() {
        let start = Coordinates::new(51.5007, -0.1246).unwrap();
        for bearing in [0.0, 45.0, 133.0, 270.5] {
            let projected = start.project(bearing, 2.0);
            let realized = start.distance_to(&projected);
            assert!(
                (realized - 2.0).abs() < 0.01,
                "projection at bearing {} realized {}km",
                bearing,
                realized
            );
        }
    }

    #[test]
    fn test_project_bearing_matches() {
        let start = Coordinates::new(51.5007, -0.1246).unwrap();
        let projected = start.project(60.0, 1.5);
        let bearing = start.bearing_to(&projected);
        assert!((bearing - 60.0).abs() < 0.5, "got bearing {}", bearing);
    }

    #[test]
    fn test_scale_from_halves_distance() {
        let origin = Coordinates::new(51.5, 0.0).unwrap();
        let point = Coordinates::new(51.52, 0.02).unwrap();
        let scaled = point.scale_from(&origin, 0.5);
        assert!((scaled.lat - 51.51).abs() < 1e-12);
        assert!((scaled.lng - 0.01).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_bearing() {
        assert_eq!(normalize_bearing(0.0), 0.0);
        assert_eq!(normalize_bearing(360.0), 0.0);
        assert_eq!(normalize_bearing(-90.0), 270.0);
        assert_eq!(normalize_bearing(725.0), 5.0);
    }

    #[test]
    fn test_rounding() {
        let coords = Coordinates::new(48.856614, 2.352222).unwrap();
        let rounded = coords.round(3);
        assert_eq!(rounded.lat, 48.857);
        assert_eq!(rounded.lng, 2.352);
    }
}
