use serde::{Deserialize, Serialize};

/// WGS84 equatorial radius (the Web Mercator sphere), used for haversine distances
const EARTH_RADIUS: f64 = 6378137.0;

/// Represents a geographical coordinate with latitude and longitude.
///
/// Equality is exact field equality. Camera motion detection relies on this:
/// two snapshots are "the same position" only when both components are
/// bit-for-bit equal, so provider-side float noise reads as movement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    #[serde(rename = "latitude", alias = "lat")]
    pub lat: f64,
    #[serde(rename = "longitude", alias = "lng")]
    pub lng: f64,
}

impl LatLng {
    /// Creates a new LatLng coordinate
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Validates that the coordinates are within valid ranges
    pub fn is_valid(&self) -> bool {
        self.lat >= -90.0 && self.lat <= 90.0 && self.lng >= -180.0 && self.lng <= 180.0
    }

    /// Calculates the distance in meters to another LatLng using the Haversine formula
    pub fn distance_to(&self, other: &LatLng) -> f64 {
        let lat1_rad = self.lat.to_radians();
        let lat2_rad = other.lat.to_radians();
        let delta_lat = (other.lat - self.lat).to_radians();
        let delta_lng = (other.lng - self.lng).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS * c
    }
}

impl Default for LatLng {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl From<(f64, f64)> for LatLng {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self::new(lat, lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lat_lng_creation() {
        let coord = LatLng::new(40.4530582, -3.6905332);
        assert_eq!(coord.lat, 40.4530582);
        assert_eq!(coord.lng, -3.6905332);
        assert!(coord.is_valid());
        assert!(!LatLng::new(91.0, 0.0).is_valid());
    }

    #[test]
    fn test_lat_lng_distance() {
        let madrid = LatLng::new(40.4168, -3.7038);
        let barcelona = LatLng::new(41.3874, 2.1686);
        let distance = madrid.distance_to(&barcelona);

        // Roughly 505 km
        assert!((distance - 505_000.0).abs() < 10_000.0);
    }

    #[test]
    fn test_exact_equality() {
        let a = LatLng::new(10.0, 20.0);
        let b = LatLng::new(10.0, 20.0 + f64::EPSILON * 16.0);
        assert_eq!(a, LatLng::new(10.0, 20.0));
        assert_ne!(a, b);
    }

    #[test]
    fn test_serde_field_names() {
        let coord = LatLng::new(1.5, -2.5);
        let json = serde_json::to_value(coord).unwrap();
        assert_eq!(json, serde_json::json!({ "latitude": 1.5, "longitude": -2.5 }));

        let parsed: LatLng = serde_json::from_str(r#"{"lat": 3.0, "lng": 4.0}"#).unwrap();
        assert_eq!(parsed, LatLng::new(3.0, 4.0));
    }
}
