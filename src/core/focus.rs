use crate::core::geo::LatLng;
use serde::{Deserialize, Serialize};

/// A focal point of the map: a coordinate plus its human-readable address
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MapFocus {
    pub address: String,
    pub position: LatLng,
}

impl MapFocus {
    pub fn new(address: impl Into<String>, position: LatLng) -> Self {
        Self {
            address: address.into(),
            position,
        }
    }

    pub fn at(position: LatLng) -> Self {
        Self::new(String::new(), position)
    }
}

/// The coordinate/zoom model shared by the origin synchronizer and the session
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct FocusModel {
    pub origin: MapFocus,
    pub destination: Option<MapFocus>,
    pub zoom: f64,
}

impl FocusModel {
    pub fn new(origin: MapFocus, zoom: f64) -> Self {
        Self {
            origin,
            destination: None,
            zoom,
        }
    }
}

/// Read-only view of the session state, polled by the UI on every render tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusSnapshot {
    pub address: String,
    pub position: LatLng,
    pub zoom: f64,
    pub is_camera_moving: bool,
    pub destination: Option<MapFocus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_focus_constructors() {
        let focus = MapFocus::new("Calle Mayor 1", LatLng::new(40.41, -3.70));
        assert_eq!(focus.address, "Calle Mayor 1");

        let bare = MapFocus::at(LatLng::new(1.0, 2.0));
        assert!(bare.address.is_empty());
        assert_eq!(bare.position, LatLng::new(1.0, 2.0));
    }

    #[test]
    fn test_snapshot_serializes_for_ui() {
        let snapshot = FocusSnapshot {
            address: String::new(),
            position: LatLng::new(1.0, 2.0),
            zoom: 16.0,
            is_camera_moving: true,
            destination: None,
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["position"]["latitude"], 1.0);
        assert_eq!(json["is_camera_moving"], true);
        assert!(json["destination"].is_null());
    }
}
