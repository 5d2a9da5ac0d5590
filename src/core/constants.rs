//! Core constants for the map session.
//! Keeping them in a single place makes it easier to tweak the magic numbers.

/// Default origin latitude before the device location is known.
pub const DEFAULT_ORIGIN_LAT: f64 = 40.4530582;

/// Default origin longitude before the device location is known.
pub const DEFAULT_ORIGIN_LNG: f64 = -3.6905332;

/// Zoom level the camera opens at.
pub const DEFAULT_ZOOM: f64 = 16.0;

/// Close-in zoom applied once the user's location has been acquired.
pub const LOCATE_ZOOM: f64 = 17.0;

/// How often the camera position is polled for movement (ms).
pub const CAMERA_POLL_INTERVAL_MS: u64 = 200;

/// How long the camera must stay put before it counts as settled (ms).
pub const CAMERA_SETTLE_INTERVAL_MS: u64 = 500;

/// Marker icon size in pixels.
pub const MARKER_ICON_SIZE: (u32, u32) = (47, 47);

/// Native map plugins resolve marker assets relative to the web root.
pub const MARKER_ASSET_PREFIX: &str = "www/";

/// Color behind the map tiles while they load.
pub const SURFACE_BACKGROUND_COLOR: &str = "white";
