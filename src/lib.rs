//! # mapfocus
//!
//! Coordination layer for a native map view in a ride-hailing style app.
//!
//! A [`MapSession`] drives an external [`MapProvider`] and keeps two pieces of
//! state honest: whether the camera is currently moving (inferred by polling
//! the camera position) and where the map's origin is (kept in step with both
//! user panning and programmatic camera commands).

pub mod core;
pub mod markers;
pub mod motion;
pub mod origin;
pub mod prelude;
pub mod provider;
pub mod runtime;
pub mod session;
pub mod simulated;
pub use crate::core::constants;

// Re-export public API
pub use crate::core::{
    camera::{CameraSnapshot, MotionPhase},
    config::{MapSessionConfig, MotionDetectorConfig, MotionProfile, OriginUpdate, SurfaceOptions},
    focus::{FocusSnapshot, MapFocus},
    geo::LatLng,
};

pub use markers::MarkerSet;
pub use motion::CameraMotionDetector;
pub use origin::OriginSynchronizer;
pub use provider::{IconSpec, MapEventKind, MapProvider, MarkerHandle};
pub use session::MapSession;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("map surface is not ready")]
    SurfaceNotReady,

    #[error("device location unavailable: {0}")]
    LocationUnavailable(String),

    #[error("camera query failed: {0}")]
    TransientQueryFailure(String),

    #[error("provider error: {0}")]
    Provider(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Error type alias for convenience
pub type Error = MapError;
