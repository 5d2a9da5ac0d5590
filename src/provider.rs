//! The map-provider seam
//!
//! Everything the session knows about the native map goes through
//! [`MapProvider`]. Fire-and-forget commands are plain methods; anything that
//! round-trips to the native side is async.

use crate::{
    core::{camera::CameraSnapshot, config::SurfaceOptions, geo::LatLng},
    Result,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Provider lifecycle and interaction events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MapEventKind {
    /// The native surface exists and accepts commands
    MapReady,
    /// The camera moved, as reported by the native side
    CameraChange,
    /// The user tapped the map
    MapClick,
    /// The user tapped a marker
    MarkerClick,
}

pub type EventHandler = Box<dyn Fn() + Send + Sync + 'static>;

/// Opaque reference to a marker living on the native map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarkerHandle(pub u64);

/// Icon to draw for a marker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconSpec {
    pub url: String,
    pub width: u32,
    pub height: u32,
}

#[async_trait]
pub trait MapProvider: Send + Sync {
    /// Resolves once the native map object has been created
    async fn ready_to_load(&self) -> Result<()>;

    /// Current camera target and zoom. Fails when the surface is absent.
    async fn camera_position(&self) -> Result<CameraSnapshot>;

    fn move_camera(&self, target: LatLng, zoom: f64, animated: bool);

    fn set_zoom(&self, zoom: f64);

    async fn add_marker(&self, position: LatLng, icon: &IconSpec) -> Result<MarkerHandle>;

    fn remove_marker(&self, handle: MarkerHandle);

    /// `Ok(None)` when the platform answered without a coordinate
    async fn device_location(&self, high_accuracy: bool) -> Result<Option<LatLng>>;

    fn on_event(&self, event: MapEventKind, handler: EventHandler);

    /// Applies layer, compass, background and padding options to the surface
    fn configure_surface(&self, options: &SurfaceOptions);

    /// Removes every overlay from the native map
    fn clear(&self);

    fn set_clickable(&self, clickable: bool);

    fn set_visible(&self, visible: bool);

    fn refresh_layout(&self);

    /// Re-parents the native map onto another host surface. Returns `false`
    /// when no such surface exists.
    fn attach_surface(&self, surface_id: &str) -> bool;
}
