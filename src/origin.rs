//! Origin synchronization
//!
//! The origin is the application's idea of where the map is focused. It is
//! updated synchronously on every command; camera movement is a side effect
//! that only happens once the map surface is ready.

use crate::{
    core::{
        camera::CameraSnapshot,
        config::OriginUpdate,
        focus::{FocusModel, MapFocus},
        geo::LatLng,
        ready::ReadyLatch,
    },
    provider::MapProvider,
    runtime::lock,
    MapError, Result,
};
use std::sync::{Arc, Mutex};

pub struct OriginSynchronizer {
    provider: Arc<dyn MapProvider>,
    surface: Arc<ReadyLatch>,
    model: Mutex<FocusModel>,
    locate_zoom: f64,
    high_accuracy: bool,
}

impl OriginSynchronizer {
    pub fn new(
        provider: Arc<dyn MapProvider>,
        surface: Arc<ReadyLatch>,
        origin: MapFocus,
        zoom: f64,
    ) -> Self {
        Self {
            provider,
            surface,
            model: Mutex::new(FocusModel::new(origin, zoom)),
            locate_zoom: crate::core::constants::LOCATE_ZOOM,
            high_accuracy: true,
        }
    }

    /// Zoom applied when the user's location is acquired
    pub fn with_locate_zoom(mut self, zoom: f64) -> Self {
        self.locate_zoom = zoom;
        self
    }

    pub fn with_high_accuracy(mut self, high_accuracy: bool) -> Self {
        self.high_accuracy = high_accuracy;
        self
    }

    pub fn set_origin(&self, coords: LatLng, update: OriginUpdate) {
        let zoom = {
            let mut model = lock(&self.model);
            model.origin.position = coords;
            if let Some(address) = update.address {
                model.origin.address = address;
            }
            model.zoom
        };

        if update.update_map {
            self.command_move(coords, zoom, update.animate);
        }
    }

    /// Pulls the live camera target into the origin without moving the camera
    pub async fn set_origin_to_camera_center(&self) -> Result<()> {
        let snapshot = self.camera_snapshot().await?;
        lock(&self.model).origin.position = snapshot.target;
        Ok(())
    }

    /// Live camera state, straight from the provider
    pub async fn camera_snapshot(&self) -> Result<CameraSnapshot> {
        if !self.surface.is_fired() {
            return Err(MapError::SurfaceNotReady);
        }
        self.provider.camera_position().await
    }

    pub async fn camera_zoom(&self) -> Result<f64> {
        Ok(self.camera_snapshot().await?.zoom)
    }

    pub fn return_camera_to_origin(&self) {
        let (position, zoom) = {
            let model = lock(&self.model);
            (model.origin.position, model.zoom)
        };
        self.command_move(position, zoom, false);
    }

    /// Jumps the camera to `center` at an explicit zoom
    pub fn move_camera_at(&self, center: LatLng, zoom: f64) {
        self.command_move(center, zoom, false);
    }

    /// Jumps the camera to `center`. Without a zoom, the camera's current zoom
    /// is queried first so the move does not reset it.
    pub async fn move_camera(&self, center: LatLng, zoom: Option<f64>) -> Result<()> {
        if let Some(zoom) = zoom {
            self.move_camera_at(center, zoom);
            return Ok(());
        }

        if !self.surface.is_fired() {
            log::debug!("camera move skipped, map surface not ready");
            return Ok(());
        }

        let zoom = self.camera_zoom().await?;
        self.move_camera_at(center, zoom);
        Ok(())
    }

    /// Centers the origin on the device location at the close-in zoom
    pub async fn acquire_user_location(&self) -> Result<()> {
        if !self.surface.is_fired() {
            return Err(MapError::SurfaceNotReady);
        }

        let coords = match self.provider.device_location(self.high_accuracy).await {
            Ok(Some(coords)) if coords.is_valid() => coords,
            Ok(Some(coords)) => {
                return Err(MapError::LocationUnavailable(format!(
                    "out of range coordinate ({}, {})",
                    coords.lat, coords.lng
                )))
            }
            Ok(None) => {
                return Err(MapError::LocationUnavailable(
                    "no coordinate reported".to_string(),
                ))
            }
            Err(err) => return Err(MapError::LocationUnavailable(err.to_string())),
        };

        log::debug!("device located at ({:.6}, {:.6})", coords.lat, coords.lng);
        lock(&self.model).zoom = self.locate_zoom;
        self.set_origin(coords, OriginUpdate::move_map());
        Ok(())
    }

    /// Stores the zoom and forwards it to the map when ready
    pub fn set_zoom(&self, zoom: f64) {
        lock(&self.model).zoom = zoom;
        if self.surface.is_fired() {
            self.provider.set_zoom(zoom);
        }
    }

    pub fn center(&self) -> LatLng {
        lock(&self.model).origin.position
    }

    pub fn origin(&self) -> MapFocus {
        lock(&self.model).origin.clone()
    }

    pub fn zoom(&self) -> f64 {
        lock(&self.model).zoom
    }

    pub fn destination(&self) -> Option<MapFocus> {
        lock(&self.model).destination.clone()
    }

    pub fn set_destination(&self, destination: Option<MapFocus>) {
        lock(&self.model).destination = destination;
    }

    pub(crate) fn model(&self) -> FocusModel {
        lock(&self.model).clone()
    }

    fn command_move(&self, target: LatLng, zoom: f64, animated: bool) {
        if !self.surface.is_fired() {
            log::debug!("camera move skipped, map surface not ready");
            return;
        }
        self.provider.move_camera(target, zoom, animated);
    }
}
