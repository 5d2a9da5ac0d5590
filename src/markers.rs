use crate::{
    core::{config::MarkerConfig, geo::LatLng, ready::ReadyLatch},
    provider::{IconSpec, MapProvider, MarkerHandle},
    runtime::lock,
    MapError, Result,
};
use std::sync::{Arc, Mutex};

/// Keeps track of the markers the session placed on the native map
pub struct MarkerSet {
    provider: Arc<dyn MapProvider>,
    surface: Arc<ReadyLatch>,
    config: MarkerConfig,
    markers: Mutex<Vec<MarkerHandle>>,
}

impl MarkerSet {
    pub fn new(
        provider: Arc<dyn MapProvider>,
        surface: Arc<ReadyLatch>,
        config: MarkerConfig,
    ) -> Self {
        Self {
            provider,
            surface,
            config,
            markers: Mutex::new(Vec::new()),
        }
    }

    pub fn icon_for(&self, icon_path: &str) -> IconSpec {
        let (width, height) = self.config.icon_size;
        IconSpec {
            url: format!("{}{}", self.config.asset_prefix, icon_path),
            width,
            height,
        }
    }

    pub async fn set_marker(&self, position: LatLng, icon_path: &str) -> Result<MarkerHandle> {
        if !self.surface.is_fired() {
            return Err(MapError::SurfaceNotReady);
        }

        let icon = self.icon_for(icon_path);
        let handle = self.provider.add_marker(position, &icon).await?;
        lock(&self.markers).push(handle);
        Ok(handle)
    }

    /// Removes every tracked marker from the map
    pub fn clear_markers(&self) {
        let removed: Vec<MarkerHandle> = lock(&self.markers).drain(..).collect();
        for handle in removed {
            self.provider.remove_marker(handle);
        }
    }

    /// Drops tracking without touching the map, after the map was wiped
    pub(crate) fn forget_all(&self) {
        lock(&self.markers).clear();
    }

    pub fn markers_count(&self) -> usize {
        lock(&self.markers).len()
    }
}
