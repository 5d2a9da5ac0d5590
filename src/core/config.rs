//! Configuration system for the map session
//!
//! Motion detection cadence is picked from presets or given explicitly, the
//! rest of the session options carry plain defaults. Everything is serde
//! friendly so an application can ship its configuration as JSON.

use crate::core::{
    constants::{
        CAMERA_POLL_INTERVAL_MS, CAMERA_SETTLE_INTERVAL_MS, DEFAULT_ORIGIN_LAT,
        DEFAULT_ORIGIN_LNG, DEFAULT_ZOOM, LOCATE_ZOOM, MARKER_ASSET_PREFIX, MARKER_ICON_SIZE,
        SURFACE_BACKGROUND_COLOR,
    },
    focus::MapFocus,
    geo::LatLng,
};
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MotionProfile {
    Balanced,
    Responsive,
    Relaxed,
    Custom(MotionDetectorConfig),
}

impl MotionProfile {
    pub fn resolve(&self) -> MotionDetectorConfig {
        match self {
            Self::Balanced => MotionDetectorConfig {
                poll_interval_ms: CAMERA_POLL_INTERVAL_MS,
                settle_interval_ms: CAMERA_SETTLE_INTERVAL_MS,
            },
            Self::Responsive => MotionDetectorConfig {
                poll_interval_ms: 100,
                settle_interval_ms: 300,
            },
            Self::Relaxed => MotionDetectorConfig {
                poll_interval_ms: 400,
                settle_interval_ms: 1000,
            },
            Self::Custom(config) => config.clone(),
        }
    }
}

impl Default for MotionProfile {
    fn default() -> Self {
        Self::Balanced
    }
}

/// Cadence of the two motion detector timers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionDetectorConfig {
    /// Period of the recurring camera poll
    pub poll_interval_ms: u64,
    /// Period of the settle-check armed after movement
    pub settle_interval_ms: u64,
}

impl MotionDetectorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn settle_interval(&self) -> Duration {
        Duration::from_millis(self.settle_interval_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(MapError::Config(
                "poll_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.settle_interval_ms <= self.poll_interval_ms {
            return Err(MapError::Config(format!(
                "settle_interval_ms ({}) must exceed poll_interval_ms ({})",
                self.settle_interval_ms, self.poll_interval_ms
            )));
        }
        Ok(())
    }
}

impl Default for MotionDetectorConfig {
    fn default() -> Self {
        MotionProfile::default().resolve()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    /// Prepended to every icon path handed to the provider
    pub asset_prefix: String,
    pub icon_size: (u32, u32),
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            asset_prefix: MARKER_ASSET_PREFIX.to_string(),
            icon_size: MARKER_ICON_SIZE,
        }
    }
}

/// Native surface options applied once when the map becomes ready
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceOptions {
    /// The platform's own location dot and button
    pub my_location_layer: bool,
    pub compass: bool,
    /// CSS-style color shown behind tiles that have not loaded
    pub background_color: String,
    /// Top, right, bottom, left in pixels
    pub padding: [u32; 4],
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        Self {
            my_location_layer: false,
            compass: true,
            background_color: SURFACE_BACKGROUND_COLOR.to_string(),
            padding: [0; 4],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapSessionConfig {
    pub initial_origin: MapFocus,
    pub initial_zoom: f64,
    pub locate_zoom: f64,
    pub high_accuracy_location: bool,
    pub motion: MotionDetectorConfig,
    pub markers: MarkerConfig,
    pub surface: SurfaceOptions,
}

impl MapSessionConfig {
    /// Builds a configuration whose motion cadence comes from a preset
    pub fn with_profile(profile: MotionProfile) -> Self {
        Self {
            motion: profile.resolve(),
            ..Default::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.motion.validate()?;
        if !self.initial_zoom.is_finite() || !self.locate_zoom.is_finite() {
            return Err(MapError::Config("zoom levels must be finite".to_string()));
        }
        Ok(())
    }
}

impl Default for MapSessionConfig {
    fn default() -> Self {
        Self {
            initial_origin: MapFocus::at(LatLng::new(DEFAULT_ORIGIN_LAT, DEFAULT_ORIGIN_LNG)),
            initial_zoom: DEFAULT_ZOOM,
            locate_zoom: LOCATE_ZOOM,
            high_accuracy_location: true,
            motion: MotionDetectorConfig::default(),
            markers: MarkerConfig::default(),
            surface: SurfaceOptions::default(),
        }
    }
}

/// Options for `OriginSynchronizer::set_origin`
#[derive(Debug, Clone, PartialEq)]
pub struct OriginUpdate {
    /// Also move the camera to the new origin
    pub update_map: bool,
    /// Replaces the stored address when present
    pub address: Option<String>,
    /// Animate the camera move instead of jumping
    pub animate: bool,
}

impl OriginUpdate {
    /// Updates the model only
    pub fn model_only() -> Self {
        Self::default()
    }

    /// Updates the model and animates the camera to it
    pub fn move_map() -> Self {
        Self {
            update_map: true,
            ..Default::default()
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }

    pub fn without_animation(mut self) -> Self {
        self.animate = false;
        self
    }
}

impl Default for OriginUpdate {
    fn default() -> Self {
        Self {
            update_map: false,
            address: None,
            animate: true,
        }
    }
}
