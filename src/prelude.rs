//! Prelude module for common mapfocus types and traits
//!
//! This module re-exports the most commonly used types, traits, and functions
//! for easy importing with `use mapfocus::prelude::*;`

pub use crate::core::{
    camera::{CameraSnapshot, MotionPhase, MotionState},
    config::{
        MapSessionConfig, MarkerConfig, MotionDetectorConfig, MotionProfile, OriginUpdate,
        SurfaceOptions,
    },
    focus::{FocusSnapshot, MapFocus},
    geo::LatLng,
    ready::ReadyLatch,
};

pub use crate::provider::{EventHandler, IconSpec, MapEventKind, MapProvider, MarkerHandle};

pub use crate::runtime::{AsyncHandle, AsyncSpawner, TokioSpawner};

pub use crate::{
    markers::MarkerSet, motion::CameraMotionDetector, origin::OriginSynchronizer,
    session::MapSession, simulated::SimulatedProvider,
};

pub use crate::{MapError, Result};

pub use std::{sync::Arc, time::Duration};
