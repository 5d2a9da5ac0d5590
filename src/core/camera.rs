use crate::core::geo::LatLng;
use serde::{Deserialize, Serialize};

/// Camera state as reported by the map provider at the moment of the query
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraSnapshot {
    pub target: LatLng,
    pub zoom: f64,
}

impl CameraSnapshot {
    pub fn new(target: LatLng, zoom: f64) -> Self {
        Self { target, zoom }
    }
}

/// Whether the camera is inferred to be moving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MotionPhase {
    #[default]
    Idle,
    Moving,
}

/// State of the camera motion detector.
///
/// `last_known_position` starts as `None`, which never matches a real
/// snapshot, so the first successful poll always reports movement.
///
/// Camera queries are numbered when issued and may resolve out of order.
/// A sample older than the newest one already applied is stale and must be
/// dropped through [`MotionState::accept_sample`] before it is observed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MotionState {
    phase: MotionPhase,
    last_known_position: Option<LatLng>,
    last_applied_sample: u64,
}

impl MotionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> MotionPhase {
        self.phase
    }

    pub fn is_moving(&self) -> bool {
        self.phase == MotionPhase::Moving
    }

    pub fn last_known_position(&self) -> Option<LatLng> {
        self.last_known_position
    }

    /// Claims sample number `sequence`. Returns `false` when a newer sample
    /// has already been applied.
    pub fn accept_sample(&mut self, sequence: u64) -> bool {
        if sequence <= self.last_applied_sample {
            return false;
        }
        self.last_applied_sample = sequence;
        true
    }

    /// Applies a poll sample. Returns `true` when the camera moved since the
    /// last observation, in which case a settle-check must be (re)armed.
    pub fn observe_poll(&mut self, target: LatLng) -> bool {
        if self.last_known_position == Some(target) {
            return false;
        }

        self.phase = MotionPhase::Moving;
        self.last_known_position = Some(target);
        true
    }

    /// Applies a settle-check sample. Returns `true` when the camera has not
    /// moved since the previous observation and the phase dropped to `Idle`.
    pub fn observe_settle(&mut self, target: LatLng) -> bool {
        if self.last_known_position == Some(target) {
            self.phase = MotionPhase::Idle;
            true
        } else {
            self.last_known_position = Some(target);
            false
        }
    }
}
