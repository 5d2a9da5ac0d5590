//! In-memory map provider
//!
//! Stands in for the native map in tests and in the headless demo. Every
//! command is recorded so callers can assert on exactly what the session
//! asked the map to do; the camera, device location and query failures are
//! scriptable.

use crate::{
    core::{camera::CameraSnapshot, config::SurfaceOptions, geo::LatLng},
    provider::{EventHandler, IconSpec, MapEventKind, MapProvider, MarkerHandle},
    runtime::lock,
    MapError, Result,
};
use async_trait::async_trait;
use fxhash::{FxHashMap, FxHashSet};
use std::sync::{Arc, Mutex};

/// Default host surface id known to the simulated provider
pub const DEFAULT_SURFACE_ID: &str = "map_canvas";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraMove {
    pub target: LatLng,
    pub zoom: f64,
    pub animated: bool,
}

/// One recorded provider command
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderCall {
    CameraPosition,
    MoveCamera(CameraMove),
    SetZoom(f64),
    AddMarker { position: LatLng, icon: IconSpec },
    RemoveMarker(MarkerHandle),
    DeviceLocation { high_accuracy: bool },
    Clear,
    SetClickable(bool),
    SetVisible(bool),
    RefreshLayout,
    AttachSurface(String),
    ConfigureSurface(SurfaceOptions),
}

/// What the next device location query answers
#[derive(Debug, Clone, PartialEq)]
pub enum LocationReply {
    Fix(LatLng),
    NoFix,
    Error(String),
}

struct SimState {
    camera: CameraSnapshot,
    camera_available: bool,
    location: LocationReply,
    markers: FxHashMap<MarkerHandle, (LatLng, IconSpec)>,
    next_marker_id: u64,
    surfaces: FxHashSet<String>,
    attached_surface: Option<String>,
    clickable: bool,
    visible: bool,
    calls: Vec<ProviderCall>,
}

type SharedHandler = Arc<dyn Fn() + Send + Sync + 'static>;

pub struct SimulatedProvider {
    state: Mutex<SimState>,
    handlers: Mutex<FxHashMap<MapEventKind, Vec<SharedHandler>>>,
}

impl SimulatedProvider {
    pub fn new(camera: CameraSnapshot) -> Self {
        let mut surfaces = FxHashSet::default();
        surfaces.insert(DEFAULT_SURFACE_ID.to_string());

        Self {
            state: Mutex::new(SimState {
                camera,
                camera_available: true,
                location: LocationReply::NoFix,
                markers: FxHashMap::default(),
                next_marker_id: 1,
                surfaces,
                attached_surface: Some(DEFAULT_SURFACE_ID.to_string()),
                clickable: true,
                visible: true,
                calls: Vec::new(),
            }),
            handlers: Mutex::new(FxHashMap::default()),
        }
    }

    /// Registers another host surface the map can be attached to
    pub fn with_surface(self, surface_id: impl Into<String>) -> Self {
        lock(&self.state).surfaces.insert(surface_id.into());
        self
    }

    /// Moves the camera as a user drag would, without recording a command
    pub fn set_camera_target(&self, target: LatLng) {
        lock(&self.state).camera.target = target;
    }

    pub fn set_camera_zoom(&self, zoom: f64) {
        lock(&self.state).camera.zoom = zoom;
    }

    pub fn camera(&self) -> CameraSnapshot {
        lock(&self.state).camera
    }

    /// When `false`, camera queries fail as if the surface were gone
    pub fn set_camera_available(&self, available: bool) {
        lock(&self.state).camera_available = available;
    }

    pub fn set_location(&self, reply: LocationReply) {
        lock(&self.state).location = reply;
    }

    /// Invokes every handler registered for `event`
    pub fn emit(&self, event: MapEventKind) {
        let handlers: Vec<SharedHandler> = lock(&self.handlers)
            .get(&event)
            .cloned()
            .unwrap_or_default();

        log::trace!("emitting {:?} to {} handlers", event, handlers.len());
        for handler in handlers {
            handler();
        }
    }

    pub fn handler_count(&self, event: MapEventKind) -> usize {
        lock(&self.handlers).get(&event).map_or(0, Vec::len)
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        lock(&self.state).calls.clone()
    }

    pub fn clear_calls(&self) {
        lock(&self.state).calls.clear();
    }

    pub fn camera_moves(&self) -> Vec<CameraMove> {
        lock(&self.state)
            .calls
            .iter()
            .filter_map(|call| match call {
                ProviderCall::MoveCamera(camera_move) => Some(*camera_move),
                _ => None,
            })
            .collect()
    }

    pub fn marker_count(&self) -> usize {
        lock(&self.state).markers.len()
    }

    pub fn is_clickable(&self) -> bool {
        lock(&self.state).clickable
    }

    pub fn is_visible(&self) -> bool {
        lock(&self.state).visible
    }

    pub fn attached_surface(&self) -> Option<String> {
        lock(&self.state).attached_surface.clone()
    }

    fn record(&self, call: ProviderCall) {
        lock(&self.state).calls.push(call);
    }
}

impl Default for SimulatedProvider {
    fn default() -> Self {
        let config = crate::core::config::MapSessionConfig::default();
        Self::new(CameraSnapshot::new(
            config.initial_origin.position,
            config.initial_zoom,
        ))
    }
}

#[async_trait]
impl MapProvider for SimulatedProvider {
    async fn ready_to_load(&self) -> Result<()> {
        Ok(())
    }

    async fn camera_position(&self) -> Result<CameraSnapshot> {
        let mut state = lock(&self.state);
        state.calls.push(ProviderCall::CameraPosition);
        if state.camera_available {
            Ok(state.camera)
        } else {
            Err(MapError::TransientQueryFailure(
                "camera unavailable".to_string(),
            ))
        }
    }

    fn move_camera(&self, target: LatLng, zoom: f64, animated: bool) {
        let mut state = lock(&self.state);
        state.calls.push(ProviderCall::MoveCamera(CameraMove {
            target,
            zoom,
            animated,
        }));
        state.camera = CameraSnapshot::new(target, zoom);
    }

    fn set_zoom(&self, zoom: f64) {
        let mut state = lock(&self.state);
        state.calls.push(ProviderCall::SetZoom(zoom));
        state.camera.zoom = zoom;
    }

    async fn add_marker(&self, position: LatLng, icon: &IconSpec) -> Result<MarkerHandle> {
        let mut state = lock(&self.state);
        state.calls.push(ProviderCall::AddMarker {
            position,
            icon: icon.clone(),
        });

        let handle = MarkerHandle(state.next_marker_id);
        state.next_marker_id += 1;
        state.markers.insert(handle, (position, icon.clone()));
        Ok(handle)
    }

    fn remove_marker(&self, handle: MarkerHandle) {
        let mut state = lock(&self.state);
        state.calls.push(ProviderCall::RemoveMarker(handle));
        state.markers.remove(&handle);
    }

    async fn device_location(&self, high_accuracy: bool) -> Result<Option<LatLng>> {
        let mut state = lock(&self.state);
        state
            .calls
            .push(ProviderCall::DeviceLocation { high_accuracy });

        match &state.location {
            LocationReply::Fix(position) => Ok(Some(*position)),
            LocationReply::NoFix => Ok(None),
            LocationReply::Error(message) => Err(MapError::Provider(message.clone())),
        }
    }

    fn on_event(&self, event: MapEventKind, handler: EventHandler) {
        lock(&self.handlers)
            .entry(event)
            .or_default()
            .push(Arc::from(handler));
    }

    fn clear(&self) {
        let mut state = lock(&self.state);
        state.calls.push(ProviderCall::Clear);
        state.markers.clear();
    }

    fn set_clickable(&self, clickable: bool) {
        let mut state = lock(&self.state);
        state.calls.push(ProviderCall::SetClickable(clickable));
        state.clickable = clickable;
    }

    fn set_visible(&self, visible: bool) {
        let mut state = lock(&self.state);
        state.calls.push(ProviderCall::SetVisible(visible));
        state.visible = visible;
    }

    fn refresh_layout(&self) {
        self.record(ProviderCall::RefreshLayout);
    }

    fn configure_surface(&self, options: &SurfaceOptions) {
        self.record(ProviderCall::ConfigureSurface(options.clone()));
    }

    fn attach_surface(&self, surface_id: &str) -> bool {
        let mut state = lock(&self.state);
        state
            .calls
            .push(ProviderCall::AttachSurface(surface_id.to_string()));

        if !state.surfaces.contains(surface_id) {
            return false;
        }
        state.attached_surface = Some(surface_id.to_string());
        true
    }
}
