//! The map session ties the pieces together
//!
//! One session owns the provider handle, the readiness latch, the motion
//! detector, the origin synchronizer and the marker registry. Nothing is
//! process-global: two sessions over two providers are fully independent.

use crate::{
    core::{config::{MapSessionConfig, SurfaceOptions}, focus::FocusSnapshot, ready::ReadyLatch},
    markers::MarkerSet,
    motion::CameraMotionDetector,
    origin::OriginSynchronizer,
    provider::{EventHandler, MapEventKind, MapProvider},
    runtime::{AsyncSpawner, TokioSpawner},
    Result,
};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Weak,
};

pub struct MapSession {
    provider: Arc<dyn MapProvider>,
    surface: Arc<ReadyLatch>,
    surface_options: SurfaceOptions,
    /// Claimed by the first ready event so the bootstrap runs exactly once
    bootstrapped: AtomicBool,
    detector: CameraMotionDetector,
    origin: OriginSynchronizer,
    markers: MarkerSet,
}

impl MapSession {
    /// Creates a session that spawns its timers on tokio
    pub fn new(provider: Arc<dyn MapProvider>, config: MapSessionConfig) -> Result<Arc<Self>> {
        Self::with_spawner(provider, Arc::new(TokioSpawner), config)
    }

    pub fn with_spawner(
        provider: Arc<dyn MapProvider>,
        spawner: Arc<dyn AsyncSpawner>,
        config: MapSessionConfig,
    ) -> Result<Arc<Self>> {
        config.validate()?;

        let surface = Arc::new(ReadyLatch::new());
        let detector = CameraMotionDetector::new(provider.clone(), spawner, config.motion.clone());
        let origin = OriginSynchronizer::new(
            provider.clone(),
            surface.clone(),
            config.initial_origin.clone(),
            config.initial_zoom,
        )
        .with_locate_zoom(config.locate_zoom)
        .with_high_accuracy(config.high_accuracy_location);
        let markers = MarkerSet::new(provider.clone(), surface.clone(), config.markers.clone());

        Ok(Arc::new(Self {
            provider,
            surface,
            surface_options: config.surface,
            bootstrapped: AtomicBool::new(false),
            detector,
            origin,
            markers,
        }))
    }

    /// Waits for the native map object, then listens for its ready event
    pub async fn init(self: &Arc<Self>) -> Result<()> {
        self.provider.ready_to_load().await?;

        let session: Weak<Self> = Arc::downgrade(self);
        self.provider.on_event(
            MapEventKind::MapReady,
            Box::new(move || {
                if let Some(session) = session.upgrade() {
                    session.handle_surface_ready();
                }
            }),
        );
        log::debug!("map session waiting for the surface");
        Ok(())
    }

    fn handle_surface_ready(&self) {
        if self
            .bootstrapped
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::warn!("duplicate map ready event ignored");
            return;
        }

        // The surface exists at this point, configure it before opening the gate.
        self.provider.configure_surface(&self.surface_options);
        self.provider.set_clickable(false);
        self.provider.clear();
        self.markers.forget_all();

        let model = self.origin.model();
        self.provider.move_camera(model.origin.position, model.zoom, true);

        self.detector.start();
        self.surface.fire();
    }

    /// Runs `callback` once the map is usable; immediately if it already is
    pub fn on_map_ready(&self, callback: impl FnOnce() + Send + 'static) {
        self.surface.subscribe(Box::new(callback));
    }

    pub async fn wait_until_ready(&self) {
        self.surface.wait().await;
    }

    pub fn is_ready(&self) -> bool {
        self.surface.is_fired()
    }

    pub fn focus_snapshot(&self) -> FocusSnapshot {
        let model = self.origin.model();
        FocusSnapshot {
            address: model.origin.address,
            position: model.origin.position,
            zoom: model.zoom,
            is_camera_moving: self.detector.is_moving(),
            destination: model.destination,
        }
    }

    pub fn is_camera_moving(&self) -> bool {
        self.detector.is_moving()
    }

    /// Moves the map onto another host surface and re-centers on the origin
    pub fn attach_surface(&self, surface_id: &str) -> bool {
        if !self.is_ready() {
            log::debug!("cannot attach to '{}' before the map is ready", surface_id);
            return false;
        }
        if !self.provider.attach_surface(surface_id) {
            log::warn!("unknown map surface '{}'", surface_id);
            return false;
        }

        // Reattaching can leave the camera pointing somewhere else.
        self.origin.return_camera_to_origin();
        true
    }

    pub fn add_listener(&self, event: MapEventKind, handler: EventHandler) {
        self.provider.on_event(event, handler);
    }

    pub fn set_clickable(&self, clickable: bool) {
        if self.is_ready() {
            self.provider.set_clickable(clickable);
        }
    }

    pub fn set_visible(&self, visible: bool) {
        if self.is_ready() {
            self.provider.set_visible(visible);
        }
    }

    pub fn refresh_layout(&self) {
        if self.is_ready() {
            self.provider.refresh_layout();
        }
    }

    /// Wipes every overlay from the map
    pub fn clear(&self) {
        if self.is_ready() {
            self.provider.clear();
            self.markers.forget_all();
        }
    }

    pub fn origin(&self) -> &OriginSynchronizer {
        &self.origin
    }

    pub fn detector(&self) -> &CameraMotionDetector {
        &self.detector
    }

    pub fn markers(&self) -> &MarkerSet {
        &self.markers
    }

    /// Stops the motion timers; the session is inert afterwards
    pub fn shutdown(&self) {
        log::debug!("map session shutting down");
        self.detector.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{config::OriginUpdate, geo::LatLng},
        simulated::{ProviderCall, SimulatedProvider},
        MapError,
    };
    use std::sync::Mutex;
    use std::time::Duration;

    async fn ready_session() -> (Arc<SimulatedProvider>, Arc<MapSession>) {
        let provider = Arc::new(SimulatedProvider::default());
        let session = MapSession::new(provider.clone(), MapSessionConfig::default()).unwrap();
        session.init().await.unwrap();
        provider.emit(MapEventKind::MapReady);
        (provider, session)
    }

    #[tokio::test(start_paused = true)]
    async fn test_bootstrap_sequence() {
        let (provider, session) = ready_session().await;
        assert!(session.is_ready());
        assert!(session.detector().is_running());
        assert!(!provider.is_clickable());

        let calls = provider.calls();
        assert_eq!(
            calls[0],
            ProviderCall::ConfigureSurface(SurfaceOptions::default())
        );
        assert_eq!(calls[1], ProviderCall::SetClickable(false));
        assert_eq!(calls[2], ProviderCall::Clear);
        assert!(matches!(calls[3], ProviderCall::MoveCamera(m) if m.animated && m.zoom == 16.0));
        session.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_ready_event_ignored() {
        let (provider, session) = ready_session().await;
        provider.clear_calls();

        provider.emit(MapEventKind::MapReady);
        assert!(provider.calls().is_empty());
        session.shutdown();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_ready_events_bootstrap_once() {
        let provider = Arc::new(SimulatedProvider::default());
        let session = MapSession::new(provider.clone(), MapSessionConfig::default()).unwrap();
        session.init().await.unwrap();

        let barrier = Arc::new(std::sync::Barrier::new(4));
        let emitters: Vec<_> = (0..4)
            .map(|_| {
                let provider = provider.clone();
                let barrier = barrier.clone();
                tokio::task::spawn_blocking(move || {
                    barrier.wait();
                    provider.emit(MapEventKind::MapReady);
                })
            })
            .collect();
        for emitter in emitters {
            emitter.await.unwrap();
        }

        let calls = provider.calls();
        let count = |wanted: &ProviderCall| calls.iter().filter(|call| *call == wanted).count();
        assert_eq!(count(&ProviderCall::Clear), 1);
        assert_eq!(count(&ProviderCall::SetClickable(false)), 1);
        assert_eq!(provider.camera_moves().len(), 1);
        assert!(session.is_ready());
        session.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_nothing_happens_before_ready_event() {
        let provider = Arc::new(SimulatedProvider::default());
        let session = MapSession::new(provider.clone(), MapSessionConfig::default()).unwrap();
        session.init().await.unwrap();

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!session.is_ready());
        assert!(!session.detector().is_running());
        assert!(provider.calls().is_empty());
        assert_eq!(provider.handler_count(MapEventKind::MapReady), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_on_map_ready_order() {
        let provider = Arc::new(SimulatedProvider::default());
        let session = MapSession::new(provider.clone(), MapSessionConfig::default()).unwrap();
        session.init().await.unwrap();

        let order = Arc::new(Mutex::new(Vec::new()));
        for id in 0..3 {
            let order = order.clone();
            session.on_map_ready(move || order.lock().unwrap().push(id));
        }
        assert!(order.lock().unwrap().is_empty());

        provider.emit(MapEventKind::MapReady);
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);

        let late = order.clone();
        session.on_map_ready(move || late.lock().unwrap().push(3));
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2, 3]);
        session.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_focus_snapshot() {
        let (provider, session) = ready_session().await;
        session.origin().set_origin(
            LatLng::new(41.38, 2.17),
            OriginUpdate::model_only().with_address("Passeig de Gracia 1"),
        );

        let snapshot = session.focus_snapshot();
        assert_eq!(snapshot.address, "Passeig de Gracia 1");
        assert_eq!(snapshot.position, LatLng::new(41.38, 2.17));
        assert_eq!(snapshot.zoom, 16.0);
        // The first poll always reports movement
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(session.focus_snapshot().is_camera_moving);
        assert!(provider.calls().contains(&ProviderCall::CameraPosition));
        session.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_attach_surface_returns_camera() {
        let provider = Arc::new(SimulatedProvider::default().with_surface("booking_map"));
        let session = MapSession::new(provider.clone(), MapSessionConfig::default()).unwrap();
        assert!(!session.attach_surface("booking_map"));

        session.init().await.unwrap();
        provider.emit(MapEventKind::MapReady);
        session
            .origin()
            .set_origin(LatLng::new(1.0, 2.0), OriginUpdate::model_only());
        provider.set_camera_target(LatLng::new(9.0, 9.0));
        provider.clear_calls();

        assert!(!session.attach_surface("missing"));
        assert!(provider.camera_moves().is_empty());

        assert!(session.attach_surface("booking_map"));
        let moves = provider.camera_moves();
        assert_eq!(moves.len(), 1);
        assert_eq!(moves[0].target, LatLng::new(1.0, 2.0));
        assert_eq!(provider.camera().target, LatLng::new(1.0, 2.0));
        session.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_plumbing_gated_on_ready() {
        let provider = Arc::new(SimulatedProvider::default());
        let session = MapSession::new(provider.clone(), MapSessionConfig::default()).unwrap();

        session.set_clickable(true);
        session.set_visible(false);
        session.refresh_layout();
        session.clear();
        assert!(provider.calls().is_empty());

        session.init().await.unwrap();
        provider.emit(MapEventKind::MapReady);
        provider.clear_calls();

        session.set_clickable(true);
        session.set_visible(false);
        session.refresh_layout();
        assert_eq!(
            provider.calls(),
            vec![
                ProviderCall::SetClickable(true),
                ProviderCall::SetVisible(false),
                ProviderCall::RefreshLayout,
            ]
        );
        session.shutdown();
    }

    #[tokio::test(start_paused = true)]
    async fn test_clear_forgets_markers() {
        let (provider, session) = ready_session().await;
        session
            .markers()
            .set_marker(LatLng::new(0.0, 0.0), "img/taxi.png")
            .await
            .unwrap();
        assert_eq!(session.markers().markers_count(), 1);

        session.clear();
        assert_eq!(session.markers().markers_count(), 0);
        assert_eq!(provider.marker_count(), 0);
        session.shutdown();
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = MapSessionConfig::default();
        config.motion.settle_interval_ms = config.motion.poll_interval_ms;

        let result = MapSession::new(Arc::new(SimulatedProvider::default()), config);
        assert!(matches!(result, Err(MapError::Config(_))));
    }

    #[tokio::test]
    async fn test_wait_until_ready() {
        let provider = Arc::new(SimulatedProvider::default());
        let session = MapSession::new(provider.clone(), MapSessionConfig::default()).unwrap();
        session.init().await.unwrap();

        let waiter = {
            let session = session.clone();
            tokio::spawn(async move { session.wait_until_ready().await })
        };
        provider.emit(MapEventKind::MapReady);
        waiter.await.unwrap();
        assert!(session.is_ready());
        session.shutdown();
    }
}
