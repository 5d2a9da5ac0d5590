//! Camera motion detection
//!
//! Two cooperating tasks infer whether the camera is moving. The poll task
//! samples the camera every `poll_interval`; when the target changed it
//! flags `Moving` and (re)arms a settle-check. The settle-check samples every
//! `settle_interval` and drops the flag back to `Idle` once a sample matches
//! the last known position.
//!
//! Every poll cycle queries the camera on its own task, so a query that never
//! resolves only loses that one cycle. Queries are numbered when issued and
//! a late answer older than one already applied is discarded. The settle
//! query is bounded by the settle interval for the same reason.

use crate::{
    core::{
        camera::{MotionPhase, MotionState},
        config::MotionDetectorConfig,
    },
    provider::MapProvider,
    runtime::{lock, AsyncHandle, AsyncSpawner},
};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex,
};
use tokio::time::MissedTickBehavior;

type TaskSlot = Mutex<Option<Box<dyn AsyncHandle>>>;

struct DetectorShared {
    provider: Arc<dyn MapProvider>,
    spawner: Arc<dyn AsyncSpawner>,
    config: MotionDetectorConfig,
    state: Mutex<MotionState>,
    sample_counter: AtomicU64,
    settle_task: TaskSlot,
    poll_queries: Mutex<Vec<Box<dyn AsyncHandle>>>,
}

pub struct CameraMotionDetector {
    shared: Arc<DetectorShared>,
    poll_task: TaskSlot,
}

impl CameraMotionDetector {
    pub fn new(
        provider: Arc<dyn MapProvider>,
        spawner: Arc<dyn AsyncSpawner>,
        config: MotionDetectorConfig,
    ) -> Self {
        Self {
            shared: Arc::new(DetectorShared {
                provider,
                spawner,
                config,
                state: Mutex::new(MotionState::new()),
                sample_counter: AtomicU64::new(1),
                settle_task: Mutex::new(None),
                poll_queries: Mutex::new(Vec::new()),
            }),
            poll_task: Mutex::new(None),
        }
    }

    /// Starts the recurring camera poll. No-op while it is already running.
    pub fn start(&self) {
        let mut poll_task = lock(&self.poll_task);
        if poll_task.as_ref().is_some_and(|task| !task.is_finished()) {
            log::trace!("camera poll already running");
            return;
        }

        log::debug!(
            "starting camera poll every {}ms (settle after {}ms)",
            self.shared.config.poll_interval_ms,
            self.shared.config.settle_interval_ms
        );
        let shared = Arc::clone(&self.shared);
        *poll_task = Some(
            self.shared
                .spawner
                .spawn_boxed(Box::pin(async move { shared.run_poll_loop().await })),
        );
    }

    /// Cancels both timers and any outstanding camera query. State is left
    /// as last observed.
    pub fn stop(&self) {
        if let Some(task) = lock(&self.poll_task).take() {
            task.cancel();
        }
        if let Some(task) = lock(&self.shared.settle_task).take() {
            task.cancel();
        }
        for query in lock(&self.shared.poll_queries).drain(..) {
            query.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        lock(&self.poll_task)
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    pub fn is_moving(&self) -> bool {
        lock(&self.shared.state).is_moving()
    }

    pub fn phase(&self) -> MotionPhase {
        lock(&self.shared.state).phase()
    }

    pub fn has_pending_settle_check(&self) -> bool {
        lock(&self.shared.settle_task)
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }

    /// Poll queries issued but not yet answered
    pub fn outstanding_queries(&self) -> usize {
        lock(&self.shared.poll_queries)
            .iter()
            .filter(|query| !query.is_finished())
            .count()
    }
}

impl Drop for CameraMotionDetector {
    fn drop(&mut self) {
        self.stop();
    }
}

impl DetectorShared {
    async fn run_poll_loop(self: Arc<Self>) {
        let mut ticker = tokio::time::interval(self.config.poll_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            self.issue_poll();
        }
    }

    fn next_sample(&self) -> u64 {
        self.sample_counter.fetch_add(1, Ordering::Relaxed)
    }

    /// Starts one poll cycle's query without waiting for it
    fn issue_poll(self: &Arc<Self>) {
        let sample = self.next_sample();
        let shared = Arc::clone(self);
        let query = self
            .spawner
            .spawn_boxed(Box::pin(async move { shared.poll_once(sample).await }));

        let mut queries = lock(&self.poll_queries);
        queries.retain(|query| !query.is_finished());
        if !queries.is_empty() {
            log::trace!("{} camera queries still outstanding", queries.len());
        }
        queries.push(query);
    }

    async fn poll_once(self: Arc<Self>, sample: u64) {
        let snapshot = match self.provider.camera_position().await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                log::trace!("camera poll skipped: {}", err);
                return;
            }
        };

        let moved = {
            let mut state = lock(&self.state);
            if !state.accept_sample(sample) {
                log::trace!("discarding stale camera sample {}", sample);
                return;
            }
            state.observe_poll(snapshot.target)
        };
        if moved {
            log::trace!(
                "camera moved to ({:.6}, {:.6})",
                snapshot.target.lat,
                snapshot.target.lng
            );
            self.arm_settle_check();
        }
    }

    /// Replaces any pending settle-check with a fresh one
    fn arm_settle_check(self: &Arc<Self>) {
        let mut slot = lock(&self.settle_task);
        if let Some(previous) = slot.take() {
            previous.cancel();
        }

        let shared = Arc::clone(self);
        *slot = Some(
            self.spawner
                .spawn_boxed(Box::pin(async move { shared.run_settle_check().await })),
        );
    }

    /// Re-samples every `settle_interval` until the camera holds still
    async fn run_settle_check(self: Arc<Self>) {
        let settle_interval = self.config.settle_interval();
        loop {
            tokio::time::sleep(settle_interval).await;

            let sample = self.next_sample();
            let query = self.provider.camera_position();
            let snapshot = match tokio::time::timeout(settle_interval, query).await {
                Ok(Ok(snapshot)) => snapshot,
                Ok(Err(err)) => {
                    log::trace!("settle-check skipped: {}", err);
                    continue;
                }
                Err(_) => {
                    log::trace!("settle-check query timed out");
                    continue;
                }
            };

            let settled = {
                let mut state = lock(&self.state);
                if !state.accept_sample(sample) {
                    continue;
                }
                state.observe_settle(snapshot.target)
            };
            if settled {
                log::debug!("camera settled");
                return;
            }
        }
    }
}
