//! Single-resolution readiness latch for the map surface
//!
//! The latch fires at most once. Callbacks registered before it fires run in
//! registration order when it does; later registrations run immediately.
//! Async callers can wait on the same latch.

use crate::runtime::lock;
use std::sync::Mutex;
use tokio::sync::watch;

pub type ReadyCallback = Box<dyn FnOnce() + Send + 'static>;

enum LatchState {
    Pending(Vec<ReadyCallback>),
    Fired,
}

pub struct ReadyLatch {
    state: Mutex<LatchState>,
    signal: watch::Sender<bool>,
}

impl ReadyLatch {
    pub fn new() -> Self {
        let (signal, _) = watch::channel(false);
        Self {
            state: Mutex::new(LatchState::Pending(Vec::new())),
            signal,
        }
    }

    pub fn is_fired(&self) -> bool {
        matches!(*lock(&self.state), LatchState::Fired)
    }

    /// Runs `callback` once the latch fires, or right away if it already has
    pub fn subscribe(&self, callback: ReadyCallback) {
        {
            let mut state = lock(&self.state);
            if let LatchState::Pending(queue) = &mut *state {
                queue.push(callback);
                return;
            }
        }
        callback();
    }

    /// Fires the latch. Returns `false` if it had already fired.
    pub fn fire(&self) -> bool {
        let queued = {
            let mut state = lock(&self.state);
            match std::mem::replace(&mut *state, LatchState::Fired) {
                LatchState::Pending(queue) => queue,
                LatchState::Fired => return false,
            }
        };

        self.signal.send_replace(true);
        log::debug!("map surface ready, running {} queued callbacks", queued.len());
        for callback in queued {
            callback();
        }
        true
    }

    /// Resolves once the latch has fired
    pub async fn wait(&self) {
        let mut receiver = self.signal.subscribe();
        // The sender lives as long as `self`, so this cannot observe a close.
        let _ = receiver.wait_for(|ready| *ready).await;
    }
}

impl Default for ReadyLatch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_callbacks_run_fifo_once() {
        let latch = ReadyLatch::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for id in 0..3 {
            let order = order.clone();
            latch.subscribe(Box::new(move || order.lock().unwrap().push(id)));
        }
        assert!(order.lock().unwrap().is_empty());

        assert!(latch.fire());
        assert!(!latch.fire());
        assert_eq!(*order.lock().unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn test_late_subscriber_runs_immediately() {
        let latch = ReadyLatch::new();
        latch.fire();

        let called = Arc::new(Mutex::new(false));
        let flag = called.clone();
        latch.subscribe(Box::new(move || *flag.lock().unwrap() = true));
        assert!(*called.lock().unwrap());
    }

    #[test]
    fn test_callback_may_subscribe_again() {
        let latch = Arc::new(ReadyLatch::new());
        latch.fire();

        let hits = Arc::new(Mutex::new(0));
        let inner_latch = latch.clone();
        let inner_hits = hits.clone();
        latch.subscribe(Box::new(move || {
            *inner_hits.lock().unwrap() += 1;
            let hits = inner_hits.clone();
            inner_latch.subscribe(Box::new(move || *hits.lock().unwrap() += 1));
        }));

        assert_eq!(*hits.lock().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_wait_resolves_after_fire() {
        let latch = Arc::new(ReadyLatch::new());
        let waiter = {
            let latch = latch.clone();
            tokio::spawn(async move { latch.wait().await })
        };

        tokio::task::yield_now().await;
        assert!(!waiter.is_finished());

        latch.fire();
        waiter.await.unwrap();
        assert!(latch.is_fired());

        // Already fired: resolves without blocking
        latch.wait().await;
    }
}
