//! Runtime abstraction layer for async operations
//!
//! The session never calls `tokio::spawn` directly. Tasks go through an
//! injected [`AsyncSpawner`], which lets tests observe and count every task
//! the motion detector registers.

use futures::future::BoxFuture;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A trait for spawning async tasks (object-safe version)
pub trait AsyncSpawner: Send + Sync + 'static {
    /// Spawn a future and return a handle to it
    fn spawn_boxed(&self, future: BoxFuture<'static, ()>) -> Box<dyn AsyncHandle>;
}

/// Handle to a spawned async task
pub trait AsyncHandle: Send + Sync {
    /// Check if the task is finished
    fn is_finished(&self) -> bool;

    /// Cancel the task
    fn cancel(&self);
}

/// Tokio-based async spawner
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSpawner;

impl AsyncSpawner for TokioSpawner {
    fn spawn_boxed(&self, future: BoxFuture<'static, ()>) -> Box<dyn AsyncHandle> {
        Box::new(TokioHandle(tokio::spawn(future)))
    }
}

struct TokioHandle(tokio::task::JoinHandle<()>);

impl AsyncHandle for TokioHandle {
    fn is_finished(&self) -> bool {
        self.0.is_finished()
    }

    fn cancel(&self) {
        self.0.abort();
    }
}

/// Locks a mutex, recovering the data if a previous holder panicked.
///
/// Guards taken through this helper are never held across an `.await`.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
