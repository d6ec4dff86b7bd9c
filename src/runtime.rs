//! Runtime abstraction layer for async operations
//!
//! Background fetches are handed to an [`AsyncSpawner`] owned by whoever builds
//! the pin cache, so the crate works with a Tokio runtime, with a host that
//! pumps futures on its own loop, or fully synchronously in tests.

use crate::prelude::{Arc, Future, Pin};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

/// Boxed future as accepted by [`AsyncSpawner::spawn_boxed`]
pub type BoxedTask = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// A trait for spawning async tasks (object-safe version)
pub trait AsyncSpawner: Send + Sync + 'static {
    /// Spawn a future and return a handle to it
    fn spawn_boxed(&self, future: BoxedTask) -> Box<dyn AsyncHandle>;
}

/// Handle to a spawned async task
pub trait AsyncHandle: Send + Sync {
    /// Check if the task is finished
    fn is_finished(&self) -> bool;

    /// Cancel the task
    fn cancel(&self);
}

/// Convenience function for spawning with type safety
pub fn spawn<F>(spawner: &dyn AsyncSpawner, future: F) -> Box<dyn AsyncHandle>
where
    F: Future<Output = ()> + Send + 'static,
{
    spawner.spawn_boxed(Box::pin(future))
}

/// Runs every future to completion on the calling thread.
///
/// Useful for hosts without an executor and for deterministic tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineSpawner;

impl AsyncSpawner for InlineSpawner {
    fn spawn_boxed(&self, future: BoxedTask) -> Box<dyn AsyncHandle> {
        futures::executor::block_on(future);
        Box::new(FlagHandle::finished())
    }
}

/// Collects futures and runs them only when [`QueuedSpawner::run_pending`] is called.
///
/// Lets a host drive background work from its own loop; cancelled tasks are
/// dropped without being polled.
#[derive(Default)]
pub struct QueuedSpawner {
    queue: Mutex<Vec<(BoxedTask, Arc<FlagState>)>>,
}

impl QueuedSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks waiting to be run
    pub fn pending(&self) -> usize {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Runs all queued tasks in submission order, returns how many were run
    pub fn run_pending(&self) -> usize {
        let tasks = std::mem::take(&mut *self.queue.lock().unwrap_or_else(PoisonError::into_inner));
        let mut ran = 0;
        for (task, state) in tasks {
            if state.cancelled.load(Ordering::SeqCst) {
                continue;
            }
            futures::executor::block_on(task);
            state.finished.store(true, Ordering::SeqCst);
            ran += 1;
        }
        ran
    }
}

impl AsyncSpawner for QueuedSpawner {
    fn spawn_boxed(&self, future: BoxedTask) -> Box<dyn AsyncHandle> {
        let state = Arc::new(FlagState::default());
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((future, state.clone()));
        Box::new(FlagHandle { state })
    }
}

#[derive(Debug, Default)]
struct FlagState {
    finished: AtomicBool,
    cancelled: AtomicBool,
}

struct FlagHandle {
    state: Arc<FlagState>,
}

impl FlagHandle {
    fn finished() -> Self {
        let state = FlagState::default();
        state.finished.store(true, Ordering::SeqCst);
        Self {
            state: Arc::new(state),
        }
    }
}

impl AsyncHandle for FlagHandle {
    fn is_finished(&self) -> bool {
        self.state.finished.load(Ordering::SeqCst) || self.state.cancelled.load(Ordering::SeqCst)
    }

    fn cancel(&self) {
        self.state.cancelled.store(true, Ordering::SeqCst);
    }
}

/// Default spawner implementations
pub mod spawners {
    #[cfg(feature = "tokio-runtime")]
    pub mod tokio_impl {
        use crate::runtime::{AsyncHandle, AsyncSpawner, BoxedTask};
        use crate::{QuestPinError, Result};
        use ::tokio::runtime::Handle;
        use ::tokio::task::JoinHandle;

        /// Tokio-based async spawner
        #[derive(Debug, Clone)]
        pub struct TokioSpawner {
            handle: Handle,
        }

        impl TokioSpawner {
            pub fn new(handle: Handle) -> Self {
                Self { handle }
            }

            /// Spawner for the runtime the caller is running in
            pub fn current() -> Result<Self> {
                Handle::try_current()
                    .map(Self::new)
                    .map_err(|e| QuestPinError::Runtime(e.to_string()))
            }
        }

        impl AsyncSpawner for TokioSpawner {
            fn spawn_boxed(&self, future: BoxedTask) -> Box<dyn AsyncHandle> {
                Box::new(TokioHandle(self.handle.spawn(future)))
            }
        }

        struct TokioHandle(JoinHandle<()>);

        impl AsyncHandle for TokioHandle {
            fn is_finished(&self) -> bool {
                self.0.is_finished()
            }

            fn cancel(&self) {
                self.0.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_inline_spawner_runs_immediately() {
        let counter = Arc::new(AtomicUsize::new(0));
        let task_counter = counter.clone();
        let handle = spawn(&InlineSpawner, async move {
            task_counter.fetch_add(1, Ordering::SeqCst);
        });

        assert!(handle.is_finished());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_queued_spawner_skips_cancelled_tasks() {
        let spawner = QueuedSpawner::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let first = counter.clone();
        let kept = spawn(&spawner, async move {
            first.fetch_add(1, Ordering::SeqCst);
        });
        let second = counter.clone();
        let cancelled = spawn(&spawner, async move {
            second.fetch_add(10, Ordering::SeqCst);
        });
        cancelled.cancel();

        assert_eq!(spawner.pending(), 2);
        assert!(!kept.is_finished());
        assert_eq!(spawner.run_pending(), 1);
        assert!(kept.is_finished());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(spawner.pending(), 0);
    }

    #[cfg(feature = "tokio-runtime")]
    #[::tokio::test]
    async fn test_tokio_spawner() {
        let spawner = spawners::tokio_impl::TokioSpawner::current().unwrap();
        let handle = spawn(&spawner, async {
            ::tokio::time::sleep(::tokio::time::Duration::from_millis(10)).await;
        });

        assert!(!handle.is_finished());

        ::tokio::time::sleep(::tokio::time::Duration::from_millis(100)).await;
        assert!(handle.is_finished());
    }
}
