//! Worker pool for asynchronous rules.
//!
//! The router runs synchronous rules inline and hands asynchronous ones to a
//! [`Dispatcher`]. Submitted pipelines are fire-and-forget: there is no
//! result channel, no timeout and no cancellation. At most `pool_size`
//! pipelines run at once; the rest wait for a permit.
//!
//! Every submitted task is tracked, so [`Dispatcher::shutdown`] can stop
//! intake and wait for the in-flight pipelines to drain.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

/// Default number of asynchronous pipelines allowed to run concurrently.
pub const DEFAULT_POOL_SIZE: usize = 100;

/// Bounded executor for asynchronous rule pipelines.
///
/// Cloning is cheap; clones share the same pool.
#[derive(Clone)]
pub struct Dispatcher {
    permits: Arc<Semaphore>,
    tracker: TaskTracker,
    pool_size: usize,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(DEFAULT_POOL_SIZE)
    }
}

impl Dispatcher {
    /// Creates a pool running at most `pool_size` tasks at once.
    ///
    /// A size of zero is treated as one.
    pub fn new(pool_size: usize) -> Self {
        let pool_size = pool_size.max(1);
        Self {
            permits: Arc::new(Semaphore::new(pool_size)),
            tracker: TaskTracker::new(),
            pool_size,
        }
    }

    /// Submits a task. Must be called from within a tokio runtime.
    ///
    /// Returns `false` and drops the task if the pool has been shut down.
    pub fn spawn<F>(&self, task: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.tracker.is_closed() {
            warn!("Dispatcher is shut down, dropping asynchronous task");
            return false;
        }

        let permits = Arc::clone(&self.permits);
        self.tracker.spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                return;
            };
            task.await;
        });
        true
    }

    /// Stops accepting tasks and waits until every submitted task finished.
    pub async fn shutdown(&self) {
        self.tracker.close();
        debug!(in_flight = self.tracker.len(), "Waiting for asynchronous tasks");
        self.tracker.wait().await;
    }

    /// Number of submitted tasks that have not finished yet.
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    pub fn is_shut_down(&self) -> bool {
        self.tracker.is_closed()
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("pool_size", &self.pool_size)
            .field("in_flight", &self.tracker.len())
            .field("closed", &self.tracker.is_closed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn shutdown_waits_for_tasks() {
        let dispatcher = Dispatcher::new(4);
        let done = Arc::new(AtomicUsize::new(0));

        for _ in 0..8 {
            let done = Arc::clone(&done);
            assert!(dispatcher.spawn(async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                done.fetch_add(1, Ordering::SeqCst);
            }));
        }

        dispatcher.shutdown().await;
        assert_eq!(done.load(Ordering::SeqCst), 8);
        assert_eq!(dispatcher.in_flight(), 0);
    }

    #[tokio::test]
    async fn rejects_tasks_after_shutdown() {
        let dispatcher = Dispatcher::default();
        dispatcher.shutdown().await;

        assert!(dispatcher.is_shut_down());
        assert!(!dispatcher.spawn(async {}));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn pool_size_bounds_concurrency() {
        let dispatcher = Dispatcher::new(2);
        let running = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        for _ in 0..10 {
            let running = Arc::clone(&running);
            let peak = Arc::clone(&peak);
            dispatcher.spawn(async move {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                running.fetch_sub(1, Ordering::SeqCst);
            });
        }

        dispatcher.shutdown().await;
        assert!(peak.load(Ordering::SeqCst) <= 2);
        assert_eq!(dispatcher.pool_size(), 2);
    }

    #[test]
    fn zero_pool_size_is_clamped() {
        assert_eq!(Dispatcher::new(0).pool_size(), 1);
    }
}
