//! Connection management for SessionGate.
//!
//! This module provides:
//! - Connection limiting with a semaphore
//! - Active connection tracking for graceful shutdown

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::{Notify, OwnedSemaphorePermit, Semaphore};

/// Tracks active connections for graceful shutdown.
#[derive(Debug, Clone, Default)]
pub struct ConnectionTracker {
    inner: Arc<TrackerInner>,
}

#[derive(Debug, Default)]
struct TrackerInner {
    active: AtomicUsize,
    idle: Notify,
}

/// Marks one connection as active until dropped.
#[derive(Debug)]
pub struct ConnectionGuard {
    inner: Arc<TrackerInner>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        if self.inner.active.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.inner.idle.notify_waiters();
        }
    }
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connection; it stays counted while the guard lives.
    pub fn track(&self) -> ConnectionGuard {
        self.inner.active.fetch_add(1, Ordering::SeqCst);
        ConnectionGuard {
            inner: self.inner.clone(),
        }
    }

    /// Current number of active connections.
    pub fn count(&self) -> usize {
        self.inner.active.load(Ordering::SeqCst)
    }

    /// Waits until no connection is active or `timeout` elapses.
    /// Returns true if every connection finished in time.
    pub async fn wait_for_shutdown(&self, timeout: Duration) -> bool {
        let drained = async {
            loop {
                let idle = self.inner.idle.notified();
                if self.count() == 0 {
                    return;
                }
                idle.await;
            }
        };
        tokio::time::timeout(timeout, drained).await.is_ok()
    }
}

/// Outcome of a connection admission check.
#[derive(Debug)]
pub enum Admission {
    /// No limit configured.
    Unlimited,
    /// Admitted; the slot is released when the permit drops.
    Admitted(OwnedSemaphorePermit),
    /// At capacity.
    Rejected,
}

impl Admission {
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected)
    }
}

/// Caps the number of concurrent connections.
#[derive(Debug, Clone)]
pub struct ConnectionLimiter {
    semaphore: Option<Arc<Semaphore>>,
    max_connections: usize,
}

impl ConnectionLimiter {
    /// Create a new connection limiter.
    /// If max_connections is 0, no limit is enforced.
    pub fn new(max_connections: usize) -> Self {
        let semaphore = (max_connections > 0).then(|| Arc::new(Semaphore::new(max_connections)));
        Self {
            semaphore,
            max_connections,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.semaphore.is_some()
    }

    /// Get the maximum number of connections (0 means unlimited).
    pub fn max_connections(&self) -> usize {
        self.max_connections
    }

    /// Tries to take a connection slot without waiting.
    pub fn try_admit(&self) -> Admission {
        match &self.semaphore {
            None => Admission::Unlimited,
            Some(semaphore) => match semaphore.clone().try_acquire_owned() {
                Ok(permit) => Admission::Admitted(permit),
                Err(_) => Admission::Rejected,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ===========================================
    // ConnectionTracker tests
    // ===========================================

    #[test]
    fn test_connection_tracker_counts_guards() {
        let tracker = ConnectionTracker::new();
        assert_eq!(tracker.count(), 0);

        let first = tracker.track();
        let second = tracker.clone().track();
        assert_eq!(tracker.count(), 2);

        drop(first);
        assert_eq!(tracker.count(), 1);
        drop(second);
        assert_eq!(tracker.count(), 0);
    }

    #[tokio::test]
    async fn test_wait_for_shutdown_immediate() {
        let tracker = ConnectionTracker::new();
        assert!(tracker.wait_for_shutdown(Duration::from_millis(10)).await);
    }

    #[tokio::test]
    async fn test_wait_for_shutdown_after_release() {
        let tracker = ConnectionTracker::new();
        let guard = tracker.track();

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            drop(guard);
        });

        assert!(tracker.wait_for_shutdown(Duration::from_secs(2)).await);
        assert_eq!(tracker.count(), 0);
    }

    #[tokio::test]
    async fn test_wait_for_shutdown_timeout() {
        let tracker = ConnectionTracker::new();
        let _guard = tracker.track();

        assert!(!tracker.wait_for_shutdown(Duration::from_millis(30)).await);
        assert_eq!(tracker.count(), 1);
    }

    // ===========================================
    // ConnectionLimiter tests
    // ===========================================

    #[test]
    fn test_connection_limiter_unlimited() {
        let limiter = ConnectionLimiter::new(0);
        assert!(!limiter.is_enabled());
        assert_eq!(limiter.max_connections(), 0);
        assert!(matches!(limiter.try_admit(), Admission::Unlimited));
    }

    #[test]
    fn test_connection_limiter_rejects_at_capacity() {
        let limiter = ConnectionLimiter::new(2);

        let first = limiter.try_admit();
        let second = limiter.try_admit();
        assert!(matches!(first, Admission::Admitted(_)));
        assert!(matches!(second, Admission::Admitted(_)));
        assert!(limiter.try_admit().is_rejected());

        drop(first);
        assert!(matches!(limiter.try_admit(), Admission::Admitted(_)));
    }
}
