//! Shutdown coordination.

use super::signal::shutdown_signal;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::info;

/// Fans a single shutdown trigger out to the server and its drain timer.
#[derive(Clone)]
pub struct ShutdownCoordinator {
    /// Shutdown initiated flag.
    initiated: Arc<AtomicBool>,
    /// Broadcasts `true` once shutdown starts.
    sender: Arc<watch::Sender<bool>>,
    /// How long in-flight requests may take to drain.
    timeout: Duration,
}

impl ShutdownCoordinator {
    pub fn new(timeout: Duration) -> Self {
        let (sender, _) = watch::channel(false);

        Self {
            initiated: Arc::new(AtomicBool::new(false)),
            sender: Arc::new(sender),
            timeout,
        }
    }

    /// Check if shutdown has been initiated.
    pub fn is_shutting_down(&self) -> bool {
        self.initiated.load(Ordering::SeqCst)
    }

    /// Initiate shutdown. Later calls are no-ops.
    pub fn initiate(&self) {
        if self.initiated.swap(true, Ordering::SeqCst) {
            return;
        }

        info!(drain_secs = self.timeout.as_secs(), "Initiating graceful shutdown");
        self.sender.send_replace(true);
    }

    /// Resolves once shutdown has been initiated.
    pub fn wait(&self) -> impl Future<Output = ()> + Send + 'static {
        let mut rx = self.sender.subscribe();
        async move {
            let _ = rx.wait_for(|&started| started).await;
        }
    }

    /// Resolves when the drain window after initiation has run out.
    pub fn drain_deadline(&self) -> impl Future<Output = ()> + Send + 'static {
        let started = self.wait();
        let timeout = self.timeout;
        async move {
            started.await;
            tokio::time::sleep(timeout).await;
        }
    }

    /// Initiate shutdown when the process receives SIGINT or SIGTERM.
    pub fn listen_for_signals(&self) {
        let coordinator = self.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            coordinator.initiate();
        });
    }

    /// Get shutdown timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_pending, assert_ready, task};

    #[tokio::test]
    async fn test_wait_resolves_after_initiate() {
        let coordinator = ShutdownCoordinator::default();
        let mut wait = task::spawn(coordinator.wait());

        assert_pending!(wait.poll());
        assert!(!coordinator.is_shutting_down());

        coordinator.initiate();
        assert!(wait.is_woken());
        assert_ready!(wait.poll());
        assert!(coordinator.is_shutting_down());
    }

    #[tokio::test]
    async fn test_late_waiter_sees_shutdown() {
        let coordinator = ShutdownCoordinator::default();
        coordinator.initiate();
        coordinator.initiate();

        let mut wait = task::spawn(coordinator.wait());
        assert_ready!(wait.poll());
    }

    #[tokio::test(start_paused = true)]
    async fn test_drain_deadline_waits_for_timeout() {
        let coordinator = ShutdownCoordinator::new(Duration::from_secs(5));
        let deadline = coordinator.drain_deadline();
        coordinator.initiate();

        let started = tokio::time::Instant::now();
        deadline.await;
        assert!(started.elapsed() >= Duration::from_secs(5));
    }
}
