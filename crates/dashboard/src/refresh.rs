//! Periodic auto-refresh task.
//!
//! [`AutoRefresh`] owns a background tokio task that calls a refresh closure
//! once per period. The first call happens one full period after spawning.
//! A refresh that overruns the period delays the next tick instead of
//! bursting to catch up.

use std::future::Future;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, warn};

/// Shortest period accepted; tokio intervals reject a zero period.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Handle to a running auto-refresh task.
///
/// Dropping the handle stops the task at its next await point; [`stop`]
/// additionally waits for it to finish.
///
/// [`stop`]: AutoRefresh::stop
#[derive(Debug)]
pub struct AutoRefresh {
    period: Duration,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl AutoRefresh {
    /// Spawn a task that awaits `tick()` every `period`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<F, Fut>(period: Duration, mut tick: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let period = period.max(MIN_PERIOD);
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = interval.tick() => {}
                }
                debug!("Auto-refresh tick");
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    () = tick() => {}
                }
            }
            debug!("Auto-refresh stopped");
        });

        debug!(period_secs = period.as_secs_f64(), "Auto-refresh started");
        Self {
            period,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }

    #[must_use]
    pub const fn period(&self) -> Duration {
        self.period
    }

    /// Whether the background task is still alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Cancel the task and wait for it to exit.
    ///
    /// An in-flight refresh is abandoned at its next await point.
    pub async fn stop(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
        {
            warn!(error = %e, "Auto-refresh task ended abnormally");
        }
    }
}

impl Drop for AutoRefresh {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn counting(counter: &Arc<AtomicUsize>) -> impl FnMut() -> std::future::Ready<()> + Send + 'static {
        let counter = Arc::clone(counter);
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_after_one_period() {
        let counter = Arc::new(AtomicUsize::new(0));
        let handle = AutoRefresh::spawn(Duration::from_secs(30), counting(&counter));

        tokio::time::sleep(Duration::from_secs(29)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_every_period() {
        let counter = Arc::new(AtomicUsize::new(0));
        let handle = AutoRefresh::spawn(Duration::from_secs(30), counting(&counter));

        tokio::time::sleep(Duration::from_secs(95)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 3);
        assert!(handle.is_running());

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_cancels_future_ticks() {
        let counter = Arc::new(AtomicUsize::new(0));
        let handle = AutoRefresh::spawn(Duration::from_secs(10), counting(&counter));

        tokio::time::sleep(Duration::from_secs(15)).await;
        handle.stop().await;
        let seen = counter.load(Ordering::SeqCst);
        assert_eq!(seen, 1);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(counter.load(Ordering::SeqCst), seen);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_task() {
        let counter = Arc::new(AtomicUsize::new(0));
        let handle = AutoRefresh::spawn(Duration::from_secs(10), counting(&counter));
        drop(handle);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_refresh_delays_next_tick() {
        let counter = Arc::new(AtomicUsize::new(0));
        let ticks = Arc::clone(&counter);
        let handle = AutoRefresh::spawn(Duration::from_secs(10), move || {
            let ticks = Arc::clone(&ticks);
            async move {
                ticks.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_secs(25)).await;
            }
        });

        // Refreshes run 10s-35s and 35s-60s; they never overlap.
        tokio::time::sleep(Duration::from_secs(50)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 2);

        handle.stop().await;
    }

    #[tokio::test]
    async fn test_zero_period_is_clamped() {
        let handle = AutoRefresh::spawn(Duration::ZERO, || std::future::ready(()));
        assert_eq!(handle.period(), MIN_PERIOD);
        handle.stop().await;
    }
}
