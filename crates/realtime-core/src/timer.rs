//! Self-rescheduling sampling timer.
//!
//! The timer runs one tokio task that calls its target, then sleeps a
//! full period, then calls it again. Because the next sleep only starts
//! after the previous call returns, slow ticks delay the schedule rather
//! than piling up. The first call happens as soon as the task is polled.
//!
//! Starting a timer that is already running cancels the old task, and the
//! new task waits for the old one to wind down before its first tick, so
//! a host that reloads never ends up with two timers. Dropping the timer
//! cancels its task.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, warn};

/// Errors that can occur when starting the timer.
#[derive(Debug, thiserror::Error)]
pub enum TimerError {
    /// A zero period would spin without yielding.
    #[error("sampling period must be greater than zero")]
    ZeroPeriod,

    /// `start` was called outside a tokio runtime.
    #[error("sampling timer needs a running tokio runtime")]
    NoRuntime,

    /// A tick panicked and the sampling task died before it was stopped.
    #[error("sampling task panicked")]
    TaskPanicked,
}

/// Work performed on every timer tick.
pub trait SampleTick: Send + Sync {
    /// Called once per period.
    fn on_sample(&self);
}

/// Periodic driver for a [`SampleTick`] target.
#[derive(Debug)]
pub struct SamplingTimer {
    period: Duration,
    task: Option<JoinHandle<()>>,
    ticks: Arc<AtomicU64>,
}

impl SamplingTimer {
    /// Create a stopped timer.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::ZeroPeriod`] if `period` is zero.
    pub fn new(period: Duration) -> Result<Self, TimerError> {
        if period.is_zero() {
            return Err(TimerError::ZeroPeriod);
        }
        Ok(Self {
            period,
            task: None,
            ticks: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Start ticking `target`, cancelling any task already running.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::NoRuntime`] when called outside a tokio runtime.
    pub fn start(&mut self, target: Arc<dyn SampleTick>) -> Result<(), TimerError> {
        let handle = tokio::runtime::Handle::try_current().map_err(|_err| TimerError::NoRuntime)?;

        let previous = self.task.take();
        if let Some(task) = &previous {
            task.abort();
            debug!("Previous sampling timer cancelled");
        }

        let period = self.period;
        let ticks = Arc::clone(&self.ticks);
        self.task = Some(handle.spawn(async move {
            if let Some(task) = previous {
                // An aborted task can still be mid-tick on another worker.
                let _ = join_outcome(task.await);
            }
            loop {
                target.on_sample();
                ticks.fetch_add(1, Ordering::Relaxed);
                tokio::time::sleep(period).await;
            }
        }));

        info!(
            period_ms = u64::try_from(self.period().as_millis()).unwrap_or(u64::MAX),
            "Sampling timer started"
        );
        Ok(())
    }

    /// Cancel the task and wait until it has finished.
    ///
    /// No tick runs after this returns. Stopping a stopped timer is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`TimerError::TaskPanicked`] if a tick panicked, which
    /// means sampling had already stopped on its own.
    pub async fn stop(&mut self) -> Result<(), TimerError> {
        let Some(task) = self.task.take() else {
            return Ok(());
        };
        task.abort();
        let outcome = join_outcome(task.await);
        info!(ticks = self.ticks(), "Sampling timer stopped");
        outcome
    }

    /// Whether a task is currently scheduled.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Total ticks run by this timer across restarts.
    pub fn ticks(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// The configured period.
    pub const fn period(&self) -> Duration {
        self.period
    }
}

/// Cancellation is the expected end of a sampling task; a panic is not.
fn join_outcome(result: Result<(), JoinError>) -> Result<(), TimerError> {
    match result {
        Err(err) if err.is_panic() => {
            warn!(error = %err, "Sampling task panicked");
            Err(TimerError::TaskPanicked)
        }
        _ => Ok(()),
    }
}

impl Drop for SamplingTimer {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Counter {
        calls: AtomicU64,
    }

    impl SampleTick for Counter {
        fn on_sample(&self) {
            self.calls.fetch_add(1, Ordering::Relaxed);
        }
    }

    impl Counter {
        fn calls(&self) -> u64 {
            self.calls.load(Ordering::Relaxed)
        }
    }

    #[test]
    fn zero_period_is_rejected() {
        assert!(matches!(
            SamplingTimer::new(Duration::ZERO),
            Err(TimerError::ZeroPeriod)
        ));
    }

    #[test]
    fn start_outside_runtime_fails() {
        let mut timer = SamplingTimer::new(Duration::from_secs(1)).unwrap();
        let counter = Arc::new(Counter::default());
        assert!(matches!(timer.start(counter), Err(TimerError::NoRuntime)));
        assert!(!timer.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_immediately_then_once_per_period() {
        let mut timer = SamplingTimer::new(Duration::from_secs(1)).unwrap();
        let counter = Arc::new(Counter::default());
        timer.start(counter.clone()).unwrap();

        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(counter.calls(), 4);
        assert_eq!(timer.ticks(), 4);
        assert!(timer.is_running());

        timer.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn stop_halts_ticks() {
        let mut timer = SamplingTimer::new(Duration::from_secs(1)).unwrap();
        let counter = Arc::new(Counter::default());
        timer.start(counter.clone()).unwrap();

        tokio::time::sleep(Duration::from_millis(1500)).await;
        timer.stop().await.unwrap();
        let after_stop = counter.calls();
        assert!(!timer.is_running());

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(counter.calls(), after_stop);

        // Stopping twice is harmless.
        timer.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn restart_does_not_leak_a_second_timer() {
        let mut timer = SamplingTimer::new(Duration::from_secs(1)).unwrap();
        let counter = Arc::new(Counter::default());
        timer.start(counter.clone()).unwrap();
        timer.start(counter.clone()).unwrap();

        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(counter.calls(), 3);

        timer.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn restart_while_running_keeps_a_single_schedule() {
        let mut timer = SamplingTimer::new(Duration::from_secs(1)).unwrap();
        let counter = Arc::new(Counter::default());
        timer.start(counter.clone()).unwrap();
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(counter.calls(), 2);

        // The replacement ticks at 1.5s, 2.5s and 3.5s; the old task must not.
        timer.start(counter.clone()).unwrap();
        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(counter.calls(), 5);
        assert_eq!(timer.period(), Duration::from_secs(1));

        timer.stop().await.unwrap();
    }

    struct Exploding;

    impl SampleTick for Exploding {
        #[allow(clippy::panic)]
        fn on_sample(&self) {
            panic!("tick failed");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stop_reports_a_panicked_tick() {
        let mut timer = SamplingTimer::new(Duration::from_secs(1)).unwrap();
        timer.start(Arc::new(Exploding)).unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!timer.is_running());

        assert!(matches!(timer.stop().await, Err(TimerError::TaskPanicked)));
        // The failed task was consumed by the first stop.
        assert!(timer.stop().await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn restart_after_a_panicked_tick_resumes_sampling() {
        let mut timer = SamplingTimer::new(Duration::from_secs(1)).unwrap();
        timer.start(Arc::new(Exploding)).unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;

        let counter = Arc::new(Counter::default());
        timer.start(counter.clone()).unwrap();
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(counter.calls(), 2);

        timer.stop().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_timer_cancels_it() {
        let counter = Arc::new(Counter::default());
        {
            let mut timer = SamplingTimer::new(Duration::from_secs(1)).unwrap();
            timer.start(counter.clone()).unwrap();
            tokio::time::sleep(Duration::from_millis(500)).await;
        }
        let after_drop = counter.calls();
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(counter.calls(), after_drop);
    }
}
