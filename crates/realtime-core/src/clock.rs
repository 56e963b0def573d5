//! Host clock access and clock sampling.
//!
//! The sampler reads the host's wall clock (never game time), normalizes
//! the reading into a [`ClockSnapshot`] and records it in a shared
//! [`ClockState`]. Sampling is fail-soft: when the host clock is
//! unavailable or reports nonsense, the previous good snapshot is kept
//! and returned instead.
//!
//! # Design Principles
//!
//! - The clock is queried live on every sample, so the snapshot always
//!   reflects the host's current time.
//! - [`ClockState`] is an explicitly owned handle passed to whoever needs
//!   the last sample; there is no process-wide "current time".

use std::sync::{Arc, PoisonError, RwLock};

use chrono::Local;
use realtime_types::{ClockSnapshot, HostTime};
use tracing::{trace, warn};

/// Source of wall-clock readings.
pub trait HostClock: Send + Sync {
    /// Current local time, or `None` if the clock cannot be read right now.
    fn now(&self) -> Option<HostTime>;
}

/// The operating system clock in the local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl HostClock for SystemClock {
    fn now(&self) -> Option<HostTime> {
        Some(HostTime::from_datetime(&Local::now()))
    }
}

/// A clock that reports whatever it was last told.
///
/// Used by tests and by hosts that drive time themselves. The clock can
/// also be made unavailable to exercise the fail-soft path.
#[derive(Debug, Default)]
pub struct FixedClock {
    time: RwLock<Option<HostTime>>,
}

impl FixedClock {
    /// Create a clock reporting `time`.
    pub const fn new(time: HostTime) -> Self {
        Self {
            time: RwLock::new(Some(time)),
        }
    }

    /// Create a clock that cannot be read.
    pub const fn unavailable() -> Self {
        Self {
            time: RwLock::new(None),
        }
    }

    /// Change the reported time.
    pub fn set(&self, time: HostTime) {
        *self.time.write().unwrap_or_else(PoisonError::into_inner) = Some(time);
    }

    /// Make subsequent reads fail.
    pub fn set_unavailable(&self) {
        *self.time.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl HostClock for FixedClock {
    fn now(&self) -> Option<HostTime> {
        *self.time.read().unwrap_or_else(PoisonError::into_inner)
    }
}

/// The most recent good clock snapshot.
///
/// Shared by handle between the sampler and any reader. Before the first
/// successful sample it reports [`ClockSnapshot::EPOCH`].
#[derive(Debug, Default)]
pub struct ClockState {
    latest: RwLock<Option<ClockSnapshot>>,
}

impl ClockState {
    /// Create an empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// The last recorded snapshot, or the epoch if none was recorded yet.
    pub fn latest(&self) -> ClockSnapshot {
        self.latest
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .unwrap_or(ClockSnapshot::EPOCH)
    }

    /// Whether at least one good sample has been recorded.
    pub fn has_sample(&self) -> bool {
        self.latest
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn record(&self, snapshot: ClockSnapshot) {
        *self.latest.write().unwrap_or_else(PoisonError::into_inner) = Some(snapshot);
    }
}

/// Turns host clock readings into [`ClockSnapshot`]s.
pub struct ClockSampler {
    clock: Arc<dyn HostClock>,
    state: Arc<ClockState>,
}

impl ClockSampler {
    /// Create a sampler reading `clock` and recording into `state`.
    pub fn new(clock: Arc<dyn HostClock>, state: Arc<ClockState>) -> Self {
        Self { clock, state }
    }

    /// Take one sample.
    ///
    /// Never fails: an unreadable or out-of-range reading leaves the
    /// state untouched and returns the previous snapshot.
    pub fn sample(&self) -> ClockSnapshot {
        let Some(reading) = self.clock.now() else {
            warn!("Host clock unavailable, keeping previous snapshot");
            return self.state.latest();
        };

        match ClockSnapshot::from_host(reading) {
            Some(snapshot) => {
                trace!(
                    hour = snapshot.hour,
                    minute = snapshot.minute,
                    second = snapshot.second,
                    "Clock sampled"
                );
                self.state.record(snapshot);
                snapshot
            }
            None => {
                warn!(?reading, "Host clock reading out of range, keeping previous snapshot");
                self.state.latest()
            }
        }
    }

    /// The shared state this sampler records into.
    pub const fn state(&self) -> &Arc<ClockState> {
        &self.state
    }
}

impl core::fmt::Debug for ClockSampler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ClockSampler")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// 2024-03-15 was a Friday.
    fn friday_evening() -> HostTime {
        HostTime {
            year: 2024,
            month0: 2,
            day: 15,
            weekday_from_sunday: 5,
            hour: 18,
            minute: 30,
            second: 12,
        }
    }

    fn make_sampler(clock: &Arc<FixedClock>) -> ClockSampler {
        let clock: Arc<dyn HostClock> = clock.clone();
        ClockSampler::new(clock, Arc::new(ClockState::new()))
    }

    #[test]
    fn sample_normalizes_host_reading() {
        let clock = Arc::new(FixedClock::new(friday_evening()));
        let sampler = make_sampler(&clock);

        let snapshot = sampler.sample();
        assert_eq!(snapshot.year, 2024);
        assert_eq!(snapshot.month, 3);
        assert_eq!(snapshot.day, 15);
        assert_eq!(snapshot.weekday, 5);
        assert_eq!(snapshot.hour, 18);
        assert_eq!(snapshot.minute, 30);
        assert_eq!(snapshot.second, 12);
        assert_eq!(sampler.state().latest(), snapshot);
    }

    #[test]
    fn sample_tracks_live_clock() {
        let clock = Arc::new(FixedClock::new(friday_evening()));
        let sampler = make_sampler(&clock);
        let _ = sampler.sample();

        clock.set(HostTime {
            minute: 31,
            ..friday_evening()
        });
        assert_eq!(sampler.sample().minute, 31);
    }

    #[test]
    fn outage_keeps_previous_snapshot() {
        let clock = Arc::new(FixedClock::new(friday_evening()));
        let sampler = make_sampler(&clock);
        let good = sampler.sample();

        clock.set_unavailable();
        assert_eq!(sampler.sample(), good);
        assert_eq!(sampler.state().latest(), good);
    }

    #[test]
    fn corrupt_reading_keeps_previous_snapshot() {
        let clock = Arc::new(FixedClock::new(friday_evening()));
        let sampler = make_sampler(&clock);
        let good = sampler.sample();

        clock.set(HostTime {
            hour: 25,
            ..friday_evening()
        });
        assert_eq!(sampler.sample(), good);
    }

    #[test]
    fn outage_before_first_sample_reports_epoch() {
        let clock = Arc::new(FixedClock::unavailable());
        let sampler = make_sampler(&clock);
        assert_eq!(sampler.sample(), ClockSnapshot::EPOCH);
        assert!(!sampler.state().has_sample());
    }

    #[test]
    fn system_clock_reads_in_range() {
        let reading = SystemClock.now().unwrap();
        assert!(ClockSnapshot::from_host(reading).is_some());
    }
}
