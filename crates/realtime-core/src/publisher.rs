//! Mirrors clock snapshots into host variables.
//!
//! Each of the seven clock fields can be bound to a host variable. On
//! every publish the bound slots are overwritten with the snapshot's
//! values, unless time is frozen, in which case nothing is written and
//! the variables keep whatever they last held.

use std::sync::Arc;

use realtime_types::{ClockSnapshot, VariableId};
use tracing::debug;

use crate::config::VariableBindings;
use crate::host::{VariableStore, write_variable};

/// Writes snapshots into the variable slots named by a [`VariableBindings`].
pub struct VariablePublisher {
    store: Arc<dyn VariableStore>,
    bindings: VariableBindings,
}

impl VariablePublisher {
    /// Create a publisher for `store` with fixed `bindings`.
    pub fn new(store: Arc<dyn VariableStore>, bindings: VariableBindings) -> Self {
        Self { store, bindings }
    }

    /// Publish one snapshot.
    ///
    /// Does nothing while `frozen`. Unbound fields are skipped without
    /// touching the store. Returns the number of variables written.
    pub fn publish(&self, snapshot: &ClockSnapshot, frozen: bool) -> usize {
        if frozen {
            debug!("Time frozen, skipping variable publish");
            return 0;
        }

        let fields: [(VariableId, i64); 7] = [
            (self.bindings.year, i64::from(snapshot.year)),
            (self.bindings.month, i64::from(snapshot.month)),
            (self.bindings.date, i64::from(snapshot.day)),
            (self.bindings.week_day, i64::from(snapshot.weekday)),
            (self.bindings.hour, i64::from(snapshot.hour)),
            (self.bindings.minute, i64::from(snapshot.minute)),
            (self.bindings.second, i64::from(snapshot.second)),
        ];

        let mut written: usize = 0;
        for (id, value) in fields {
            if write_variable(self.store.as_ref(), id, value) {
                written = written.saturating_add(1);
            }
        }

        debug!(written, "Clock variables published");
        written
    }
}

impl core::fmt::Debug for VariablePublisher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VariablePublisher")
            .field("bindings", &self.bindings)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::host::MemoryVariables;

    fn all_bound() -> VariableBindings {
        VariableBindings {
            year: VariableId(1),
            month: VariableId(2),
            date: VariableId(3),
            week_day: VariableId(4),
            hour: VariableId(5),
            minute: VariableId(6),
            second: VariableId(7),
        }
    }

    fn sunday_noon() -> ClockSnapshot {
        ClockSnapshot {
            year: 2024,
            month: 3,
            day: 10,
            weekday: 7,
            hour: 12,
            minute: 5,
            second: 9,
        }
    }

    #[test]
    fn writes_every_bound_field() {
        let store = Arc::new(MemoryVariables::new());
        let publisher = VariablePublisher::new(store.clone(), all_bound());

        assert_eq!(publisher.publish(&sunday_noon(), false), 7);
        assert_eq!(store.get_variable(VariableId(1)), 2024);
        assert_eq!(store.get_variable(VariableId(2)), 3);
        assert_eq!(store.get_variable(VariableId(3)), 10);
        assert_eq!(store.get_variable(VariableId(4)), 7);
        assert_eq!(store.get_variable(VariableId(5)), 12);
        assert_eq!(store.get_variable(VariableId(6)), 5);
        assert_eq!(store.get_variable(VariableId(7)), 9);
    }

    #[test]
    fn frozen_publish_leaves_variables_alone() {
        let store = Arc::new(MemoryVariables::new());
        store.set_variable(VariableId(5), 3);
        let publisher = VariablePublisher::new(store.clone(), all_bound());

        let later = ClockSnapshot {
            hour: 23,
            ..sunday_noon()
        };
        assert_eq!(publisher.publish(&sunday_noon(), true), 0);
        assert_eq!(publisher.publish(&later, true), 0);

        assert_eq!(store.get_variable(VariableId(5)), 3);
        assert_eq!(store.snapshot().len(), 1);
    }

    /// Records which slots were written.
    #[derive(Default)]
    struct WriteLog {
        writes: Mutex<Vec<(u32, i64)>>,
    }

    impl VariableStore for WriteLog {
        fn get_variable(&self, _id: VariableId) -> i64 {
            0
        }

        fn set_variable(&self, id: VariableId, value: i64) {
            self.writes.lock().unwrap().push((id.into_inner(), value));
        }
    }

    #[test]
    fn unbound_year_is_never_written() {
        let log = Arc::new(WriteLog::default());
        let bindings = VariableBindings {
            year: VariableId::UNBOUND,
            ..all_bound()
        };
        let publisher = VariablePublisher::new(log.clone(), bindings);

        assert_eq!(publisher.publish(&sunday_noon(), false), 6);
        let writes = log.writes.lock().unwrap();
        assert!(writes.iter().all(|&(id, _)| id != 0));
        assert!(!writes.contains(&(1, 2024)));
    }

    #[test]
    fn nothing_bound_writes_nothing() {
        let log = Arc::new(WriteLog::default());
        let publisher = VariablePublisher::new(log.clone(), VariableBindings::default());
        assert_eq!(publisher.publish(&sunday_noon(), false), 0);
        assert!(log.writes.lock().unwrap().is_empty());
    }
}
