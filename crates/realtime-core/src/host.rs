//! Host store traits and in-memory implementations.
//!
//! The host owns numbered variables, numbered switches and the metadata of
//! the currently loaded map. The core only ever reads and writes through
//! the narrow traits below, and never passes slot `0` to a store: the
//! [`read_variable`], [`write_variable`] and [`read_switch`] helpers
//! short-circuit unbound slots before the store is touched.
//!
//! The `Memory*` types are complete stores for hosts that have none of
//! their own, and for tests.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use realtime_types::{SwitchId, VariableId};

use crate::tone::has_tint_notetag;

/// Numeric variable storage owned by the host.
pub trait VariableStore: Send + Sync {
    /// Read a variable. Slots that were never written read as `0`.
    fn get_variable(&self, id: VariableId) -> i64;

    /// Overwrite a variable.
    fn set_variable(&self, id: VariableId, value: i64);
}

/// Boolean switch storage owned by the host.
pub trait SwitchStore: Send + Sync {
    /// Read a switch. Slots that were never written read as `false`.
    fn get_switch(&self, id: SwitchId) -> bool;
}

/// Metadata about the map the host currently has loaded.
pub trait MapMetadata: Send + Sync {
    /// Whether the current map carries the tint marker.
    ///
    /// Must return `false` when no map is loaded.
    fn current_map_has_tint_marker(&self) -> bool;
}

/// Read a bound variable, or `0` for an unbound slot.
pub fn read_variable(store: &dyn VariableStore, id: VariableId) -> i64 {
    if id.is_bound() { store.get_variable(id) } else { 0 }
}

/// Write a bound variable. Returns `false` (and skips the store) for an
/// unbound slot.
pub fn write_variable(store: &dyn VariableStore, id: VariableId, value: i64) -> bool {
    if !id.is_bound() {
        return false;
    }
    store.set_variable(id, value);
    true
}

/// Read a bound switch, or `false` for an unbound slot.
pub fn read_switch(store: &dyn SwitchStore, id: SwitchId) -> bool {
    id.is_bound() && store.get_switch(id)
}

// ---------------------------------------------------------------------------
// In-memory stores
// ---------------------------------------------------------------------------

/// Variable store backed by an in-process map.
#[derive(Debug, Default)]
pub struct MemoryVariables {
    values: RwLock<BTreeMap<VariableId, i64>>,
}

impl MemoryVariables {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every slot that has been written.
    pub fn snapshot(&self) -> BTreeMap<VariableId, i64> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl VariableStore for MemoryVariables {
    fn get_variable(&self, id: VariableId) -> i64 {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .copied()
            .unwrap_or(0)
    }

    fn set_variable(&self, id: VariableId, value: i64) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, value);
    }
}

/// Switch store backed by an in-process map.
#[derive(Debug, Default)]
pub struct MemorySwitches {
    values: RwLock<BTreeMap<SwitchId, bool>>,
}

impl MemorySwitches {
    /// Create a store with every switch off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Turn a switch on or off.
    pub fn set_switch(&self, id: SwitchId, on: bool) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, on);
    }
}

impl SwitchStore for MemorySwitches {
    fn get_switch(&self, id: SwitchId) -> bool {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .copied()
            .unwrap_or(false)
    }
}

/// Map metadata backed by the note text of the current map.
///
/// A map is tinted when its note contains the `<Real Time Tint>` tag
/// (case-insensitive). With no map loaded, tinting is off.
#[derive(Debug, Default)]
pub struct MemoryMap {
    note: RwLock<Option<String>>,
}

impl MemoryMap {
    /// Create a provider with no map loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider with a map already loaded.
    pub fn with_note(note: impl Into<String>) -> Self {
        Self {
            note: RwLock::new(Some(note.into())),
        }
    }

    /// Replace the current map (a scene transition).
    pub fn load_map(&self, note: impl Into<String>) {
        *self.note.write().unwrap_or_else(PoisonError::into_inner) = Some(note.into());
    }

    /// Drop the current map (title screen, battle scene, ...).
    pub fn unload_map(&self) {
        *self.note.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl MapMetadata for MemoryMap {
    fn current_map_has_tint_marker(&self) -> bool {
        self.note
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_deref()
            .is_some_and(has_tint_notetag)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Records every call so tests can prove slot 0 never reaches the store.
    #[derive(Default)]
    struct CallLog {
        calls: Mutex<Vec<u32>>,
    }

    impl VariableStore for CallLog {
        fn get_variable(&self, id: VariableId) -> i64 {
            self.calls.lock().unwrap().push(id.into_inner());
            7
        }

        fn set_variable(&self, id: VariableId, _value: i64) {
            self.calls.lock().unwrap().push(id.into_inner());
        }
    }

    impl SwitchStore for CallLog {
        fn get_switch(&self, id: SwitchId) -> bool {
            self.calls.lock().unwrap().push(id.into_inner());
            true
        }
    }

    #[test]
    fn unbound_slots_never_reach_the_store() {
        let log = CallLog::default();
        assert_eq!(read_variable(&log, VariableId::UNBOUND), 0);
        assert!(!write_variable(&log, VariableId::UNBOUND, 3));
        assert!(!read_switch(&log, SwitchId::UNBOUND));
        assert!(log.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn bound_slots_pass_through() {
        let log = CallLog::default();
        assert_eq!(read_variable(&log, VariableId(4)), 7);
        assert!(write_variable(&log, VariableId(4), 3));
        assert!(read_switch(&log, SwitchId(2)));
        assert_eq!(*log.calls.lock().unwrap(), vec![4, 4, 2]);
    }

    #[test]
    fn memory_variables_default_to_zero() {
        let store = MemoryVariables::new();
        assert_eq!(store.get_variable(VariableId(9)), 0);
        store.set_variable(VariableId(9), -12);
        assert_eq!(store.get_variable(VariableId(9)), -12);
        assert_eq!(store.snapshot().len(), 1);
    }

    #[test]
    fn memory_switches_toggle() {
        let store = MemorySwitches::new();
        assert!(!store.get_switch(SwitchId(1)));
        store.set_switch(SwitchId(1), true);
        assert!(store.get_switch(SwitchId(1)));
    }

    #[test]
    fn memory_map_follows_scene_transitions() {
        let map = MemoryMap::new();
        assert!(!map.current_map_has_tint_marker());

        map.load_map("Town square\n<real time tint>");
        assert!(map.current_map_has_tint_marker());

        map.load_map("Dungeon");
        assert!(!map.current_map_has_tint_marker());

        map.load_map("<Real Time Tint>");
        map.unload_map();
        assert!(!map.current_map_has_tint_marker());
    }
}
