//! Shared type definitions for the real-time system.
//!
//! This crate holds the plain value types that flow between the clock
//! sampler, the variable publisher, the tone interpolator and the
//! escape-code expander. None of them carry behaviour beyond simple
//! derivations; the logic lives in `realtime-core`.
//!
//! # Modules
//!
//! - [`ids`] -- Slot identifiers for host variables and switches
//! - [`enums`] -- Small enumerations (meridiem, tint mode)
//! - [`structs`] -- Host time, clock snapshots and tones

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{Meridiem, TintMode};
pub use ids::{SwitchId, VariableId};
pub use structs::{ClockSnapshot, HostTime, Tone, ToneKeyframe};
