//! Enumeration types for the real-time system.

use serde::{Deserialize, Serialize};

/// Half of the day an hour falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Meridiem {
    /// Hours 0 through 11.
    Am,
    /// Hours 12 through 23.
    Pm,
}

impl Meridiem {
    /// Classify a 24-hour value. Anything below 12 is [`Meridiem::Am`].
    pub const fn from_hour(hour: i64) -> Self {
        if hour < 12 { Self::Am } else { Self::Pm }
    }
}

/// Which of the two tone modes a frame resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TintMode {
    /// The tone follows the hourly keyframes.
    Active,
    /// The tone is forced to neutral (anti-tint switch on, or the map is
    /// not marked for tinting).
    Neutral,
}
