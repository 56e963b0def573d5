//! Type-safe slot identifiers for host-owned storage.
//!
//! The host keeps numbered variables and switches. Slot `0` is a sentinel
//! that means "not bound": the feature behind it is disabled, and the core
//! never passes it to the host store.

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around a `u32` slot number with standard derives.
macro_rules! define_slot_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            /// The unbound sentinel (slot `0`).
            pub const UNBOUND: Self = Self(0);

            /// Wrap a raw slot number.
            pub const fn new(raw: u32) -> Self {
                Self(raw)
            }

            /// Whether this slot refers to real host storage.
            pub const fn is_bound(self) -> bool {
                self.0 != 0
            }

            /// Return the raw slot number.
            pub const fn into_inner(self) -> u32 {
                self.0
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u32> for $name {
            fn from(raw: u32) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for u32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_slot_id! {
    /// Identifier of a numeric host variable.
    VariableId
}

define_slot_id! {
    /// Identifier of a boolean host switch.
    SwitchId
}
