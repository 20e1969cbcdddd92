//! Opaque ID newtypes shared by the multiplexer and its hosts.
//!
//! Each ID is a thin `u32` wrapper that is `Copy`, `Hash`, and `Serialize`/`Deserialize`.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
        pub struct $name(u32);

        impl $name {
            /// Creates an ID from a raw `u32` value.
            pub fn from_raw(raw: u32) -> Self {
                Self(raw)
            }

            /// Returns the raw `u32` value.
            pub fn as_raw(self) -> u32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

define_id!(
    /// Opaque ID of a schedulable task owned by the external scheduler.
    TaskId
);

define_id!(
    /// Slot ID keying one in-flight native callback registration.
    CallbackId
);

impl CallbackId {
    /// Returns the ID as a dense table index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn id_roundtrip() {
        let id = TaskId::from_raw(42);
        assert_eq!(id.as_raw(), 42);
        assert_eq!(CallbackId::from_raw(7).index(), 7);
    }

    #[test]
    fn id_hash_in_set() {
        let mut set = HashSet::new();
        set.insert(TaskId::from_raw(1));
        set.insert(TaskId::from_raw(2));
        set.insert(TaskId::from_raw(1));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn id_serde_roundtrip() {
        let id = CallbackId::from_raw(99);
        let json = serde_json::to_string(&id).unwrap();
        let restored: CallbackId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, restored);
    }

    #[test]
    fn display_is_raw_value() {
        assert_eq!(TaskId::from_raw(5).to_string(), "5");
    }
}
