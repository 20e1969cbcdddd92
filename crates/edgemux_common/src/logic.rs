//! Values a single-bit signal can report when its callback fires.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The value a simulator reports for a single-bit signal.
///
/// Only `Zero` and `One` can satisfy an edge wait. `X` and `Z` never match
/// a rising or falling wait unless the context resolves them to `Zero`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Logic {
    /// Driven low.
    Zero,
    /// Driven high.
    One,
    /// Unknown.
    X,
    /// Undriven.
    Z,
}

impl Logic {
    /// Returns `true` for the driven values `Zero` and `One`.
    pub fn is_known(self) -> bool {
        matches!(self, Logic::Zero | Logic::One)
    }

    /// Maps `X` and `Z` to `Zero`, leaving driven values untouched.
    pub fn resolve_x_as_zero(self) -> Self {
        if self.is_known() {
            self
        } else {
            Logic::Zero
        }
    }
}

impl fmt::Display for Logic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Logic::Zero => write!(f, "0"),
            Logic::One => write!(f, "1"),
            Logic::X => write!(f, "X"),
            Logic::Z => write!(f, "Z"),
        }
    }
}
