//! Edge kinds a task can wait for and the value each one expects.
//!
//! A wait is keyed by [`EdgeKind`]; the native registration made for it
//! carries the matching [`EdgeValue`]. `Either` waits expect
//! [`EdgeValue::DontCare`], so any observed change fires them.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::logic::Logic;

/// The transition a waiting task is interested in.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Transition to logic high.
    Rising,
    /// Transition to logic low.
    Falling,
    /// Any value change.
    Either,
}

impl EdgeKind {
    /// All edge kinds, in registry order.
    pub const ALL: [EdgeKind; 3] = [EdgeKind::Rising, EdgeKind::Falling, EdgeKind::Either];

    /// Returns the value a registration of this kind waits for.
    pub fn expected_value(self) -> EdgeValue {
        match self {
            EdgeKind::Rising => EdgeValue::High,
            EdgeKind::Falling => EdgeValue::Low,
            EdgeKind::Either => EdgeValue::DontCare,
        }
    }

    /// Returns the dense index of this kind (`0..3`).
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeKind::Rising => write!(f, "posedge"),
            EdgeKind::Falling => write!(f, "negedge"),
            EdgeKind::Either => write!(f, "edge"),
        }
    }
}

/// The value a native registration compares observed changes against.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[repr(u8)]
pub enum EdgeValue {
    /// Fires when the signal becomes `0`.
    Low = 0,
    /// Fires when the signal becomes `1`.
    High = 1,
    /// Fires on every change.
    DontCare = 2,
}

impl EdgeValue {
    /// Returns `true` if an observed value satisfies this expectation.
    ///
    /// `X` and `Z` only satisfy `DontCare`.
    pub fn matches(self, observed: Logic) -> bool {
        match self {
            EdgeValue::DontCare => true,
            EdgeValue::High => observed == Logic::One,
            EdgeValue::Low => observed == Logic::Zero,
        }
    }
}
