//! Simulation time with femtosecond resolution.
//!
//! The reference simulator has no delta cycles: all events scheduled for the
//! same [`SimTime`] form one time step and are applied in scheduling order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

const FS_PER_PS: u64 = 1_000;
/// Femtoseconds per nanosecond.
pub const FS_PER_NS: u64 = 1_000_000;
/// Femtoseconds per microsecond.
pub const FS_PER_US: u64 = 1_000_000_000;

/// A point in simulation time, in femtoseconds.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SimTime {
    /// Simulation time in femtoseconds.
    pub fs: u64,
}

impl SimTime {
    /// Time zero.
    pub const ZERO: SimTime = SimTime { fs: 0 };

    /// Creates a time from femtoseconds.
    pub fn from_fs(fs: u64) -> Self {
        Self { fs }
    }

    /// Creates a time from nanoseconds.
    pub fn from_ns(ns: u64) -> Self {
        Self { fs: ns * FS_PER_NS }
    }

    /// Converts to nanoseconds (truncated).
    pub fn to_ns(self) -> u64 {
        self.fs / FS_PER_NS
    }
}

impl Add for SimTime {
    type Output = SimTime;

    fn add(self, rhs: SimTime) -> SimTime {
        SimTime {
            fs: self.fs + rhs.fs,
        }
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fs = self.fs;
        if fs == 0 {
            write!(f, "0 fs")
        } else if fs % FS_PER_US == 0 {
            write!(f, "{} us", fs / FS_PER_US)
        } else if fs % FS_PER_NS == 0 {
            write!(f, "{} ns", fs / FS_PER_NS)
        } else if fs % FS_PER_PS == 0 {
            write!(f, "{} ps", fs / FS_PER_PS)
        } else {
            write!(f, "{fs} fs")
        }
    }
}
