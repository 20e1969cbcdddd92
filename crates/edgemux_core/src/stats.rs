//! Counters describing multiplexer activity.

use std::time::Duration;

use serde::Serialize;

/// A snapshot of multiplexer activity counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MuxStats {
    /// Wait requests recorded in the pending registry.
    pub waits_added: u64,
    /// Flush points processed.
    pub flushes: u64,
    /// Native registrations made, across all paths.
    pub registrations: u64,
    /// Registrations carrying more than one task.
    pub batched_registrations: u64,
    /// Native notifications received.
    pub notifications: u64,
    /// Notifications that matched and dispatched tasks.
    pub fired: u64,
    /// Notifications whose value did not match.
    pub ignored: u64,
    /// Notifications for registrations that no longer exist.
    pub stale: u64,
    /// Registrations torn down by cancel or shutdown.
    pub cancelled: u64,
    /// `schedule_many` calls made.
    pub dispatch_calls: u64,
    /// Tasks resumed.
    pub dispatched_tasks: u64,
    /// Time spent in the scheduler; zero unless profiling is enabled.
    pub dispatch_time: Duration,
}

impl MuxStats {
    /// Average number of tasks per native registration.
    pub fn tasks_per_registration(&self) -> f64 {
        if self.registrations == 0 {
            0.0
        } else {
            self.waits_added as f64 / self.registrations as f64
        }
    }
}
