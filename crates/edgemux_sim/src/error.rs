//! Error types for the reference simulator.

use edgemux_core::MuxError;

/// Errors that can occur while building or running a simulation.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    /// A signal with this name already exists.
    #[error("signal '{0}' is already defined")]
    DuplicateSignal(String),

    /// No signal with this name exists.
    #[error("unknown signal '{0}'")]
    UnknownSignal(String),

    /// An event was scheduled before the current time.
    #[error("cannot schedule an event at {at_fs} fs, simulation is already at {now_fs} fs")]
    EventInPast {
        /// Requested event time in femtoseconds.
        at_fs: u64,
        /// Current simulation time in femtoseconds.
        now_fs: u64,
    },

    /// The edge multiplexer reported a fatal error.
    #[error(transparent)]
    Mux(#[from] MuxError),
}
