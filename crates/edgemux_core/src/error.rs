//! Error types for the edge-callback multiplexer.
//!
//! Every [`MuxError`] is fatal: once one is returned the context is poisoned
//! and the simulation's event model can no longer be trusted. Invariant violations (double release,
//! double removal, malformed batches) are not errors at all; they panic.

/// A failure reported by the scripting runtime while resuming tasks.
///
/// Carries the runtime's human-readable message and its traceback verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ScriptError {
    /// The error message raised by the script.
    pub message: String,
    /// The structured traceback, already rendered to text.
    pub traceback: String,
}

impl ScriptError {
    /// Creates a script error from a message and a traceback.
    pub fn new(message: impl Into<String>, traceback: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            traceback: traceback.into(),
        }
    }
}

/// Fatal errors surfaced by the multiplexer.
#[derive(Debug, thiserror::Error)]
pub enum MuxError {
    /// The scheduler entry point failed while resuming woken tasks.
    ///
    /// The environment has already been finalized when this is returned.
    #[error("task dispatch failed: {message}\n{traceback}")]
    DispatchFailed {
        /// The script's error message.
        message: String,
        /// The script's traceback.
        traceback: String,
    },

    /// The context was torn down by an earlier fatal error.
    #[error("edge multiplexer is torn down after a fatal error")]
    Poisoned,

    /// Every callback ID is held by an active registration.
    #[error("callback id pool exhausted (capacity {capacity})")]
    PoolExhausted {
        /// The configured pool capacity.
        capacity: u32,
    },
}

impl From<ScriptError> for MuxError {
    fn from(err: ScriptError) -> Self {
        MuxError::DispatchFailed {
            message: err.message,
            traceback: err.traceback,
        }
    }
}
