//! Edge-callback multiplexer for simulation task scheduling.
//!
//! Many independent tasks of a scripting runtime each wait for a signal to
//! reach a logic transition. This crate collects those waits, partitions
//! them into batches, and registers one native value-change callback per
//! batch instead of one per task. When a callback fires with a matching
//! value, the whole batch is resumed through the scheduler in a single
//! hand-off and the native registration is torn down.
//!
//! # Architecture
//!
//! All mutable state lives in an explicit [`EdgeMux`] context. The native
//! simulator ([`NativeSimulator`]) and the scripting runtime
//! ([`TaskScheduler`]) are passed into each operation, so several contexts
//! can coexist in one process.
//!
//! # Usage
//!
//! ```ignore
//! use edgemux_core::{EdgeMux, ValueChange};
//! use edgemux_common::{EdgeKind, TaskId};
//!
//! let mut mux = EdgeMux::new(&config);
//! mux.add_wait(clk, EdgeKind::Rising, TaskId::from_raw(1));
//! mux.flush(&mut sim)?;
//! // later, from the native callback trampoline:
//! mux.on_value_change(&mut sim, &mut runtime, ValueChange::new(user_data, value));
//! ```
//!
//! # Modules
//!
//! - `error`: Multiplexer and script error types
//! - `id_pool`: Reusable callback-ID allocator
//! - `registry`: Pending waits grouped by signal and edge kind
//! - `batching`: Partitioning of pending waits into batches
//! - `registration`: Registration blocks and their generation-checked arena
//! - `native`: Boundary to the simulator's callback API
//! - `bridge`: Fail-fast hand-off to the task scheduler
//! - `stats`: Activity counters
//! - `mux`: The multiplexer context

#![warn(missing_docs)]

pub mod batching;
pub mod bridge;
pub mod error;
pub mod id_pool;
pub mod mux;
pub mod native;
pub mod registration;
pub mod registry;
pub mod stats;

pub use batching::BatchPolicy;
pub use bridge::{SchedulerBridge, TaskScheduler};
pub use error::{MuxError, ScriptError};
pub use id_pool::IdPool;
pub use mux::{EdgeMux, FireOutcome, FlushSummary};
pub use native::{NativeSimulator, ValueChange};
pub use registration::{
    CallbackRegistration, RegistrationKey, RegistrationMode, RegistrationState, BATCH_CAPACITY,
};
pub use registry::PendingWaits;
pub use stats::MuxStats;
