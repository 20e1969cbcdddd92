//! Reference discrete-event simulator hosting the edge-callback multiplexer.
//!
//! [`RefSim`] implements [`edgemux_core::NativeSimulator`] over a small set of
//! single-bit 4-state signals. It shows the integration a real simulator
//! binding needs: flush pending waits at the start of every time step,
//! route each value-change notification back to the multiplexer, and remove
//! callbacks when asked.
//!
//! # Usage
//!
//! ```ignore
//! use edgemux_sim::{RefSim, SimTime};
//!
//! let mut sim = RefSim::new();
//! let clk = sim.add_signal("clk", Logic::Zero)?;
//! sim.schedule_clock(clk, SimTime::from_ns(5), 10)?;
//! mux.add_wait(clk, EdgeKind::Rising, task);
//! sim.run(&mut mux, &mut runtime)?;
//! ```
//!
//! # Modules
//!
//! - `error`: Simulation error types
//! - `time`: Femtosecond simulation time
//! - `kernel`: Signals, event queue, and native callbacks

#![warn(missing_docs)]

pub mod error;
pub mod kernel;
pub mod time;

pub use error::SimError;
pub use kernel::{NativeCallbackHandle, RefSim, SignalId, StepResult};
pub use time::SimTime;
