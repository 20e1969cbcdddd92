//! Shared foundational types for the edge-callback multiplexer.
//!
//! This crate provides 4-state logic values as observed on simulator signals,
//! the edge kinds a task can wait for, the value each kind expects, and the
//! opaque ID newtypes used to key tasks and native callback slots.

#![warn(missing_docs)]

pub mod edge;
pub mod ids;
pub mod logic;

pub use edge::{EdgeKind, EdgeValue};
pub use ids::{CallbackId, TaskId};
pub use logic::Logic;
