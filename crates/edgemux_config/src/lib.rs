//! Parsing and validation of `edgemux.toml` multiplexer configuration files.
//!
//! This crate reads the configuration file and produces a strongly-typed
//! [`MuxConfig`] controlling batch arities, the callback-ID pool, dispatch
//! profiling, and observed-value resolution.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use types::*;
