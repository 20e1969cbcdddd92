//! Error types for `edgemux.toml` loading.

use std::path::PathBuf;

/// Why a multiplexer configuration was rejected.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// The file that was being read.
        path: PathBuf,
        /// The underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The content is not valid TOML or does not match the expected tables.
    #[error("malformed multiplexer configuration: {0}")]
    Malformed(String),

    /// A key parsed but its value is outside the range the multiplexer supports.
    #[error("`{key}` out of range: {reason}")]
    OutOfRange {
        /// Dotted key, e.g. `batching.max_arity`.
        key: &'static str,
        /// What the accepted range is and what was found.
        reason: String,
    },
}
