//! Configuration types deserialized from `edgemux.toml`.

use serde::Deserialize;

/// Smallest batch arity the configuration accepts.
pub const MIN_SUPPORTED_ARITY: usize = 2;

/// Largest batch arity the configuration accepts.
///
/// Matches the inline task capacity of a callback registration.
pub const MAX_SUPPORTED_ARITY: usize = 16;

/// The top-level multiplexer configuration parsed from `edgemux.toml`.
///
/// Every section is optional; a missing section takes its defaults.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MuxConfig {
    /// Batch arity bounds used when draining pending waits.
    #[serde(default)]
    pub batching: BatchingConfig,
    /// Callback-ID pool sizing and ordering.
    #[serde(default)]
    pub pool: PoolConfig,
    /// Dispatch profiling.
    #[serde(default)]
    pub profiling: ProfilingConfig,
    /// Interpretation of observed signal values.
    #[serde(default)]
    pub values: ValueConfig,
}

/// Arity bounds for batched registrations.
///
/// A pending list of at least `min_arity` waiters is packed into batches of
/// up to `max_arity` tasks; shorter remainders use the single-task path.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BatchingConfig {
    /// Smallest batch that goes through the batched path.
    #[serde(default = "default_min_arity")]
    pub min_arity: usize,
    /// Largest number of tasks carried by one registration.
    #[serde(default = "default_max_arity")]
    pub max_arity: usize,
}

impl Default for BatchingConfig {
    fn default() -> Self {
        Self {
            min_arity: default_min_arity(),
            max_arity: default_max_arity(),
        }
    }
}

fn default_min_arity() -> usize {
    2
}

fn default_max_arity() -> usize {
    8
}

/// Callback-ID pool configuration.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PoolConfig {
    /// Number of IDs available for concurrently active registrations.
    #[serde(default = "default_capacity")]
    pub capacity: u32,
    /// Randomize the initial ID order.
    #[serde(default)]
    pub shuffle: bool,
    /// Seed for the shuffle; an unseeded shuffle uses thread-local entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            shuffle: false,
            seed: None,
        }
    }
}

fn default_capacity() -> u32 {
    10_000
}

/// Dispatch profiling configuration.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ProfilingConfig {
    /// Accumulate wall-clock time spent inside the scheduler entry point.
    #[serde(default)]
    pub enabled: bool,
}

/// Observed-value interpretation.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ValueConfig {
    /// Treat `X` and `Z` observations as logic `0` when matching edges.
    #[serde(default)]
    pub resolve_x_as_zero: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = MuxConfig::default();
        assert_eq!(config.batching.min_arity, 2);
        assert_eq!(config.batching.max_arity, 8);
        assert_eq!(config.pool.capacity, 10_000);
        assert!(!config.pool.shuffle);
        assert!(config.pool.seed.is_none());
        assert!(!config.profiling.enabled);
        assert!(!config.values.resolve_x_as_zero);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config: MuxConfig = toml::from_str("[batching]\nmax_arity = 4\n").unwrap();
        assert_eq!(config.batching.min_arity, 2);
        assert_eq!(config.batching.max_arity, 4);
        assert_eq!(config.pool, PoolConfig::default());
    }

    #[test]
    fn unknown_fields_rejected() {
        let result: Result<MuxConfig, _> = toml::from_str("[pool]\nsize = 3\n");
        assert!(result.is_err());
    }
}
