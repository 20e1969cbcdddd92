//! Greedy partitioning of pending task lists into registration batches.
//!
//! A list of `S` waiters is consumed front to back: while at least
//! `min_arity` tasks remain, the next batch takes `min(S, max_arity)` of them;
//! a shorter remainder is registered one task at a time through the
//! single-task path. Since arities are contiguous, this is the same as trying
//! every arity from `max_arity` down to `min_arity` and falling back to one.

use edgemux_common::TaskId;
use edgemux_config::BatchingConfig;

use crate::registration::BATCH_CAPACITY;

/// Arity bounds for packing waiters into registrations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BatchPolicy {
    min_arity: usize,
    max_arity: usize,
}

impl BatchPolicy {
    /// Creates a policy with the given arity bounds.
    ///
    /// # Panics
    ///
    /// Panics unless `2 <= min_arity <= max_arity <= BATCH_CAPACITY`.
    pub fn new(min_arity: usize, max_arity: usize) -> Self {
        assert!(
            min_arity >= 2 && min_arity <= max_arity && max_arity <= BATCH_CAPACITY,
            "invalid arity bounds {min_arity}..={max_arity} (capacity {BATCH_CAPACITY})"
        );
        Self {
            min_arity,
            max_arity,
        }
    }

    /// Builds a policy from the `[batching]` configuration section.
    pub fn from_config(config: &BatchingConfig) -> Self {
        Self::new(config.min_arity, config.max_arity)
    }

    /// Smallest batch registered through the batched path.
    pub fn min_arity(&self) -> usize {
        self.min_arity
    }

    /// Largest batch a single registration carries.
    pub fn max_arity(&self) -> usize {
        self.max_arity
    }

    /// Returns the size of the next batch for `remaining` waiters.
    pub fn next_batch_len(&self, remaining: usize) -> usize {
        if remaining >= self.min_arity {
            remaining.min(self.max_arity)
        } else {
            remaining.min(1)
        }
    }

    /// Splits `tasks` into consecutive batches following the greedy rule.
    pub fn split<'a>(&self, tasks: &'a [TaskId]) -> Batches<'a> {
        Batches {
            policy: *self,
            rest: tasks,
        }
    }

    /// Returns the batch sizes the policy produces for `len` waiters.
    pub fn batch_sizes(&self, len: usize) -> Vec<usize> {
        let mut sizes = Vec::new();
        let mut remaining = len;
        while remaining > 0 {
            let n = self.next_batch_len(remaining);
            sizes.push(n);
            remaining -= n;
        }
        sizes
    }
}

impl Default for BatchPolicy {
    fn default() -> Self {
        Self::from_config(&BatchingConfig::default())
    }
}

/// Iterator over the batches of a task list, see [`BatchPolicy::split`].
#[derive(Debug, Clone)]
pub struct Batches<'a> {
    policy: BatchPolicy,
    rest: &'a [TaskId],
}

impl<'a> Iterator for Batches<'a> {
    type Item = &'a [TaskId];

    fn next(&mut self) -> Option<Self::Item> {
        let n = self.policy.next_batch_len(self.rest.len());
        if n == 0 {
            return None;
        }
        let (batch, rest) = self.rest.split_at(n);
        self.rest = rest;
        Some(batch)
    }
}
