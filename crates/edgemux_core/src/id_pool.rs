//! Reusable pool of callback slot IDs.
//!
//! IDs are dense (`0..capacity`) and handed out from a free stack, so the
//! most recently released ID is the next one allocated. An ID is in use from
//! [`IdPool::alloc`] until the matching [`IdPool::release`] and is never
//! handed out twice in between.

use edgemux_common::CallbackId;
use edgemux_config::PoolConfig;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::MuxError;

/// A fixed-capacity pool of [`CallbackId`]s.
#[derive(Debug, Clone)]
pub struct IdPool {
    /// Free IDs; the top of the stack is allocated next.
    free: Vec<CallbackId>,
    /// In-use flag per ID, indexed by [`CallbackId::index`].
    in_use: Vec<bool>,
}

impl IdPool {
    /// Creates a pool of `capacity` IDs allocated in ascending order.
    pub fn new(capacity: u32) -> Self {
        Self {
            free: (0..capacity).rev().map(CallbackId::from_raw).collect(),
            in_use: vec![false; capacity as usize],
        }
    }

    /// Creates a pool whose initial allocation order is randomized.
    ///
    /// A `seed` makes the order reproducible.
    pub fn shuffled(capacity: u32, seed: Option<u64>) -> Self {
        let mut pool = Self::new(capacity);
        match seed {
            Some(seed) => pool.free.shuffle(&mut StdRng::seed_from_u64(seed)),
            None => pool.free.shuffle(&mut rand::thread_rng()),
        }
        pool
    }

    /// Builds a pool from the `[pool]` configuration section.
    pub fn from_config(config: &PoolConfig) -> Self {
        if config.shuffle {
            Self::shuffled(config.capacity, config.seed)
        } else {
            Self::new(config.capacity)
        }
    }

    /// Takes an unused ID out of the pool.
    pub fn alloc(&mut self) -> Result<CallbackId, MuxError> {
        let id = self.free.pop().ok_or(MuxError::PoolExhausted {
            capacity: self.capacity(),
        })?;
        debug_assert!(!self.in_use[id.index()], "id {id} allocated twice");
        self.in_use[id.index()] = true;
        Ok(id)
    }

    /// Returns an ID to the pool.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range or not currently in use.
    pub fn release(&mut self, id: CallbackId) {
        let capacity = self.capacity();
        let Some(flag) = self.in_use.get_mut(id.index()) else {
            panic!("released callback id {id} is out of range (capacity {capacity})");
        };
        assert!(*flag, "callback id {id} released while not in use");
        *flag = false;
        self.free.push(id);
    }

    /// Returns `true` if `id` is currently allocated.
    pub fn is_in_use(&self, id: CallbackId) -> bool {
        self.in_use.get(id.index()).copied().unwrap_or(false)
    }

    /// Returns the total number of IDs managed by the pool.
    pub fn capacity(&self) -> u32 {
        self.in_use.len() as u32
    }

    /// Returns the number of IDs that can still be allocated.
    pub fn available(&self) -> usize {
        self.free.len()
    }

    /// Returns the number of IDs currently allocated.
    pub fn in_use_count(&self) -> usize {
        self.in_use.len() - self.free.len()
    }
}
