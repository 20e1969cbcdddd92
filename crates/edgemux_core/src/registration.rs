//! Callback registrations and the arena that pools their storage.
//!
//! A [`CallbackRegistration`] is the unit of native subscription: one slot
//! ID, one signal, one expected value, and up to [`BATCH_CAPACITY`] task IDs
//! stored inline. Registrations live in a [`RegistrationArena`] whose slots
//! are recycled through a free list, so steady-state registration and firing
//! never touch the heap. The native layer only ever sees the
//! [`RegistrationKey`] of a registration, never a pointer to it.

use std::fmt;

use edgemux_common::{CallbackId, EdgeKind, EdgeValue, Logic, TaskId};
use smallvec::SmallVec;

/// Inline task capacity of a single registration.
pub const BATCH_CAPACITY: usize = edgemux_config::MAX_SUPPORTED_ARITY;

/// The task IDs carried by one registration, stored without heap allocation.
pub type TaskBatch = SmallVec<[TaskId; BATCH_CAPACITY]>;

/// How a registration behaves after a matching notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistrationMode {
    /// Removed together with its first match.
    OneShot,
    /// Dispatches on every match until cancelled.
    Persistent,
}

/// Lifecycle state of a registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistrationState {
    /// Subscribed and waiting for a matching value.
    Active,
    /// Native subscription removed and slot ID released.
    FiredAndRemoved,
}

/// One native value-change subscription carrying a batch of waiting tasks.
#[derive(Debug, Clone)]
pub struct CallbackRegistration<S> {
    id: CallbackId,
    signal: S,
    kind: EdgeKind,
    tasks: TaskBatch,
    mode: RegistrationMode,
    state: RegistrationState,
}

impl<S: Copy> CallbackRegistration<S> {
    /// Creates an active registration for `tasks`.
    ///
    /// # Panics
    ///
    /// Panics if `tasks` is empty or longer than [`BATCH_CAPACITY`].
    pub fn new(
        id: CallbackId,
        signal: S,
        kind: EdgeKind,
        tasks: &[TaskId],
        mode: RegistrationMode,
    ) -> Self {
        assert!(
            (1..=BATCH_CAPACITY).contains(&tasks.len()),
            "malformed batch of {} tasks (capacity {BATCH_CAPACITY})",
            tasks.len()
        );
        Self {
            id,
            signal,
            kind,
            tasks: SmallVec::from_slice(tasks),
            mode,
            state: RegistrationState::Active,
        }
    }

    /// The slot ID keying this registration's native handle.
    pub fn id(&self) -> CallbackId {
        self.id
    }

    /// The signal this registration is subscribed to.
    pub fn signal(&self) -> S {
        self.signal
    }

    /// The edge kind the batch waits for.
    pub fn kind(&self) -> EdgeKind {
        self.kind
    }

    /// The value observed changes are compared against.
    pub fn expected(&self) -> EdgeValue {
        self.kind.expected_value()
    }

    /// The waiting tasks, in batch order.
    pub fn tasks(&self) -> &[TaskId] {
        &self.tasks
    }

    /// The batch of waiting tasks.
    pub fn task_batch(&self) -> &TaskBatch {
        &self.tasks
    }

    /// One-shot or persistent.
    pub fn mode(&self) -> RegistrationMode {
        self.mode
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RegistrationState {
        self.state
    }

    /// Returns `true` while the registration awaits a match.
    pub fn is_active(&self) -> bool {
        self.state == RegistrationState::Active
    }

    /// Returns `true` if `observed` fires this registration.
    pub fn matches(&self, observed: Logic) -> bool {
        self.expected().matches(observed)
    }

    /// Performs the terminal `Active → FiredAndRemoved` transition.
    ///
    /// Returns `false` if the transition already happened.
    pub fn mark_removed(&mut self) -> bool {
        let was_active = self.is_active();
        self.state = RegistrationState::FiredAndRemoved;
        was_active
    }
}

/// Generation-checked handle to a registration in a [`RegistrationArena`].
///
/// This is the user data handed to the native layer. A key outlives its
/// registration harmlessly: once the slot is recycled the generation no
/// longer matches and lookups return `None`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct RegistrationKey {
    index: u32,
    generation: u32,
}

impl RegistrationKey {
    /// Creates a key from its raw parts.
    pub fn from_raw(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// The arena slot index.
    pub fn index(self) -> u32 {
        self.index
    }

    /// The slot generation this key was issued for.
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for RegistrationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.index, self.generation)
    }
}

#[derive(Debug, Clone)]
struct Slot<S> {
    generation: u32,
    entry: Option<CallbackRegistration<S>>,
}

/// Pooled storage for registrations with slot recycling.
#[derive(Debug, Clone)]
pub struct RegistrationArena<S> {
    slots: Vec<Slot<S>>,
    free: Vec<u32>,
    live: usize,
}

impl<S> Default for RegistrationArena<S> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }
}

impl<S: Copy> RegistrationArena<S> {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty arena with room for `capacity` registrations.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free: Vec::with_capacity(capacity),
            live: 0,
        }
    }

    /// Stores a registration, reusing a free slot when one exists.
    pub fn insert(&mut self, registration: CallbackRegistration<S>) -> RegistrationKey {
        self.live += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            debug_assert!(slot.entry.is_none(), "free slot {index} is occupied");
            slot.entry = Some(registration);
            return RegistrationKey::from_raw(index, slot.generation);
        }
        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 0,
            entry: Some(registration),
        });
        RegistrationKey::from_raw(index, 0)
    }

    /// Looks up a live registration.
    pub fn get(&self, key: RegistrationKey) -> Option<&CallbackRegistration<S>> {
        self.slots
            .get(key.index as usize)
            .filter(|slot| slot.generation == key.generation)
            .and_then(|slot| slot.entry.as_ref())
    }

    /// Removes a live registration and recycles its slot.
    ///
    /// Returns `None` for a key whose registration is already gone.
    pub fn remove(&mut self, key: RegistrationKey) -> Option<CallbackRegistration<S>> {
        let slot = self.slots.get_mut(key.index as usize)?;
        if slot.generation != key.generation {
            return None;
        }
        let registration = slot.entry.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(key.index);
        self.live -= 1;
        Some(registration)
    }

    /// Returns `true` if `key` refers to a live registration.
    pub fn contains(&self, key: RegistrationKey) -> bool {
        self.get(key).is_some()
    }

    /// Number of live registrations.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Returns `true` if no registration is live.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Iterates over the keys of live registrations.
    pub fn keys(&self) -> impl Iterator<Item = RegistrationKey> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.entry
                .as_ref()
                .map(|_| RegistrationKey::from_raw(i as u32, slot.generation))
        })
    }
}
