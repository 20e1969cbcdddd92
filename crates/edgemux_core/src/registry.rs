//! Pending waits accumulated between flush points.
//!
//! One map per [`EdgeKind`] associates a signal with the tasks waiting for
//! that edge on it. The registry is drained wholesale at a flush point.
//! Drained lists keep their allocation: a signal that is waited on every
//! cycle costs no allocation after its first wait.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use edgemux_common::{EdgeKind, TaskId};

/// Initial capacity of a freshly created per-signal task list.
const TASK_LIST_CAPACITY: usize = 32;

/// Wait requests keyed by `(signal, edge kind)`.
#[derive(Debug, Clone)]
pub struct PendingWaits<S> {
    lists: [HashMap<S, Vec<TaskId>>; 3],
    len: usize,
}

impl<S> Default for PendingWaits<S> {
    fn default() -> Self {
        Self {
            lists: [HashMap::new(), HashMap::new(), HashMap::new()],
            len: 0,
        }
    }
}

impl<S: Copy + Eq + Hash + Debug> PendingWaits<S> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `task` waits for `kind` on `signal`.
    ///
    /// A task must not wait twice for the same `(signal, kind)` within one
    /// drain cycle; this is checked in debug builds only.
    pub fn add_wait(&mut self, signal: S, kind: EdgeKind, task: TaskId) {
        let list = self.lists[kind.index()]
            .entry(signal)
            .or_insert_with(|| Vec::with_capacity(TASK_LIST_CAPACITY));
        debug_assert!(
            !list.contains(&task),
            "task {task} already waits for {kind} on {signal:?}"
        );
        list.push(task);
        self.len += 1;
    }

    /// Returns the total number of pending waits.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no waits are pending.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the tasks currently waiting for `kind` on `signal`.
    pub fn waiting(&self, signal: S, kind: EdgeKind) -> &[TaskId] {
        self.lists[kind.index()]
            .get(&signal)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Hands every non-empty `(signal, kind)` list to `register`, emptying
    /// each list once it has been accepted.
    ///
    /// Lists are cleared in place, so their buffers and map slots are reused
    /// by the next cycle. If `register` fails, the failing list and every
    /// list not yet visited stay pending and the error is returned.
    pub fn drain_with<E>(
        &mut self,
        mut register: impl FnMut(S, EdgeKind, &[TaskId]) -> Result<(), E>,
    ) -> Result<(), E> {
        for (map, kind) in self.lists.iter_mut().zip(EdgeKind::ALL) {
            for (&signal, tasks) in map.iter_mut() {
                if tasks.is_empty() {
                    continue;
                }
                register(signal, kind, tasks)?;
                self.len -= tasks.len();
                tasks.clear();
            }
        }
        Ok(())
    }

    /// Drops every pending wait without registering it.
    pub fn clear(&mut self) {
        for map in &mut self.lists {
            map.values_mut().for_each(Vec::clear);
        }
        self.len = 0;
    }
}
