//! The multiplexer context tying registry, batching, pool, and bridge together.
//!
//! [`EdgeMux`] owns every piece of mutable state the multiplexer needs. The
//! native simulator and the task scheduler are passed into each operation
//! rather than reached through globals, so independent contexts can coexist
//! in one process.

use edgemux_common::{CallbackId, EdgeKind, TaskId};
use edgemux_config::MuxConfig;

use crate::batching::BatchPolicy;
use crate::bridge::{SchedulerBridge, TaskScheduler};
use crate::error::MuxError;
use crate::id_pool::IdPool;
use crate::native::{NativeSimulator, ValueChange};
use crate::registration::{
    CallbackRegistration, RegistrationArena, RegistrationKey, RegistrationMode, TaskBatch,
};
use crate::registry::PendingWaits;
use crate::stats::MuxStats;

/// What a value-change notification did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FireOutcome {
    /// The value matched and the batch was dispatched.
    Fired {
        /// Number of tasks resumed.
        tasks: usize,
    },
    /// The value did not match; the registration stays active.
    Ignored,
    /// The registration was already removed; nothing happened.
    Stale,
}

/// Result of one flush point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FlushSummary {
    /// Pending waits drained from the registry.
    pub waits: usize,
    /// Native registrations made for them.
    pub registrations: usize,
    /// Registrations that went through the single-task path.
    pub single_task: usize,
}

/// An edge-callback multiplexer bound to one native simulator type.
pub struct EdgeMux<N: NativeSimulator> {
    policy: BatchPolicy,
    resolve_x_as_zero: bool,
    pending: PendingWaits<N::Signal>,
    pool: IdPool,
    /// Side table from callback ID to native handle, indexed by ID.
    native_handles: Vec<Option<N::CallbackHandle>>,
    registrations: RegistrationArena<N::Signal>,
    bridge: SchedulerBridge,
    stats: MuxStats,
    poisoned: bool,
}

impl<N: NativeSimulator> EdgeMux<N> {
    /// Creates a context from a validated configuration.
    pub fn new(config: &MuxConfig) -> Self {
        let pool = IdPool::from_config(&config.pool);
        let capacity = pool.capacity() as usize;
        Self {
            policy: BatchPolicy::from_config(&config.batching),
            resolve_x_as_zero: config.values.resolve_x_as_zero,
            pending: PendingWaits::new(),
            pool,
            native_handles: vec![None; capacity],
            registrations: RegistrationArena::new(),
            bridge: SchedulerBridge::new(config.profiling.enabled),
            stats: MuxStats::default(),
            poisoned: false,
        }
    }

    /// Creates a context with the default configuration.
    pub fn with_defaults() -> Self {
        Self::new(&MuxConfig::default())
    }

    /// The batching policy in effect.
    pub fn policy(&self) -> BatchPolicy {
        self.policy
    }

    /// Records that `task` waits for `kind` on `signal`.
    ///
    /// Nothing is registered natively until the next [`flush`](Self::flush).
    pub fn add_wait(&mut self, signal: N::Signal, kind: EdgeKind, task: TaskId) {
        self.pending.add_wait(signal, kind, task);
        self.stats.waits_added += 1;
    }

    /// Number of waits recorded since the last flush.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Drains pending waits into batched native registrations.
    ///
    /// A failed registration poisons the context. Waits of the list being
    /// registered when the failure hit, and of every list not yet visited,
    /// stay pending so [`shutdown`](Self::shutdown) can account for them.
    pub fn flush(&mut self, native: &mut N) -> Result<FlushSummary, MuxError> {
        self.ensure_live()?;
        if self.pending.is_empty() {
            return Ok(FlushSummary::default());
        }

        let mut summary = FlushSummary::default();
        let policy = self.policy;
        let Self {
            pending,
            pool,
            registrations,
            native_handles,
            stats,
            ..
        } = self;
        let drained = pending.drain_with(|signal, kind, tasks| -> Result<(), MuxError> {
            for batch in policy.split(tasks) {
                Self::register(
                    pool,
                    registrations,
                    native_handles,
                    stats,
                    native,
                    signal,
                    kind,
                    batch,
                    RegistrationMode::OneShot,
                )?;
                summary.registrations += 1;
                if batch.len() == 1 {
                    summary.single_task += 1;
                }
            }
            summary.waits += tasks.len();
            Ok(())
        });
        if let Err(err) = drained {
            return Err(self.poison(err));
        }

        self.stats.flushes += 1;
        log::debug!(
            "flush: {} wait(s) -> {} registration(s) ({} single-task)",
            summary.waits,
            summary.registrations,
            summary.single_task
        );
        Ok(summary)
    }

    /// Registers a one-shot wait for a single task immediately, bypassing
    /// the pending registry.
    pub fn wait_now(
        &mut self,
        native: &mut N,
        signal: N::Signal,
        kind: EdgeKind,
        task: TaskId,
    ) -> Result<RegistrationKey, MuxError> {
        self.register_single(native, signal, kind, task, RegistrationMode::OneShot)
    }

    /// Registers a persistent wait that resumes `task` on every matching
    /// change until it is cancelled.
    pub fn watch(
        &mut self,
        native: &mut N,
        signal: N::Signal,
        kind: EdgeKind,
        task: TaskId,
    ) -> Result<RegistrationKey, MuxError> {
        self.register_single(native, signal, kind, task, RegistrationMode::Persistent)
    }

    fn register_single(
        &mut self,
        native: &mut N,
        signal: N::Signal,
        kind: EdgeKind,
        task: TaskId,
        mode: RegistrationMode,
    ) -> Result<RegistrationKey, MuxError> {
        self.ensure_live()?;
        self.stats.waits_added += 1;
        Self::register(
            &mut self.pool,
            &mut self.registrations,
            &mut self.native_handles,
            &mut self.stats,
            native,
            signal,
            kind,
            &[task],
            mode,
        )
        .map_err(|err| self.poison(err))
    }

    // Takes the fields it touches separately so `flush` can register from
    // inside the registry's drain.
    #[allow(clippy::too_many_arguments)]
    fn register(
        pool: &mut IdPool,
        registrations: &mut RegistrationArena<N::Signal>,
        native_handles: &mut [Option<N::CallbackHandle>],
        stats: &mut MuxStats,
        native: &mut N,
        signal: N::Signal,
        kind: EdgeKind,
        tasks: &[TaskId],
        mode: RegistrationMode,
    ) -> Result<RegistrationKey, MuxError> {
        let id = pool.alloc()?;
        let registration = CallbackRegistration::new(id, signal, kind, tasks, mode);
        let expected = registration.expected();
        let key = registrations.insert(registration);
        let handle = native.register_value_change_callback(signal, expected, key);

        let slot = &mut native_handles[id.index()];
        assert!(
            slot.is_none(),
            "callback id {id} is already mapped to native handle {slot:?}"
        );
        *slot = Some(handle);

        stats.registrations += 1;
        if tasks.len() > 1 {
            stats.batched_registrations += 1;
        }
        log::trace!(
            "registered {key} (id {id}) on {signal:?} for {kind} with {} task(s)",
            tasks.len()
        );
        Ok(key)
    }

    /// Handles a native value-change notification.
    ///
    /// On a match the batch is resumed through `scheduler`; a one-shot
    /// registration is removed, its ID released, and its slot recycled
    /// before the hand-off.
    pub fn try_on_value_change<T: TaskScheduler + ?Sized>(
        &mut self,
        native: &mut N,
        scheduler: &mut T,
        change: ValueChange,
    ) -> Result<FireOutcome, MuxError> {
        self.ensure_live()?;
        self.stats.notifications += 1;

        let key = change.user_data;
        let observed = if self.resolve_x_as_zero {
            change.value.resolve_x_as_zero()
        } else {
            change.value
        };

        let (mode, batch): (RegistrationMode, TaskBatch) = match self.registrations.get(key) {
            Some(reg) if reg.matches(observed) => (reg.mode(), reg.task_batch().clone()),
            Some(_) => {
                self.stats.ignored += 1;
                return Ok(FireOutcome::Ignored);
            }
            None => {
                self.stats.stale += 1;
                log::trace!("stale notification for {key} ignored");
                return Ok(FireOutcome::Stale);
            }
        };

        if mode == RegistrationMode::OneShot {
            self.teardown(native, key);
        }
        self.stats.fired += 1;
        log::trace!("{key} fired on {observed}, resuming {} task(s)", batch.len());

        self.bridge.dispatch(scheduler, &batch)?;
        Ok(FireOutcome::Fired { tasks: batch.len() })
    }

    /// Handles a native value-change notification, aborting on fatal errors.
    ///
    /// This is the entry point a native callback trampoline calls: a script
    /// failure has already finalized the environment, so the only thing left
    /// is to stop with the described error.
    pub fn on_value_change<T: TaskScheduler + ?Sized>(
        &mut self,
        native: &mut N,
        scheduler: &mut T,
        change: ValueChange,
    ) -> FireOutcome {
        match self.try_on_value_change(native, scheduler, change) {
            Ok(outcome) => outcome,
            Err(err) => panic!("fatal error in edge callback: {err}"),
        }
    }

    /// Removes an active registration without dispatching its tasks.
    ///
    /// Returns `false` if the registration already fired or was cancelled.
    pub fn cancel(&mut self, native: &mut N, key: RegistrationKey) -> bool {
        let cancelled = self.teardown(native, key).is_some();
        if cancelled {
            self.stats.cancelled += 1;
            log::trace!("cancelled {key}");
        }
        cancelled
    }

    /// Tears down every active registration and drops pending waits.
    ///
    /// Called at the end of simulation; registrations that never matched
    /// are released here. Returns the number of registrations removed.
    pub fn shutdown(&mut self, native: &mut N) -> usize {
        let dropped_waits = self.pending.len();
        self.pending.clear();

        let keys: Vec<RegistrationKey> = self.registrations.keys().collect();
        for &key in &keys {
            self.teardown(native, key);
        }
        self.stats.cancelled += keys.len() as u64;

        let stats = self.stats();
        log::info!(
            "edge multiplexer shut down: {} registration(s) removed, {} pending wait(s) dropped; \
             {} registration(s) for {} wait(s), {} fired, {} task(s) resumed in {:?}",
            keys.len(),
            dropped_waits,
            stats.registrations,
            stats.waits_added,
            stats.fired,
            stats.dispatched_tasks,
            stats.dispatch_time
        );
        keys.len()
    }

    /// Removes the native subscription, releases the ID, and frees the slot.
    ///
    /// Returns `None` if `key` no longer refers to a live registration.
    fn teardown(
        &mut self,
        native: &mut N,
        key: RegistrationKey,
    ) -> Option<CallbackRegistration<N::Signal>> {
        let mut registration = self.registrations.remove(key)?;
        let id = registration.id();
        let handle = self.take_native_handle(id);
        native.remove_callback(handle);
        self.pool.release(id);
        let was_active = registration.mark_removed();
        assert!(was_active, "registration {key} removed twice");
        Some(registration)
    }

    fn take_native_handle(&mut self, id: CallbackId) -> N::CallbackHandle {
        match self.native_handles.get_mut(id.index()).and_then(Option::take) {
            Some(handle) => handle,
            None => panic!("callback id {id} has no native handle; removed twice"),
        }
    }

    /// Marks the context unusable after a fatal registration error.
    fn poison(&mut self, err: MuxError) -> MuxError {
        log::error!("edge multiplexer poisoned: {err}");
        self.poisoned = true;
        err
    }

    fn ensure_live(&self) -> Result<(), MuxError> {
        if self.is_poisoned() {
            Err(MuxError::Poisoned)
        } else {
            Ok(())
        }
    }

    /// Returns `true` if `key` refers to a registration still awaiting a match.
    pub fn is_active(&self, key: RegistrationKey) -> bool {
        self.registrations.contains(key)
    }

    /// Looks up an active registration.
    pub fn registration(&self, key: RegistrationKey) -> Option<&CallbackRegistration<N::Signal>> {
        self.registrations.get(key)
    }

    /// Number of active native registrations.
    pub fn active_registrations(&self) -> usize {
        self.registrations.len()
    }

    /// The callback-ID pool.
    pub fn id_pool(&self) -> &IdPool {
        &self.pool
    }

    /// Returns `true` once a dispatch failure or an exhausted ID pool has
    /// made the context unusable.
    pub fn is_poisoned(&self) -> bool {
        self.poisoned || self.bridge.is_torn_down()
    }

    /// A snapshot of the activity counters.
    pub fn stats(&self) -> MuxStats {
        MuxStats {
            dispatch_calls: self.bridge.dispatch_calls(),
            dispatched_tasks: self.bridge.dispatched_tasks(),
            dispatch_time: self.bridge.dispatch_time(),
            ..self.stats.clone()
        }
    }
}
