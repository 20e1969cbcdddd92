//! Discrete-event kernel with native value-change callbacks.
//!
//! [`RefSim`] holds single-bit 4-state signals and a time-ordered event
//! queue. Each call to [`step`](RefSim::step) is one time step: the edge
//! multiplexer is flushed first, then every event due at the next time is
//! applied in scheduling order. A value change synchronously notifies every
//! callback subscribed to that signal, in subscription order.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::fmt;

use edgemux_common::{EdgeValue, Logic};
use edgemux_core::{EdgeMux, NativeSimulator, RegistrationKey, TaskScheduler, ValueChange};

use crate::error::SimError;
use crate::time::SimTime;

/// Identifier of a signal in a [`RefSim`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SignalId(u32);

impl SignalId {
    /// Returns the raw index.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Handle of a value-change callback registered with a [`RefSim`].
///
/// Handles are generation-checked: once removed, a handle never refers to
/// a later callback that reuses the same slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NativeCallbackHandle {
    index: u32,
    generation: u32,
}

/// The result of a single time step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    /// Events were applied; more may follow.
    Continued,
    /// The event queue is empty.
    Done,
}

/// A value change scheduled in the event queue.
#[derive(Debug, Clone)]
struct SimEvent {
    time: SimTime,
    /// Scheduling order, breaking ties between events at the same time.
    seq: u64,
    signal: SignalId,
    value: Logic,
}

impl PartialEq for SimEvent {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.seq == other.seq
    }
}

impl Eq for SimEvent {}

impl PartialOrd for SimEvent {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SimEvent {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.time
            .cmp(&other.time)
            .then(self.seq.cmp(&other.seq))
    }
}

#[derive(Debug, Clone)]
struct SignalState {
    name: String,
    value: Logic,
}

#[derive(Debug, Clone)]
struct NativeCallback {
    signal: SignalId,
    condition: EdgeValue,
    user_data: RegistrationKey,
    /// Subscription order, used to notify deterministically.
    order: u64,
}

#[derive(Debug, Clone)]
struct CallbackSlot {
    generation: u32,
    entry: Option<NativeCallback>,
}

/// An in-process simulator exposing value-change callbacks.
#[derive(Debug, Default)]
pub struct RefSim {
    current_time: SimTime,
    /// Min-heap event queue (earliest events first).
    event_queue: BinaryHeap<Reverse<SimEvent>>,
    next_seq: u64,
    signals: Vec<SignalState>,
    names: HashMap<String, SignalId>,
    callbacks: Vec<CallbackSlot>,
    free_slots: Vec<u32>,
    live_callbacks: usize,
    next_order: u64,
    registered: u64,
    removed: u64,
    delivered: u64,
    steps: u64,
    /// Reused per value change to snapshot the subscribers being notified.
    scratch: Vec<(u64, NativeCallbackHandle, RegistrationKey)>,
}

impl RefSim {
    /// Creates an empty simulator at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a named signal with an initial value.
    pub fn add_signal(&mut self, name: &str, initial: Logic) -> Result<SignalId, SimError> {
        if self.names.contains_key(name) {
            return Err(SimError::DuplicateSignal(name.to_string()));
        }
        let id = SignalId(self.signals.len() as u32);
        self.signals.push(SignalState {
            name: name.to_string(),
            value: initial,
        });
        self.names.insert(name.to_string(), id);
        Ok(id)
    }

    /// Finds a signal by name.
    pub fn find_signal(&self, name: &str) -> Option<SignalId> {
        self.names.get(name).copied()
    }

    /// Finds a signal by name, failing if it does not exist.
    pub fn signal(&self, name: &str) -> Result<SignalId, SimError> {
        self.find_signal(name)
            .ok_or_else(|| SimError::UnknownSignal(name.to_string()))
    }

    /// Returns the name of a signal.
    pub fn signal_name(&self, signal: SignalId) -> &str {
        &self.signals[signal.0 as usize].name
    }

    /// Returns the current value of a signal.
    pub fn value(&self, signal: SignalId) -> Logic {
        self.signals[signal.0 as usize].value
    }

    /// Returns the current simulation time.
    pub fn current_time(&self) -> SimTime {
        self.current_time
    }

    /// Returns the time of the earliest queued event.
    pub fn next_event_time(&self) -> Option<SimTime> {
        self.event_queue.peek().map(|Reverse(evt)| evt.time)
    }

    /// Returns the number of queued events.
    pub fn pending_events(&self) -> usize {
        self.event_queue.len()
    }

    /// Schedules `signal` to take `value` at time `at`.
    pub fn schedule(&mut self, at: SimTime, signal: SignalId, value: Logic) -> Result<(), SimError> {
        if at < self.current_time {
            return Err(SimError::EventInPast {
                at_fs: at.fs,
                now_fs: self.current_time.fs,
            });
        }
        self.event_queue.push(Reverse(SimEvent {
            time: at,
            seq: self.next_seq,
            signal,
            value,
        }));
        self.next_seq += 1;
        Ok(())
    }

    /// Schedules `cycles` clock periods on `signal`, starting one half
    /// period from now with a rising edge.
    pub fn schedule_clock(
        &mut self,
        signal: SignalId,
        half_period: SimTime,
        cycles: u32,
    ) -> Result<(), SimError> {
        let start = self.current_time.fs;
        for k in 1..=u64::from(cycles) * 2 {
            let value = if k % 2 == 1 { Logic::One } else { Logic::Zero };
            self.schedule(SimTime::from_fs(start + half_period.fs * k), signal, value)?;
        }
        Ok(())
    }

    /// Number of currently subscribed callbacks.
    pub fn active_callbacks(&self) -> usize {
        self.live_callbacks
    }

    /// Conditions of the callbacks subscribed to `signal`, in subscription order.
    pub fn conditions_on(&self, signal: SignalId) -> Vec<EdgeValue> {
        let mut subscribed: Vec<(u64, EdgeValue)> = self
            .callbacks
            .iter()
            .filter_map(|slot| slot.entry.as_ref())
            .filter(|cb| cb.signal == signal)
            .map(|cb| (cb.order, cb.condition))
            .collect();
        subscribed.sort_unstable_by_key(|(order, _)| *order);
        subscribed.into_iter().map(|(_, cond)| cond).collect()
    }

    /// Total callbacks ever registered.
    pub fn registered_callbacks(&self) -> u64 {
        self.registered
    }

    /// Total callbacks ever removed.
    pub fn removed_callbacks(&self) -> u64 {
        self.removed
    }

    /// Total notifications delivered to the multiplexer.
    pub fn delivered_notifications(&self) -> u64 {
        self.delivered
    }

    /// Number of time steps executed.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// Returns `true` if `handle` still refers to a subscribed callback.
    pub fn is_live(&self, handle: NativeCallbackHandle) -> bool {
        self.callbacks
            .get(handle.index as usize)
            .is_some_and(|slot| slot.generation == handle.generation && slot.entry.is_some())
    }

    /// Executes one time step.
    ///
    /// Pending waits are flushed into native callbacks before any event is
    /// applied, so tasks that started waiting during the previous step see
    /// this step's changes.
    pub fn step<T: TaskScheduler + ?Sized>(
        &mut self,
        mux: &mut EdgeMux<Self>,
        scheduler: &mut T,
    ) -> Result<StepResult, SimError> {
        mux.flush(self)?;

        let Some(now) = self.next_event_time() else {
            return Ok(StepResult::Done);
        };
        self.current_time = now;

        while self.next_event_time() == Some(now) {
            let Some(Reverse(evt)) = self.event_queue.pop() else {
                break;
            };
            self.apply(evt.signal, evt.value, mux, scheduler)?;
        }

        self.steps += 1;
        Ok(StepResult::Continued)
    }

    /// Runs until the event queue is empty.
    pub fn run<T: TaskScheduler + ?Sized>(
        &mut self,
        mux: &mut EdgeMux<Self>,
        scheduler: &mut T,
    ) -> Result<SimTime, SimError> {
        while self.step(mux, scheduler)? == StepResult::Continued {}
        log::debug!(
            "simulation finished at {} after {} step(s), {} notification(s)",
            self.current_time,
            self.steps,
            self.delivered
        );
        Ok(self.current_time)
    }

    /// Runs every time step up to and including `limit`.
    ///
    /// Waits recorded by the last step are flushed before returning.
    pub fn run_until<T: TaskScheduler + ?Sized>(
        &mut self,
        mux: &mut EdgeMux<Self>,
        scheduler: &mut T,
        limit: SimTime,
    ) -> Result<SimTime, SimError> {
        while self.next_event_time().is_some_and(|t| t <= limit) {
            self.step(mux, scheduler)?;
        }
        mux.flush(self)?;
        Ok(self.current_time)
    }

    fn apply<T: TaskScheduler + ?Sized>(
        &mut self,
        signal: SignalId,
        value: Logic,
        mux: &mut EdgeMux<Self>,
        scheduler: &mut T,
    ) -> Result<(), SimError> {
        let state = &mut self.signals[signal.0 as usize];
        if state.value == value {
            return Ok(());
        }
        log::trace!("{}: {} {} -> {}", self.current_time, state.name, state.value, value);
        state.value = value;
        self.notify(signal, value, mux, scheduler)
    }

    /// Delivers a value change to every callback subscribed to `signal`.
    fn notify<T: TaskScheduler + ?Sized>(
        &mut self,
        signal: SignalId,
        value: Logic,
        mux: &mut EdgeMux<Self>,
        scheduler: &mut T,
    ) -> Result<(), SimError> {
        let mut subscribers = std::mem::take(&mut self.scratch);
        subscribers.clear();
        subscribers.extend(self.callbacks.iter().enumerate().filter_map(|(index, slot)| {
            let cb = slot.entry.as_ref().filter(|cb| cb.signal == signal)?;
            let handle = NativeCallbackHandle {
                index: index as u32,
                generation: slot.generation,
            };
            Some((cb.order, handle, cb.user_data))
        }));
        subscribers.sort_unstable_by_key(|(order, _, _)| *order);

        let mut result = Ok(());
        for &(_, handle, user_data) in &subscribers {
            if !self.is_live(handle) {
                continue;
            }
            self.delivered += 1;
            let change = ValueChange::new(user_data, value);
            if let Err(err) = mux.try_on_value_change(self, scheduler, change) {
                result = Err(err.into());
                break;
            }
        }

        self.scratch = subscribers;
        result
    }
}

impl NativeSimulator for RefSim {
    type Signal = SignalId;
    type CallbackHandle = NativeCallbackHandle;

    fn register_value_change_callback(
        &mut self,
        signal: SignalId,
        condition: EdgeValue,
        user_data: RegistrationKey,
    ) -> NativeCallbackHandle {
        let entry = NativeCallback {
            signal,
            condition,
            user_data,
            order: self.next_order,
        };
        self.next_order += 1;
        self.registered += 1;
        self.live_callbacks += 1;

        match self.free_slots.pop() {
            Some(index) => {
                let slot = &mut self.callbacks[index as usize];
                slot.entry = Some(entry);
                NativeCallbackHandle {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.callbacks.len() as u32;
                self.callbacks.push(CallbackSlot {
                    generation: 0,
                    entry: Some(entry),
                });
                NativeCallbackHandle {
                    index,
                    generation: 0,
                }
            }
        }
    }

    fn remove_callback(&mut self, handle: NativeCallbackHandle) {
        assert!(
            self.is_live(handle),
            "native callback {handle:?} removed twice or never registered"
        );
        let slot = &mut self.callbacks[handle.index as usize];
        slot.entry = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_slots.push(handle.index);
        self.live_callbacks -= 1;
        self.removed += 1;
    }
}
