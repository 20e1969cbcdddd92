//! Hand-off of woken tasks to the external task scheduler.
//!
//! [`SchedulerBridge::dispatch`] passes a whole batch to
//! [`TaskScheduler::schedule_many`] in one call. A script failure inside
//! that call is fatal: the bridge finalizes the environment exactly once,
//! refuses every later dispatch, and reports the failure verbatim.

use std::time::{Duration, Instant};

use edgemux_common::TaskId;

use crate::error::{MuxError, ScriptError};

/// The scripting runtime's entry points used by the multiplexer.
pub trait TaskScheduler {
    /// Resumes every task in `tasks`, in the order given.
    fn schedule_many(&mut self, tasks: &[TaskId]) -> Result<(), ScriptError>;

    /// Tears down the simulation environment after a fatal error.
    fn finalize(&mut self);
}

/// Fail-fast wrapper around a [`TaskScheduler`].
#[derive(Debug, Clone, Default)]
pub struct SchedulerBridge {
    profiling: bool,
    torn_down: bool,
    dispatch_calls: u64,
    dispatched_tasks: u64,
    dispatch_time: Duration,
}

impl SchedulerBridge {
    /// Creates a bridge; with `profiling` the time spent in the scheduler is
    /// accumulated.
    pub fn new(profiling: bool) -> Self {
        Self {
            profiling,
            ..Self::default()
        }
    }

    /// Resumes `tasks` through `scheduler` in a single call.
    pub fn dispatch<T: TaskScheduler + ?Sized>(
        &mut self,
        scheduler: &mut T,
        tasks: &[TaskId],
    ) -> Result<(), MuxError> {
        if self.torn_down {
            return Err(MuxError::Poisoned);
        }

        let start = self.profiling.then(Instant::now);
        let result = scheduler.schedule_many(tasks);
        if let Some(start) = start {
            self.dispatch_time += start.elapsed();
        }
        self.dispatch_calls += 1;

        match result {
            Ok(()) => {
                self.dispatched_tasks += tasks.len() as u64;
                Ok(())
            }
            Err(err) => {
                log::error!(
                    "scheduler failed while resuming {} task(s): {}\n{}",
                    tasks.len(),
                    err.message,
                    err.traceback
                );
                self.torn_down = true;
                scheduler.finalize();
                Err(err.into())
            }
        }
    }

    /// Returns `true` once a dispatch failure has torn the environment down.
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Number of `schedule_many` calls made.
    pub fn dispatch_calls(&self) -> u64 {
        self.dispatch_calls
    }

    /// Number of tasks resumed successfully.
    pub fn dispatched_tasks(&self) -> u64 {
        self.dispatched_tasks
    }

    /// Wall-clock time spent inside the scheduler (zero unless profiling).
    pub fn dispatch_time(&self) -> Duration {
        self.dispatch_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Vec<TaskId>>,
        fail_on_call: Option<usize>,
        finalized: usize,
    }

    impl TaskScheduler for Recorder {
        fn schedule_many(&mut self, tasks: &[TaskId]) -> Result<(), ScriptError> {
            self.calls.push(tasks.to_vec());
            if self.fail_on_call == Some(self.calls.len()) {
                return Err(ScriptError::new("bad task", "traceback"));
            }
            Ok(())
        }

        fn finalize(&mut self) {
            self.finalized += 1;
        }
    }

    fn ids(raw: &[u32]) -> Vec<TaskId> {
        raw.iter().copied().map(TaskId::from_raw).collect()
    }

    #[test]
    fn batch_is_handed_over_in_one_call() {
        let mut bridge = SchedulerBridge::new(false);
        let mut sched = Recorder::default();
        bridge.dispatch(&mut sched, &ids(&[3, 1, 2])).unwrap();
        assert_eq!(sched.calls, vec![ids(&[3, 1, 2])]);
        assert_eq!(bridge.dispatch_calls(), 1);
        assert_eq!(bridge.dispatched_tasks(), 3);
        assert_eq!(bridge.dispatch_time(), Duration::ZERO);
    }

    #[test]
    fn failure_finalizes_once_and_blocks_later_dispatches() {
        let mut bridge = SchedulerBridge::new(false);
        let mut sched = Recorder {
            fail_on_call: Some(1),
            ..Recorder::default()
        };

        let err = bridge.dispatch(&mut sched, &ids(&[1])).unwrap_err();
        match err {
            MuxError::DispatchFailed { message, traceback } => {
                assert_eq!(message, "bad task");
                assert_eq!(traceback, "traceback");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(bridge.is_torn_down());

        let err = bridge.dispatch(&mut sched, &ids(&[2])).unwrap_err();
        assert!(matches!(err, MuxError::Poisoned));
        assert_eq!(sched.calls.len(), 1);
        assert_eq!(sched.finalized, 1);
        assert_eq!(bridge.dispatched_tasks(), 0);
    }

    #[test]
    fn profiling_counts_calls() {
        let mut bridge = SchedulerBridge::new(true);
        let mut sched = Recorder::default();
        for _ in 0..3 {
            bridge.dispatch(&mut sched, &ids(&[1, 2])).unwrap();
        }
        assert_eq!(bridge.dispatch_calls(), 3);
        assert_eq!(bridge.dispatched_tasks(), 6);
    }
}
