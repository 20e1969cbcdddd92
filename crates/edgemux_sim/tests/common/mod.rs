//! Shared harness for the simulator integration tests.

#![allow(dead_code)]

use edgemux_common::TaskId;
use edgemux_core::{ScriptError, TaskScheduler};

/// A stand-in scripting runtime that records every hand-off.
#[derive(Debug, Default)]
pub struct Runtime {
    /// Batches passed to `schedule_many`, in call order.
    pub batches: Vec<Vec<TaskId>>,
    /// Make every `schedule_many` call fail.
    pub fail: bool,
    /// Number of `finalize` calls.
    pub finalized: usize,
}

impl Runtime {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// All woken tasks, sorted.
    pub fn woken(&self) -> Vec<TaskId> {
        let mut all: Vec<TaskId> = self.batches.iter().flatten().copied().collect();
        all.sort();
        all
    }

    /// Removes and returns the tasks woken since the last call, in order.
    pub fn take_woken(&mut self) -> Vec<TaskId> {
        self.batches.drain(..).flatten().collect()
    }

    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.iter().map(Vec::len).collect()
    }
}

impl TaskScheduler for Runtime {
    fn schedule_many(&mut self, tasks: &[TaskId]) -> Result<(), ScriptError> {
        self.batches.push(tasks.to_vec());
        if self.fail {
            return Err(ScriptError::new(
                "main.lua:12: attempt to index a nil value (field 'dut')",
                "stack traceback:\n\tmain.lua:12: in function 'body'",
            ));
        }
        Ok(())
    }

    fn finalize(&mut self) {
        self.finalized += 1;
    }
}

pub fn task(raw: u32) -> TaskId {
    TaskId::from_raw(raw)
}

pub fn tasks(range: std::ops::Range<u32>) -> Vec<TaskId> {
    range.map(TaskId::from_raw).collect()
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
