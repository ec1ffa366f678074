//! A caller-keyed collection of tasks, and the engine entry point for running them.

use std::collections::HashMap;

use crate::config::SchedulerConfig;
use crate::error::{Error, Result};
use crate::scheduler::{BatchDescriptor, Scheduler};
use crate::task::Task;
use crate::value::{CallerKey, ResultTree};

/// A tree of tasks, keyed by an arbitrary label of the caller's choosing.
///
/// Running a `MultiTask` flattens it (and any nested `MultiTask`s) into batches grouped by
/// handler and batch key, dispatches each batch once per phase, and reassembles a
/// [`ResultTree`] that mirrors the caller-key shape of the input.
#[derive(Debug, Default)]
pub struct MultiTask {
    subtasks: HashMap<CallerKey, Task>,
}

impl MultiTask {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a subtask under `caller_key`.
    ///
    /// Fails with [`Error::DuplicateCallerKey`] if `caller_key` is already present.
    pub fn add(&mut self, caller_key: impl Into<CallerKey>, task: impl Into<Task>) -> Result<()> {
        let caller_key = caller_key.into();
        if self.subtasks.contains_key(&caller_key) {
            return Err(Error::DuplicateCallerKey(caller_key));
        }
        self.subtasks.insert(caller_key, task.into());
        Ok(())
    }

    /// Runs this tree to completion with the default (unbounded) configuration.
    pub fn execute(self) -> Result<ResultTree> {
        Scheduler::new().run(self)
    }

    /// Runs this tree to completion with a caller-supplied configuration.
    pub fn execute_with_config(self, config: SchedulerConfig) -> Result<ResultTree> {
        Scheduler::with_config(config).run(self)
    }

    /// Builds the first phase's batches without dispatching them, for diagnostic
    /// inspection: which handlers would run, over which batch keys, and how many distinct
    /// tasks (after deduplication) ended up in each.
    pub fn batches_for_debugging(self) -> Vec<BatchDescriptor> {
        let mut scheduler = Scheduler::new();
        scheduler.seed(self);
        scheduler.into_batch_descriptors()
    }

    pub(crate) fn into_subtasks(self) -> HashMap<CallerKey, Task> {
        self.subtasks
    }
}
