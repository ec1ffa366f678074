//! The minimal task kind: a thunk that runs once, with no coalescing.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use crate::error::Result;
use crate::task::{BatchingKeys, Handler, LeafTask, Task, TaskId};
use crate::value::Value;

/// Wraps a one-shot closure as a [`LeafTask`].
///
/// Every `SimpleTask` reports the same handler and batch key, so siblings in a
/// [`MultiTask`](crate::MultiTask) are dispatched together, but it sets no `task_key`: it
/// never coalesces with another `SimpleTask`, since each one's thunk is a distinct,
/// non-interchangeable unit of work.
pub struct SimpleTask {
    thunk: Box<dyn FnOnce() -> Value>,
}

impl SimpleTask {
    pub fn new(thunk: impl FnOnce() -> Value + 'static) -> Self {
        Self { thunk: Box::new(thunk) }
    }
}

impl fmt::Debug for SimpleTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleTask").finish_non_exhaustive()
    }
}

impl LeafTask for SimpleTask {
    fn batching_keys(&self) -> BatchingKeys {
        BatchingKeys::new("scheduler::SimpleTask")
    }

    fn make_handler(&self) -> Box<dyn Handler> {
        Box::new(SimpleTaskHandler)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

struct SimpleTaskHandler;

impl Handler for SimpleTaskHandler {
    fn execute_batch(
        &self,
        _batch_key: &str,
        tasks: HashMap<TaskId, Box<dyn LeafTask>>,
        results: &mut HashMap<TaskId, Value>,
    ) -> Result<()> {
        for (id, task) in tasks {
            let simple = task
                .into_any()
                .downcast::<SimpleTask>()
                .expect("SimpleTaskHandler only ever receives SimpleTask instances");
            log::trace!("running SimpleTask thunk for {id}");
            results.insert(id, (simple.thunk)());
        }
        Ok(())
    }
}

/// Builds a [`Task`] around a one-shot thunk.
pub fn simple(thunk: impl FnOnce() -> Value + 'static) -> Task {
    Task::leaf(SimpleTask::new(thunk))
}
