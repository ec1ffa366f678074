//! The abstract task contract: what a caller builds and what a handler consumes.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use crate::error::{Error, Result};
use crate::multi::MultiTask;
use crate::scheduler::Scheduler;
use crate::sequence::SequenceTask;
use crate::simple::SimpleTask;
use crate::value::Value;

/// Identifies a handler. A plain string rather than a type-token, so that two otherwise
/// unrelated task structs can deliberately share a handler by reporting the same id.
pub type HandlerId = &'static str;

/// A scheduler-assigned identity for one task instance within a single run.
///
/// Never constructed by callers; see in [`batching_keys`](LeafTask::batching_keys) docs
/// for how a task instead identifies itself for batching and deduplication purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(pub(crate) u64);

impl TaskId {
    /// The raw numeric identity, exposed for logging and diagnostics.
    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How a leaf task wants to be grouped and deduplicated.
#[derive(Debug, Clone)]
pub struct BatchingKeys {
    /// Which handler dispatches this task.
    pub handler: HandlerId,
    /// Which bucket, among tasks sharing a handler, this task falls into. Tasks with the
    /// same `(handler, batch_key)` are dispatched together in one `execute_batch` call.
    pub batch_key: String,
    /// An optional identity within `(handler, batch_key)`. Two tasks sharing the full
    /// `(handler, batch_key, task_key)` triple are the same unit of work and collapse to a
    /// single dispatched instance.
    pub task_key: Option<String>,
}

impl BatchingKeys {
    /// Starts a set of batching keys for `handler`, defaulting to a single shared batch
    /// bucket and no deduplication.
    pub fn new(handler: HandlerId) -> Self {
        Self { handler, batch_key: "default".to_string(), task_key: None }
    }

    /// Sets the batch bucket.
    pub fn with_batch_key(mut self, batch_key: impl Into<String>) -> Self {
        self.batch_key = batch_key.into();
        self
    }

    /// Sets the deduplication key.
    pub fn with_task_key(mut self, task_key: impl Into<String>) -> Self {
        self.task_key = Some(task_key.into());
        self
    }
}

/// A dispatchable unit of work: something a [`Handler`] can execute as part of a batch.
///
/// Implemented by [`SimpleTask`] and by whatever concrete task structs a handler author
/// defines (see the `tasks` crate for examples). `as_any`/`into_any` exist so that a
/// handler, given a batch of erased `Box<dyn LeafTask>` values, can recover its own
/// concrete type.
pub trait LeafTask: fmt::Debug {
    /// How this task should be grouped and deduplicated against its siblings.
    fn batching_keys(&self) -> BatchingKeys;

    /// Produces the handler that can execute a batch of tasks like this one.
    fn make_handler(&self) -> Box<dyn Handler>;

    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

/// Executes a batch of same-kind tasks in one call.
///
/// `tasks` is owned, not borrowed: most handlers only need to read each task's fields, but
/// a task like [`SimpleTask`] carries a one-shot thunk it must consume, so ownership is
/// handed over rather than threading interior mutability through every handler.
pub trait Handler {
    fn execute_batch(
        &self,
        batch_key: &str,
        tasks: HashMap<TaskId, Box<dyn LeafTask>>,
        results: &mut HashMap<TaskId, Value>,
    ) -> Result<()>;
}

/// A node in a task tree: either directly dispatchable, a deferred continuation, or a
/// nested collection of more tasks.
#[derive(Debug)]
pub enum Task {
    Leaf(Box<dyn LeafTask>),
    Sequence(Box<SequenceTask>),
    Multi(MultiTask),
}

impl Task {
    /// Wraps a concrete [`LeafTask`] implementation as a [`Task`].
    pub fn leaf<T: LeafTask + 'static>(task: T) -> Self {
        Task::Leaf(Box::new(task))
    }

    /// Runs this task on its own, outside of any [`MultiTask`].
    ///
    /// A leaf task is run as a synthetic batch of one. A sequence recursively executes its
    /// base task, feeds the result to its progression function, and executes whatever task
    /// (if any) comes back. A multi task runs a full scheduler pass and returns its
    /// [`ResultTree`](crate::ResultTree) wrapped as an opaque `Value`.
    pub fn execute(self) -> Result<Option<Value>> {
        match self {
            Task::Leaf(leaf) => {
                let keys = leaf.batching_keys();
                let handler = leaf.make_handler();
                let id = TaskId(0);
                let mut tasks = HashMap::new();
                tasks.insert(id, leaf);
                let mut results = HashMap::new();
                handler.execute_batch(&keys.batch_key, tasks, &mut results)?;
                let value = results.remove(&id).ok_or(Error::MissingResult {
                    handler: keys.handler.to_string(),
                    task_id: id.0,
                })?;
                Ok(Some(value))
            }
            Task::Sequence(seq) => {
                let (base, progression) = seq.into_parts();
                match base.execute()? {
                    None => Ok(None),
                    Some(value) => match progression(value) {
                        None => Ok(None),
                        Some(next) => next.execute(),
                    },
                }
            }
            Task::Multi(multi) => {
                let tree = Scheduler::new().run(multi)?;
                Ok(Some(Value::new(tree)))
            }
        }
    }
}

impl From<MultiTask> for Task {
    fn from(multi: MultiTask) -> Self {
        Task::Multi(multi)
    }
}

impl From<SimpleTask> for Task {
    fn from(task: SimpleTask) -> Self {
        Task::leaf(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simple::simple;

    #[test]
    fn test_leaf_execute_runs_as_a_synthetic_batch_of_one() {
        let task = simple(|| Value::new(9u64));
        let value = task.execute().unwrap().unwrap();
        assert_eq!(value.downcast::<u64>().unwrap(), 9);
    }
}
