//! The simplest coalescable task: echoes a fixed key back as its own result.

use std::any::Any;
use std::collections::HashMap;

use scheduler::{BatchingKeys, Handler, LeafTask, Result, Task, TaskId, Value};

/// A task that resolves to its own `key`. Exists mainly to demonstrate coalescing: two
/// `Echo` tasks built with the same key collapse into a single dispatched instance.
#[derive(Debug, Clone)]
pub struct Echo {
    pub key: u64,
}

impl Echo {
    pub fn new(key: u64) -> Self {
        Self { key }
    }
}

impl LeafTask for Echo {
    fn batching_keys(&self) -> BatchingKeys {
        BatchingKeys::new("tasks::Echo").with_task_key(self.key.to_string())
    }

    fn make_handler(&self) -> Box<dyn Handler> {
        Box::new(EchoHandler)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

struct EchoHandler;

impl Handler for EchoHandler {
    fn execute_batch(
        &self,
        batch_key: &str,
        tasks: HashMap<TaskId, Box<dyn LeafTask>>,
        results: &mut HashMap<TaskId, Value>,
    ) -> Result<()> {
        log::debug!("EchoHandler dispatching {} task(s) in batch {batch_key:?}", tasks.len());
        for (id, task) in tasks {
            let echo = task.into_any().downcast::<Echo>().expect("EchoHandler only ever receives Echo tasks");
            results.insert(id, Value::new(echo.key));
        }
        Ok(())
    }
}

/// Builds a [`Task`] that resolves to `key`.
pub fn echo(key: u64) -> Task {
    Task::leaf(Echo::new(key))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batching_keys_dedup_on_the_echoed_key() {
        let a = Echo::new(5).batching_keys();
        let b = Echo::new(5).batching_keys();
        let c = Echo::new(6).batching_keys();
        assert_eq!(a.handler, b.handler);
        assert_eq!(a.task_key, b.task_key);
        assert_ne!(a.task_key, c.task_key);
    }

    #[test]
    fn test_execute_resolves_to_its_own_key() {
        let value = echo(11).execute().unwrap().unwrap();
        assert_eq!(value.downcast::<u64>().unwrap(), 11);
    }
}
