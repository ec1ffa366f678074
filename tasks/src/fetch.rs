//! Resolves a user id to a user record, in bulk where possible.

use std::any::Any;
use std::collections::HashMap;

use scheduler::{BatchingKeys, Handler, LeafTask, Result, Task, TaskId, Value};

/// A user record as returned by [`Fetch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: u64,
    pub name: String,
}

/// Fetches the record for a user id. Pairs with [`crate::lookup`] to demonstrate a
/// two-stage lookup-then-fetch chain built with `sequence`, and coalesces with any other
/// `Fetch` for the same id dispatched in the same run.
#[derive(Debug, Clone)]
pub struct Fetch {
    pub id: u64,
}

impl Fetch {
    pub fn new(id: u64) -> Self {
        Self { id }
    }
}

impl LeafTask for Fetch {
    fn batching_keys(&self) -> BatchingKeys {
        BatchingKeys::new("tasks::Fetch").with_task_key(self.id.to_string())
    }

    fn make_handler(&self) -> Box<dyn Handler> {
        Box::new(FetchHandler)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

struct FetchHandler;

impl Handler for FetchHandler {
    fn execute_batch(
        &self,
        batch_key: &str,
        tasks: HashMap<TaskId, Box<dyn LeafTask>>,
        results: &mut HashMap<TaskId, Value>,
    ) -> Result<()> {
        log::debug!("FetchHandler resolving {} id(s) in batch {batch_key:?}", tasks.len());
        for (id, task) in tasks {
            let fetch = task.into_any().downcast::<Fetch>().expect("FetchHandler only ever receives Fetch tasks");
            results.insert(id, Value::new(records(fetch.id)));
        }
        Ok(())
    }
}

/// A tiny deterministic id-to-record table, standing in for a real record store.
fn records(id: u64) -> User {
    let name = match id {
        42 => "alice",
        7 => "bob",
        _ => "unknown",
    };
    User { id, name: name.to_string() }
}

/// Builds a [`Task`] that resolves `id` to its user record.
pub fn fetch(id: u64) -> Task {
    Task::leaf(Fetch::new(id))
}
