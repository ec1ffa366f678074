//! Resolves a user name to a numeric id, in bulk where possible.

use std::any::Any;
use std::collections::HashMap;

use scheduler::{BatchingKeys, Handler, LeafTask, Result, Task, TaskId, Value};

/// Looks up `name`'s user id. Pairs with [`crate::fetch`] to demonstrate a two-stage
/// lookup-then-fetch chain built with `sequence`.
#[derive(Debug, Clone)]
pub struct Lookup {
    pub name: String,
}

impl Lookup {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl LeafTask for Lookup {
    fn batching_keys(&self) -> BatchingKeys {
        BatchingKeys::new("tasks::Lookup").with_task_key(self.name.clone())
    }

    fn make_handler(&self) -> Box<dyn Handler> {
        Box::new(LookupHandler)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

struct LookupHandler;

impl Handler for LookupHandler {
    fn execute_batch(
        &self,
        batch_key: &str,
        tasks: HashMap<TaskId, Box<dyn LeafTask>>,
        results: &mut HashMap<TaskId, Value>,
    ) -> Result<()> {
        log::debug!("LookupHandler resolving {} name(s) in batch {batch_key:?}", tasks.len());
        for (id, task) in tasks {
            let lookup = task.into_any().downcast::<Lookup>().expect("LookupHandler only ever receives Lookup tasks");
            results.insert(id, Value::new(directory(&lookup.name)));
        }
        Ok(())
    }
}

/// A tiny deterministic name-to-id table, standing in for a real directory service.
fn directory(name: &str) -> u64 {
    match name {
        "alice" => 42,
        "bob" => 7,
        _ => name.bytes().map(u64::from).sum(),
    }
}

/// Builds a [`Task`] that resolves `name` to its user id.
pub fn lookup(name: impl Into<String>) -> Task {
    Task::leaf(Lookup::new(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_names_resolve_to_their_fixed_ids() {
        let alice = lookup("alice").execute().unwrap().unwrap();
        let bob = lookup("bob").execute().unwrap().unwrap();
        assert_eq!(alice.downcast::<u64>().unwrap(), 42);
        assert_eq!(bob.downcast::<u64>().unwrap(), 7);
    }

    #[test]
    fn test_batching_keys_dedup_on_the_name() {
        let a = Lookup::new("carol").batching_keys();
        let b = Lookup::new("carol").batching_keys();
        assert_eq!(a.task_key, b.task_key);
    }
}
