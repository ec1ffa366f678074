//! A deferred task batching and coalescing engine.
//!
//! Callers build a tree of [`Task`]s under a [`MultiTask`], keying each subtask with an
//! arbitrary caller-chosen label. Running the tree proceeds in phases: every dispatchable
//! task is grouped with its same-handler, same-batch-key siblings, each group is handed to
//! its [`Handler`] in one `execute_batch` call, and any [`SequenceTask`] that depended on a
//! just-resolved result gets a chance to supply a follow-up task for the next phase. The
//! loop ends once a phase produces no more follow-ups, and the caller gets back a
//! [`ResultTree`] shaped like the tree they built.
//!
//! ```
//! use scheduler::{simple, MultiTask, Value};
//!
//! let mut multi = MultiTask::new();
//! multi.add("a", simple(|| Value::new(1u64))).unwrap();
//! multi.add("b", simple(|| Value::new(2u64))).unwrap();
//!
//! let tree = multi.execute().unwrap();
//! let a = tree.get("a").unwrap().as_leaf().unwrap().as_ref().unwrap();
//! assert_eq!(a.downcast_ref::<u64>(), Some(&1));
//! ```

pub mod config;
pub mod error;
mod multi;
mod scheduler;
mod sequence;
mod simple;
mod task;
mod value;

pub use config::SchedulerConfig;
pub use error::{Error, Result};
pub use multi::MultiTask;
pub use scheduler::{BatchDescriptor, Scheduler};
pub use sequence::{sequence, Progression, SequenceTask};
pub use simple::{simple, SimpleTask};
pub use task::{BatchingKeys, Handler, HandlerId, LeafTask, Task, TaskId};
pub use value::{CallerKey, ResultTree, Value};
