//! Error types for the scheduler library.
//!
//! This module provides a consolidated error type for the entire library,
//! which wraps the failure modes of the Task/Handler contract itself.
//! Business-level handler failures are not represented here — a handler
//! is expected to encode those in the result value it writes.

use thiserror::Error;

/// A type alias for `Result` with the library's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents all possible contract violations the scheduler can detect.
#[derive(Debug, Error)]
pub enum Error {
    /// No handler is registered for the `handler_id` a task reported.
    #[error("no handler registered for handler id {0:?}")]
    HandlerNotRegistered(String),

    /// A handler's `execute_batch` returned without writing a result for
    /// every `task_id` it was given.
    #[error("handler {handler:?} did not produce a result for task {task_id}")]
    MissingResult { handler: String, task_id: u64 },

    /// `SchedulerConfig::max_phases` was exceeded before the run settled.
    #[error("exceeded the configured maximum of {0} phases")]
    PhaseLimitExceeded(usize),

    /// A `SequenceTask` was constructed with a `MultiTask` as its base; a multi's
    /// result is a tree, not the single value a progression function expects.
    #[error("a SequenceTask's base task may not be a MultiTask")]
    SequenceBaseIsMulti,

    /// `MultiTask::add` was called twice with the same caller key.
    #[error("caller key {0:?} is already present in this MultiTask")]
    DuplicateCallerKey(String),
}
