//! A task that defers to a continuation once its base task resolves.

use std::fmt;

use crate::error::{Error, Result};
use crate::task::Task;
use crate::value::Value;

/// A progression: given the base task's result, decides what (if anything) runs next.
pub type Progression = Box<dyn FnOnce(Value) -> Option<Task>>;

/// A task that is not itself dispatchable: it runs `base`, hands the result to
/// `progression`, and the task `progression` returns (if any) takes its place.
///
/// `base` may not be a [`Task::Multi`]: a multi's result is a tree, not the single value a
/// progression function expects. `base` may be another `SequenceTask`, in which case each
/// level's progression is applied in turn as its predecessor resolves.
pub struct SequenceTask {
    pub(crate) base: Box<Task>,
    pub(crate) progression: Progression,
}

impl fmt::Debug for SequenceTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SequenceTask").field("base", &self.base).finish_non_exhaustive()
    }
}

impl SequenceTask {
    /// Borrows the base task.
    pub fn base(&self) -> &Task {
        &self.base
    }

    /// Consumes the sequence, handing back its base task and progression function.
    pub fn into_parts(self) -> (Task, Progression) {
        (*self.base, self.progression)
    }
}

/// Builds a [`Task::Sequence`] around `base` and `progression`.
///
/// Fails with [`Error::SequenceBaseIsMulti`] if `base` is a [`Task::Multi`]: a sequence's
/// base must resolve to a single result that the progression function can consume, and a
/// multi task produces a whole result tree instead.
pub fn sequence(base: Task, progression: impl FnOnce(Value) -> Option<Task> + 'static) -> Result<Task> {
    if matches!(base, Task::Multi(_)) {
        return Err(Error::SequenceBaseIsMulti);
    }
    Ok(Task::Sequence(Box::new(SequenceTask { base: Box::new(base), progression: Box::new(progression) })))
}
