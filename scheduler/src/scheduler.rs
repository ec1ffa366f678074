//! The phase-loop engine: flatten, batch, dispatch, progress, repeat.

use std::collections::HashMap;

use crate::config::SchedulerConfig;
use crate::error::{Error, Result};
use crate::multi::MultiTask;
use crate::sequence::Progression;
use crate::task::{Handler, HandlerId, LeafTask, Task, TaskId};
use crate::value::{CallerKey, ResultTree, Value};

/// A snapshot of one batch the scheduler would dispatch, for [`MultiTask::batches_for_debugging`](crate::MultiTask::batches_for_debugging).
#[derive(Debug)]
pub struct BatchDescriptor {
    pub handler: HandlerId,
    pub batch_key: String,
    pub task_ids: Vec<TaskId>,
}

/// The result-tree skeleton: leaves carry the (rewritable) task_id that will supply their
/// value; branches carry caller-keyed indices into the same arena. Indexing by `usize`
/// instead of holding child nodes directly lets a sequence's slot be overwritten in place
/// once its chain advances, without disturbing any other slot's address.
#[derive(Debug)]
enum SkeletonNode {
    Leaf(TaskId),
    Branch(HashMap<CallerKey, usize>),
}

/// A progression waiting on some task_id's result, along with the skeleton slot it owns.
///
/// Several of these can be registered against the same task_id: if a sequence's base
/// dedups with another sequence's (or a plain leaf's) base, both progressions still need
/// to fire independently off the one dispatched result, each free to rewrite only its own
/// slot.
struct PendingProgression {
    slot: usize,
    progression: Progression,
}

/// Runs a single [`MultiTask`] to completion.
///
/// One `Scheduler` is scoped to one run: `next_id`, `task_ids_by_key`, and `handlers`
/// persist for the run's whole lifetime (so coalescing and handler lookup work across
/// phases), while `batches` and `pending_progressions` are drained at the start of each
/// phase and refilled by that phase's work.
pub struct Scheduler {
    config: SchedulerConfig,
    next_id: u64,
    batches: HashMap<(HandlerId, String), HashMap<TaskId, Box<dyn LeafTask>>>,
    task_ids_by_key: HashMap<(HandlerId, String, String), TaskId>,
    pending_progressions: HashMap<TaskId, Vec<PendingProgression>>,
    results: HashMap<TaskId, Option<Value>>,
    handlers: HashMap<HandlerId, Box<dyn Handler>>,
    arena: Vec<SkeletonNode>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self::with_config(SchedulerConfig::default())
    }

    pub fn with_config(config: SchedulerConfig) -> Self {
        Self {
            config,
            next_id: 0,
            batches: HashMap::new(),
            task_ids_by_key: HashMap::new(),
            pending_progressions: HashMap::new(),
            results: HashMap::new(),
            handlers: HashMap::new(),
            arena: Vec::new(),
        }
    }

    fn next_task_id(&mut self) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Builds the root skeleton from `multi` without dispatching anything.
    pub(crate) fn seed(&mut self, multi: MultiTask) -> usize {
        let slot = self.arena.len();
        self.arena.push(SkeletonNode::Branch(HashMap::new()));
        let mut children = HashMap::new();
        for (caller_key, task) in multi.into_subtasks() {
            let id = self.next_task_id();
            let child_slot = self.schedule_entry(id, task);
            children.insert(caller_key, child_slot);
        }
        self.arena[slot] = SkeletonNode::Branch(children);
        slot
    }

    pub(crate) fn into_batch_descriptors(self) -> Vec<BatchDescriptor> {
        self.batches
            .into_iter()
            .map(|((handler, batch_key), tasks)| BatchDescriptor {
                handler,
                batch_key,
                task_ids: tasks.keys().copied().collect(),
            })
            .collect()
    }

    fn schedule_entry(&mut self, id: TaskId, task: Task) -> usize {
        let slot = self.arena.len();
        self.arena.push(SkeletonNode::Leaf(id));
        self.schedule_into(slot, id, task);
        slot
    }

    /// Fills `slot` in for `task`, unwrapping sequences (recording their progressions
    /// against `id`) until a leaf or a nested multi is reached.
    fn schedule_into(&mut self, slot: usize, id: TaskId, mut task: Task) {
        loop {
            match task {
                Task::Sequence(seq) => {
                    let (base, progression) = seq.into_parts();
                    self.pending_progressions.entry(id).or_default().push(PendingProgression { slot, progression });
                    task = base;
                }
                Task::Multi(multi) => {
                    let mut children = HashMap::new();
                    for (caller_key, sub) in multi.into_subtasks() {
                        let child_id = self.next_task_id();
                        let child_slot = self.schedule_entry(child_id, sub);
                        children.insert(caller_key, child_slot);
                    }
                    self.arena[slot] = SkeletonNode::Branch(children);
                    return;
                }
                Task::Leaf(leaf) => {
                    self.schedule_leaf(slot, id, leaf);
                    return;
                }
            }
        }
    }

    fn schedule_leaf(&mut self, slot: usize, id: TaskId, leaf: Box<dyn LeafTask>) {
        let keys = leaf.batching_keys();
        if let Some(task_key) = &keys.task_key {
            let dedup_key = (keys.handler, keys.batch_key.clone(), task_key.clone());
            if let Some(&existing_id) = self.task_ids_by_key.get(&dedup_key) {
                // `id` never reaches a batch: it was a sequence's base (or a plain
                // duplicate) that turned out to already be scheduled under `existing_id`.
                // If a progression was staged against `id` while unwrapping down to this
                // leaf, it must not be dropped: re-key it onto `existing_id` so it still
                // fires, against its own slot, once that shared task_id resolves. Leave
                // `slot` untouched in that case — it still holds its original placeholder,
                // so if the progression ends up returning nothing, the slot naturally
                // resolves to nil instead of silently adopting the shared base's raw value.
                if let Some(pending) = self.pending_progressions.remove(&id) {
                    self.pending_progressions.entry(existing_id).or_default().extend(pending);
                } else {
                    self.arena[slot] = SkeletonNode::Leaf(existing_id);
                }
                return;
            }
            self.task_ids_by_key.insert(dedup_key, id);
        }
        self.handlers.entry(keys.handler).or_insert_with(|| leaf.make_handler());
        self.batches.entry((keys.handler, keys.batch_key.clone())).or_default().insert(id, leaf);
        self.arena[slot] = SkeletonNode::Leaf(id);
    }

    /// Runs `multi` to completion, returning the assembled result tree.
    pub fn run(mut self, multi: MultiTask) -> Result<ResultTree> {
        let root = self.seed(multi);
        let mut phase = 0usize;
        while !self.batches.is_empty() {
            phase += 1;
            if let Some(max) = self.config.max_phases {
                if phase > max {
                    return Err(Error::PhaseLimitExceeded(max));
                }
            }
            log::debug!(
                "phase {phase}: dispatching {} batch(es), {} pending progression(s)",
                self.batches.len(),
                self.pending_progressions.len()
            );
            self.dispatch_phase()?;
            if self.pending_progressions.is_empty() {
                break;
            }
            self.advance_progressions();
        }
        Ok(self.prepare_response(root))
    }

    fn dispatch_phase(&mut self) -> Result<()> {
        let batches = std::mem::take(&mut self.batches);
        for ((handler_id, batch_key), tasks) in batches {
            log::trace!("dispatching handler={handler_id} batch_key={batch_key:?} task_count={}", tasks.len());
            let handler = self.handlers.get(handler_id).ok_or_else(|| {
                log::warn!("no handler registered for {handler_id}");
                Error::HandlerNotRegistered(handler_id.to_string())
            })?;
            let ids: Vec<TaskId> = tasks.keys().copied().collect();
            let mut batch_results = HashMap::new();
            handler.execute_batch(&batch_key, tasks, &mut batch_results)?;
            for id in ids {
                let value = batch_results.remove(&id).ok_or_else(|| {
                    log::warn!("handler {handler_id} did not produce a result for {id}");
                    Error::MissingResult { handler: handler_id.to_string(), task_id: id.0 }
                })?;
                self.results.insert(id, Some(value));
            }
        }
        Ok(())
    }

    /// Runs every progression whose base task_id resolved this phase.
    ///
    /// A base's result is read non-destructively (cloned) rather than taken: the same
    /// task_id may still be needed elsewhere — by another slot that dedups directly to it,
    /// or by a second progression that shares the same coalesced base — and those readers
    /// must still see the real value once this one has run.
    fn advance_progressions(&mut self) {
        let progressions = std::mem::take(&mut self.pending_progressions);
        for (id, pendings) in progressions {
            let value = self
                .results
                .get(&id)
                .cloned()
                .flatten()
                .expect("a pending progression's base task must already have a result");
            for PendingProgression { slot, progression } in pendings {
                match progression(value.clone()) {
                    Some(next) => {
                        let new_id = self.next_task_id();
                        self.schedule_into(slot, new_id, next);
                    }
                    None => {
                        // Nil must resolve only for this slot, not for the shared base
                        // task_id (which other slots or progressions may still need), so a
                        // fresh id carries the nil result instead of mutating `id` itself.
                        let nil_id = self.next_task_id();
                        self.results.insert(nil_id, None);
                        self.arena[slot] = SkeletonNode::Leaf(nil_id);
                    }
                }
            }
        }
    }

    fn prepare_response(&mut self, slot: usize) -> ResultTree {
        match &self.arena[slot] {
            SkeletonNode::Leaf(id) => {
                let id = *id;
                ResultTree::Leaf(self.results.get(&id).cloned().flatten())
            }
            SkeletonNode::Branch(children) => {
                let children: Vec<(CallerKey, usize)> = children.iter().map(|(k, &v)| (k.clone(), v)).collect();
                let mut out = HashMap::new();
                for (key, child_slot) in children {
                    out.insert(key, self.prepare_response(child_slot));
                }
                ResultTree::Branch(out)
            }
        }
    }
}
