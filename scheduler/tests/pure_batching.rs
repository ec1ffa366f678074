//! Flat batching/coalescing and batching across a nested task tree.

use scheduler::{MultiTask, Value};
use tasks::echo;

#[test]
fn test_three_tasks_two_of_which_share_a_dedup_key_coalesce_into_one_dispatch() {
    let mut multi = MultiTask::new();
    multi.add("a", echo(1)).unwrap();
    multi.add("b", echo(2)).unwrap();
    multi.add("c", echo(1)).unwrap();

    let descriptors = multi.batches_for_debugging();
    assert_eq!(descriptors.len(), 1, "Echo tasks all share one handler and batch key");
    assert_eq!(descriptors[0].task_ids.len(), 2, "a and c dedup to a single task_id");
}

#[test]
fn test_coalesced_siblings_observe_the_same_result() {
    let mut multi = MultiTask::new();
    multi.add("a", echo(1)).unwrap();
    multi.add("b", echo(2)).unwrap();
    multi.add("c", echo(1)).unwrap();

    let tree = multi.execute().unwrap();
    let branch = tree.as_branch().unwrap();
    let a = branch["a"].as_leaf().unwrap().as_ref().unwrap().downcast_ref::<u64>();
    let b = branch["b"].as_leaf().unwrap().as_ref().unwrap().downcast_ref::<u64>();
    let c = branch["c"].as_leaf().unwrap().as_ref().unwrap().downcast_ref::<u64>();
    assert_eq!(a, Some(&1));
    assert_eq!(b, Some(&2));
    assert_eq!(c, Some(&1));
    assert_eq!(a, c, "a and c were coalesced, so their results are identical");
}

#[test]
fn test_nested_multi_tasks_keep_their_shape_and_all_distinct_handlers_run() {
    use scheduler::simple;

    let mut inner = MultiTask::new();
    inner.add("p", echo(2)).unwrap();
    inner.add("q", echo(3)).unwrap();

    let mut outer = MultiTask::new();
    outer.add("x", simple(|| Value::new(1u64))).unwrap();
    outer.add("y", inner).unwrap();

    let tree = outer.execute().unwrap();
    let branch = tree.as_branch().unwrap();

    let x = branch["x"].as_leaf().unwrap().as_ref().unwrap().downcast_ref::<u64>();
    assert_eq!(x, Some(&1));

    let y = branch["y"].as_branch().unwrap();
    let p = y["p"].as_leaf().unwrap().as_ref().unwrap().downcast_ref::<u64>();
    let q = y["q"].as_leaf().unwrap().as_ref().unwrap().downcast_ref::<u64>();
    assert_eq!(p, Some(&2));
    assert_eq!(q, Some(&3));
}
