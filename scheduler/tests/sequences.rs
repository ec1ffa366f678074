//! Sequencing, cross-phase coalescing, early termination, and chained sequences.

use scheduler::{sequence, simple, MultiTask, Value};
use tasks::{fetch, lookup, User};

#[test]
fn test_a_two_step_lookup_then_fetch_resolves_across_two_phases() {
    let seq = sequence(lookup("alice"), |uid| {
        let uid = uid.downcast::<u64>().unwrap();
        Some(fetch(uid))
    })
    .unwrap();

    let value = seq.execute().unwrap().unwrap();
    let user = value.downcast::<User>().unwrap();
    assert_eq!(user, User { id: 42, name: "alice".to_string() });
}

#[test]
fn test_a_sequence_result_coalesces_with_an_already_scheduled_sibling() {
    let mut multi = MultiTask::new();
    multi
        .add(
            "a",
            sequence(lookup("bob"), |uid| {
                let uid = uid.downcast::<u64>().unwrap();
                Some(fetch(uid))
            })
            .unwrap(),
        )
        .unwrap();
    multi.add("b", fetch(7)).unwrap();

    let tree = multi.execute().unwrap();
    let branch = tree.as_branch().unwrap();
    let a = branch["a"].as_leaf().unwrap().as_ref().unwrap().downcast_ref::<User>();
    let b = branch["b"].as_leaf().unwrap().as_ref().unwrap().downcast_ref::<User>();
    assert_eq!(a, Some(&User { id: 7, name: "bob".to_string() }));
    assert_eq!(a, b, "bob's uid (7) is the same Fetch as b, so they coalesce");
}

#[test]
fn test_a_progression_returning_nothing_resolves_to_a_nil_leaf() {
    let seq = sequence(simple(|| Value::new(1u64)), |_| None).unwrap();
    let result = seq.execute().unwrap();
    assert!(result.is_none());
}

#[test]
fn test_a_nil_progression_inside_a_multi_task_leaves_an_empty_leaf_without_disturbing_siblings() {
    let mut multi = MultiTask::new();
    multi.add("a", sequence(simple(|| Value::new(1u64)), |_| None).unwrap()).unwrap();
    multi.add("b", simple(|| Value::new(2u64))).unwrap();

    let tree = multi.execute().unwrap();
    let branch = tree.as_branch().unwrap();
    assert!(branch["a"].as_leaf().unwrap().is_none());
    assert_eq!(branch["b"].as_leaf().unwrap().as_ref().unwrap().downcast_ref::<u64>(), Some(&2));
}

#[test]
fn test_chained_sequences_run_in_three_phases_and_thread_values_through() {
    let seq = sequence(simple(|| Value::new(2u64)), |a| {
        let a = a.downcast::<u64>().unwrap();
        Some(
            sequence(simple(|| Value::new(3u64)), move |b| {
                let b = b.downcast::<u64>().unwrap();
                Some(simple(move || Value::new(a + b)))
            })
            .unwrap(),
        )
    })
    .unwrap();

    let value = seq.execute().unwrap().unwrap();
    assert_eq!(value.downcast::<u64>().unwrap(), 5);
}

#[test]
fn test_a_sequence_base_that_dedups_with_a_plain_sibling_does_not_orphan_its_progression() {
    // Regression test for the maintainer-reported panic: "bob" is looked up both plainly
    // and as the base of a chained Fetch. Whichever caller key the scheduler visits first,
    // the chained sibling's progression must still fire against the shared Lookup result.
    let mut multi = MultiTask::new();
    multi.add("plain", lookup("bob")).unwrap();
    multi
        .add(
            "chained",
            sequence(lookup("bob"), |uid| {
                let uid = uid.downcast::<u64>().unwrap();
                Some(fetch(uid))
            })
            .unwrap(),
        )
        .unwrap();

    let tree = multi.execute().unwrap();
    let branch = tree.as_branch().unwrap();
    let plain = branch["plain"].as_leaf().unwrap().as_ref().unwrap().downcast_ref::<u64>();
    let chained = branch["chained"].as_leaf().unwrap().as_ref().unwrap().downcast_ref::<User>();
    assert_eq!(plain, Some(&7));
    assert_eq!(chained, Some(&User { id: 7, name: "bob".to_string() }));
}

#[test]
fn test_a_sequence_base_that_dedups_with_a_plain_sibling_in_the_other_order_does_not_orphan_its_progression() {
    // Same scenario with the caller keys swapped, to confirm the fix doesn't depend on
    // HashMap iteration order landing the plain sibling first.
    let mut multi = MultiTask::new();
    multi
        .add(
            "chained",
            sequence(lookup("bob"), |uid| {
                let uid = uid.downcast::<u64>().unwrap();
                Some(fetch(uid))
            })
            .unwrap(),
        )
        .unwrap();
    multi.add("plain", lookup("bob")).unwrap();

    let tree = multi.execute().unwrap();
    let branch = tree.as_branch().unwrap();
    let plain = branch["plain"].as_leaf().unwrap().as_ref().unwrap().downcast_ref::<u64>();
    let chained = branch["chained"].as_leaf().unwrap().as_ref().unwrap().downcast_ref::<User>();
    assert_eq!(plain, Some(&7));
    assert_eq!(chained, Some(&User { id: 7, name: "bob".to_string() }));
}
