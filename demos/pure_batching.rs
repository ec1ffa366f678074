//! Three callers ask for the same handful of echoes; the scheduler collapses the
//! duplicate into one dispatched task and reports the coalesced result back to both
//! callers that asked for it.

use scheduler::MultiTask;
use tasks::echo;

fn main() {
    env_logger::init();

    let mut multi = MultiTask::new();
    multi.add("first", echo(1)).unwrap();
    multi.add("second", echo(2)).unwrap();
    multi.add("third", echo(1)).unwrap();

    println!("first phase would dispatch:");
    for descriptor in multi.batches_for_debugging() {
        println!("  {} / {:?}: {} task(s)", descriptor.handler, descriptor.batch_key, descriptor.task_ids.len());
    }

    let mut multi = MultiTask::new();
    multi.add("first", echo(1)).unwrap();
    multi.add("second", echo(2)).unwrap();
    multi.add("third", echo(1)).unwrap();

    let tree = multi.execute().unwrap();
    let branch = tree.as_branch().unwrap();
    for key in ["first", "second", "third"] {
        let value = branch[key].as_leaf().unwrap().as_ref().unwrap().downcast_ref::<u64>().unwrap();
        println!("{key} => {value}");
    }
}
