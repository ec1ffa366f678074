//! A two-stage chain: resolve a name to a user id, then fetch that id's record. One
//! caller's sequence shares its second step with another caller's direct `Fetch`, so the
//! id lookup and the record fetch each run at most once across both phases.

use scheduler::{sequence, MultiTask};
use tasks::{fetch, lookup};

fn main() {
    env_logger::init();

    let mut multi = MultiTask::new();
    multi
        .add(
            "resolved",
            sequence(lookup("alice"), |uid| {
                let uid = uid.downcast::<u64>().unwrap();
                Some(fetch(uid))
            })
            .unwrap(),
        )
        .unwrap();
    multi.add("direct", fetch(7)).unwrap();

    let tree = multi.execute().unwrap();
    let branch = tree.as_branch().unwrap();
    for key in ["resolved", "direct"] {
        let user = branch[key].as_leaf().unwrap().as_ref().unwrap().downcast_ref::<tasks::User>().unwrap();
        println!("{key} => {user:?}");
    }
}
