use ordtree::{ConflictPolicy, InsertError, Tree, TreeError};
use quickcheck_macros::quickcheck;

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::rc::Rc;

use crate::Op;

/// Applies a set of operations to a tree and a set.
/// This way we can ensure that after a random smattering of inserts
/// and deletes we have the same items in both.
fn do_ops<T>(ops: &[Op<T>], tree: &mut Tree<T>, set: &mut BTreeSet<T>)
where
    T: Ord + Clone + fmt::Debug,
{
    for op in ops {
        match op {
            Op::Insert(x) => {
                tree.insert(x.clone()).unwrap();
                set.insert(x.clone());
            }
            Op::Remove(x) => {
                let removed = tree.delete(x).is_ok();
                assert_eq!(removed, set.remove(x));
            }
        }
    }
}

#[quickcheck]
fn fuzz_multiple_operations_i8(ops: Vec<Op<i8>>) -> bool {
    let mut tree = Tree::new();
    let mut set = BTreeSet::new();

    do_ops(&ops, &mut tree, &mut set);
    tree.is_valid() && tree.len() == set.len() && tree.iter().eq(set.iter())
}

#[quickcheck]
fn contains(xs: Vec<i8>) -> bool {
    let tree: Tree<i8> = xs.iter().copied().collect();

    xs.iter().all(|x| tree.search(x) == Ok(x))
}

#[quickcheck]
fn contains_not(xs: Vec<i8>, nots: Vec<i8>) -> bool {
    let tree: Tree<i8> = xs.iter().copied().collect();
    let added: HashSet<_> = xs.into_iter().collect();
    let nots: HashSet<_> = nots.into_iter().collect();
    let mut nots = nots.difference(&added);

    nots.all(|x| tree.search(x) == Err(TreeError::NotFound))
}

#[quickcheck]
fn with_deletions(xs: Vec<i8>, deletes: Vec<i8>) -> bool {
    let mut tree: Tree<i8> = xs.iter().copied().collect();
    for delete in &deletes {
        let _ = tree.delete(delete);
    }

    let mut still_present = xs;
    for delete in &deletes {
        // We may have inserted the same value multiple times - delete each one.
        while let Some(pos) = still_present.iter().position(|x| x == delete) {
            still_present.swap_remove(pos);
        }
    }

    deletes.iter().all(|x| tree.search(x).is_err())
        && still_present.iter().all(|x| tree.search(x).is_ok())
        && tree.is_valid()
}

#[quickcheck]
fn delete_miss_changes_nothing(xs: Vec<i8>, miss: i8) -> bool {
    let mut tree: Tree<i8> = xs.iter().copied().filter(|x| *x != miss).collect();
    let before: Vec<_> = tree.iter().copied().collect();

    tree.delete(&miss) == Err(TreeError::NotFound)
        && tree.len() == before.len()
        && tree.iter().copied().eq(before)
}

#[quickcheck]
fn size_counts_distinct_items(xs: Vec<u8>) -> bool {
    let tree: Tree<u8> = xs.iter().copied().collect();
    let distinct: BTreeSet<_> = xs.into_iter().collect();

    tree.len() == distinct.len()
}

#[quickcheck]
fn neighbors_match_sorted_order(xs: Vec<i16>) -> bool {
    let tree: Tree<i16> = xs.iter().copied().collect();
    let sorted: Vec<_> = xs.into_iter().collect::<BTreeSet<_>>().into_iter().collect();

    let inner = sorted.windows(2).all(|pair| {
        tree.successor(&pair[0]) == Ok(&pair[1]) && tree.predecessor(&pair[1]) == Ok(&pair[0])
    });
    let ends = match (sorted.first(), sorted.last()) {
        (Some(first), Some(last)) => {
            tree.minimum() == Ok(first)
                && tree.maximum() == Ok(last)
                && tree.predecessor(first) == Err(TreeError::NotFound)
                && tree.successor(last) == Err(TreeError::NotFound)
        }
        _ => tree.minimum() == Err(TreeError::EmptyTree),
    };
    inner && ends
}

#[quickcheck]
fn upsert_keeps_latest_value(pairs: Vec<(u8, i32)>) -> bool {
    let mut tree = Tree::with_compare(|a: &(u8, i32), b: &(u8, i32)| a.0.cmp(&b.0));
    let mut map = BTreeMap::new();
    for (k, v) in pairs {
        tree.insert((k, v)).unwrap();
        map.insert(k, v);
    }

    tree.len() == map.len()
        && map
            .iter()
            .all(|(k, v)| tree.search(&(*k, 0)) == Ok(&(*k, *v)))
}

#[quickcheck]
fn reject_keeps_first_value(pairs: Vec<(u8, i32)>) -> bool {
    let mut tree = Tree::with_compare(|a: &(u8, i32), b: &(u8, i32)| a.0.cmp(&b.0))
        .with_conflict_policy(ConflictPolicy::Reject);
    let mut map = BTreeMap::new();
    for (k, v) in pairs {
        let inserted = match tree.insert((k, v)) {
            Ok(()) => true,
            Err(InsertError::Conflict(item)) => {
                assert_eq!(item, (k, v));
                false
            }
            Err(InsertError::OutOfMemory(_)) => panic!("out of memory"),
        };
        assert_eq!(inserted, !map.contains_key(&k));
        map.entry(k).or_insert(v);
    }

    map.iter()
        .all(|(k, v)| tree.search(&(*k, 0)) == Ok(&(*k, *v)))
}

#[quickcheck]
fn every_item_released_once(xs: Vec<u8>, deletes: Vec<u8>) -> bool {
    let released = Rc::new(RefCell::new(Vec::new()));
    {
        let sink = Rc::clone(&released);
        let mut tree = Tree::new().with_destroy(move |item| sink.borrow_mut().push(item));
        for x in &xs {
            tree.insert(*x).unwrap();
        }
        for delete in &deletes {
            let _ = tree.delete(delete);
        }
    }

    // Everything inserted is released exactly once: replaced duplicates on upsert, deleted items
    // on delete, and the rest on drop.
    let mut released = released.take();
    let mut inserted = xs;
    released.sort_unstable();
    inserted.sort_unstable();
    released == inserted
}

#[test]
fn ascending_inserts_then_drop() {
    let mut tree = Tree::new();
    for x in 0..10_000u32 {
        tree.insert(x).unwrap();
    }
    assert_eq!(tree.len(), 10_000);
    assert_eq!(tree.minimum(), Ok(&0));
    assert_eq!(tree.iter().rev().next(), Some(&9_999));
    drop(tree);
}

#[test]
fn descending_inserts_then_clear() {
    let mut tree = Tree::new();
    for x in (0..10_000u32).rev() {
        tree.insert(x).unwrap();
    }
    tree.clear();
    assert!(tree.is_empty());
    assert_eq!(tree.maximum(), Err(TreeError::EmptyTree));
}
