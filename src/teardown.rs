//! Freeing a whole tree without recursing.
//!
//! The tree isn't balanced so its height can be as large as its length. Dropping it recursively
//! would overflow the call stack on something as simple as inserting `0..100_000` in order, so
//! this walks the tree in post-order with a heap allocated stack instead.

use crate::node::{Link, Node};

/// Frees every node below (and including) `root`, passing each item to `release` exactly once.
/// `root` is empty afterwards. Returns how many nodes were freed.
///
/// The stack holds pointers to *slots* (the root link or a child link) rather than to nodes: once
/// a node is freed the slot that pointed to it is cleared so that its parent sees one child fewer
/// the next time it reaches the top of the stack.
pub(crate) fn teardown<T>(root: &mut Link<T>, mut release: impl FnMut(T)) -> usize {
    if !root.is_some() {
        return 0;
    }

    let mut freed = 0;
    let mut stack: Vec<*mut Link<T>> = vec![root as *mut Link<T>];
    while let Some(&top) = stack.last() {
        // SAFETY: A slot is either `root`, which outlives this function, or a child link of a
        // node further down the stack. A node is only freed once both of its child slots have been
        // cleared and popped, so every slot on the stack is still alive.
        let slot = unsafe { &mut *top };
        let Some(node) = slot.node_mut() else {
            stack.pop();
            continue;
        };

        if node.left.is_some() {
            stack.push(&mut node.left);
        } else if node.right.is_some() {
            stack.push(&mut node.right);
        } else if let Some(ptr) = slot.take().0 {
            // SAFETY: The node is a leaf now and `slot` was the only link owning it. Its children
            // are gone and its parent won't look at it again since `slot` is now empty.
            release(unsafe { Node::into_item(ptr) });
            freed += 1;
            stack.pop();
        }
    }
    freed
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds a right leaning chain `0 -> 1 -> ... -> len - 1` by hand.
    fn chain(len: usize) -> Link<usize> {
        let mut root = Link::NONE;
        let mut last: Link<usize> = Link::NONE;
        for i in 0..len {
            let node = Link(Some(Node::new(i, last)));
            match last.node_mut() {
                Some(parent) => parent.right = node,
                None => root = node,
            }
            last = node;
        }
        root
    }

    #[test]
    fn empty_tree_frees_nothing() {
        let mut root = Link::<usize>::NONE;
        assert_eq!(teardown(&mut root, |_| panic!("nothing to release")), 0);
    }

    #[test]
    fn releases_every_item_once() {
        let mut root = chain(10);
        let mut released = Vec::new();

        assert_eq!(teardown(&mut root, |item| released.push(item)), 10);
        assert!(!root.is_some());

        // Post-order on a right leaning chain frees the deepest node first.
        assert_eq!(released, (0..10).rev().collect::<Vec<_>>());
    }

    #[test]
    fn deep_chain_does_not_overflow() {
        let mut root = chain(200_000);
        assert_eq!(teardown(&mut root, drop), 200_000);
    }
}
