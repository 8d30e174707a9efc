//! This crate exposes an ordered container built on an unbalanced Binary
//! Search Tree (BST) whose nodes know their parent.
//!
//! ## Binary Search Tree
//!
//! A Binary Search Tree is a data structure supporting operations to
//! insert, find, and delete stored items. BSTs are typically defined
//! recursively using the notion of a `Node`. A `Node` stores an item and
//! will sometimes have child `Node`s. The most important invariants of a
//! BST are:
//!
//! 1. For every `Node` in a BST, all the `Node`s in its left subtree hold an
//!    item ordered before its own item.
//! 2. For every `Node` in a BST, all the `Node`s in its right subtree hold an
//!    item ordered after its own item.
//!
//! > Note that some `Node`s have no children. These `Node`s are called "leaf nodes".
//!
//! Searching takes `O(height)` (where `height` is the longest path from the
//! root `Node` to a leaf `Node`). This tree doesn't rebalance itself so the
//! height depends on insertion order: random orders give `O(lg N)` but sorted
//! input gives a height of `N`. Nothing in the crate recurses, so even those
//! degenerate trees can be built, walked, and dropped safely.
//!
//! ## Parent pointers
//!
//! Every `Node` also points back at its parent. That lets [`Tree::successor`],
//! [`Tree::predecessor`], and [`Iter`] move between neighbors by following
//! links alone, without comparing items or keeping a stack.
//!
//! ## Policies
//!
//! The order of the items comes from a comparator ([`Tree::with_compare`],
//! [`Tree::set_compare`]); items leaving the tree can be handed to a cleanup
//! callback ([`Tree::with_destroy`], [`Tree::set_destroy`]); and
//! [`ConflictPolicy`] chooses between replacing and rejecting an item equal to
//! one already stored.

#![deny(missing_docs, clippy::clone_on_ref_ptr)]

mod error;
mod iter;
mod node;
mod policy;
mod teardown;
mod tree;

pub use error::{InsertError, TreeError};
pub use iter::Iter;
pub use policy::{CompareFn, ConflictPolicy, DestroyFn};
pub use tree::Tree;
