//! The strategies a [`Tree`][crate::Tree] is configured with.
//!
//! A tree orders its items with a comparator, hands released items to an optional cleanup
//! callback and decides what to do with an inserted item that compares equal to a stored one.

use std::cmp::Ordering;

/// The default comparator type. Any non-capturing closure coerces to it, so a tree using it can
/// swap comparators at runtime with [`Tree::set_compare`][crate::Tree::set_compare].
pub type CompareFn<T> = fn(&T, &T) -> Ordering;

/// The default cleanup callback type. Like [`CompareFn`], any non-capturing closure coerces to
/// it.
pub type DestroyFn<T> = fn(T);

/// What [`Tree::insert`][crate::Tree::insert] does when the tree already stores an item that
/// compares equal to the new one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Release the stored item and keep the new one in its place (upsert). The tree's shape and
    /// length don't change.
    #[default]
    Replace,
    /// Leave the stored item alone and return the new one in
    /// [`InsertError::Conflict`][crate::InsertError::Conflict].
    Reject,
}

/// Hands `item` to the cleanup callback if there is one, otherwise just drops it.
pub(crate) fn release<T, D>(destroy: &mut Option<D>, item: T)
where
    D: FnMut(T),
{
    match destroy {
        Some(destroy) => destroy(item),
        None => drop(item),
    }
}
