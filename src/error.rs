//! Errors returned by [`Tree`][crate::Tree] operations.

/// Errors from lookups and removals. None of these leave the tree modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// No stored item compares equal to the requested one, or the requested neighbor doesn't
    /// exist.
    #[error("no matching item in the tree")]
    NotFound,
    /// The tree has no items so it has no minimum or maximum.
    #[error("the tree is empty")]
    EmptyTree,
}

/// Errors from [`Tree::insert`][crate::Tree::insert]. The item that couldn't be inserted is
/// handed back so the caller still owns it.
#[derive(Debug, thiserror::Error)]
pub enum InsertError<T> {
    /// Allocating the new node failed. The tree is unchanged.
    #[error("out of memory allocating a tree node")]
    OutOfMemory(T),
    /// An item of equal order is already stored and the tree rejects conflicts. See
    /// [`ConflictPolicy::Reject`][crate::ConflictPolicy::Reject].
    #[error("an item of equal order is already stored")]
    Conflict(T),
}

impl<T> InsertError<T> {
    /// Gives back the item that wasn't inserted.
    pub fn into_item(self) -> T {
        match self {
            Self::OutOfMemory(item) | Self::Conflict(item) => item,
        }
    }
}
