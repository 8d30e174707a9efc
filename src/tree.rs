//! An unbalanced BST whose nodes keep a pointer to their parent. This is what makes successor and
//! predecessor queries possible without a stack, at the price of some unsafe pointer juggling.
//!
//! # Examples
//!
//! ```
//! use ordtree::{Tree, TreeError};
//!
//! let mut tree = Tree::new();
//!
//! // Nothing in here yet.
//! assert_eq!(tree.search(&1), Err(TreeError::NotFound));
//! assert_eq!(tree.minimum(), Err(TreeError::EmptyTree));
//!
//! for item in [4, 2, 6, 1, 3, 5, 7] {
//!     tree.insert(item).unwrap();
//! }
//! assert_eq!(tree.len(), 7);
//! assert_eq!(tree.search(&3), Ok(&3));
//!
//! // Neighbors are found by following links, not by comparing.
//! assert_eq!(tree.successor(&2), Ok(&3));
//! assert_eq!(tree.predecessor(&2), Ok(&1));
//! assert_eq!(tree.successor(&7), Err(TreeError::NotFound));
//!
//! // Deleting a node with two children moves its successor's item up.
//! tree.delete(&4).unwrap();
//! assert_eq!(tree.predecessor(&6), Ok(&5));
//! assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [1, 2, 3, 5, 6, 7]);
//! ```

use std::alloc::{handle_alloc_error, Layout};
use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;
use std::mem::{self, ManuallyDrop};
use std::ptr::{self, NonNull};

use crate::error::{InsertError, TreeError};
use crate::iter::Iter;
use crate::node::{Link, Node};
use crate::policy::{self, CompareFn, ConflictPolicy, DestroyFn};
use crate::teardown::teardown;

/// A Binary Search Tree storing items under a comparator `C`. Released items are handed to the
/// cleanup callback `D` if one is set.
///
/// The tree never rebalances. Inserting items in sorted order produces a tree as deep as it is
/// long, which makes most operations `O(len)`; every operation is a loop so this costs time but
/// never call stack.
pub struct Tree<T, C = CompareFn<T>, D = DestroyFn<T>>
where
    D: FnMut(T),
{
    root: Link<T>,
    len: usize,
    compare: C,
    destroy: Option<D>,
    conflict: ConflictPolicy,
    _owns: PhantomData<Box<Node<T>>>,
}

// SAFETY: The tree exclusively owns every node, just like a `Box` would, so sending or sharing it
// is exactly as safe as sending or sharing its items and policies.
unsafe impl<T: Send, C: Send, D: Send + FnMut(T)> Send for Tree<T, C, D> {}
unsafe impl<T: Sync, C: Sync, D: Sync + FnMut(T)> Sync for Tree<T, C, D> {}

impl<T: Ord> Default for Tree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, C, D> Drop for Tree<T, C, D>
where
    D: FnMut(T),
{
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T, C, D> Clone for Tree<T, C, D>
where
    T: Clone,
    C: Clone,
    D: Clone + FnMut(T),
{
    /// Copies the tree node for node so the clone has the same shape as `self`.
    fn clone(&self) -> Self {
        // Built inside a `Tree` so a panicking `T::clone` still frees what was copied so far.
        let mut tree = Self {
            root: Link::NONE,
            len: 0,
            compare: self.compare.clone(),
            destroy: self.destroy.clone(),
            conflict: self.conflict,
            _owns: PhantomData,
        };
        let Some(root) = self.root.node() else {
            return tree;
        };
        tree.root = Link(Some(Node::new(root.item.clone(), Link::NONE)));

        let mut stack = vec![(self.root, tree.root)];
        while let Some((source, mut copy)) = stack.pop() {
            let parent = copy;
            let (Some(source), Some(copy)) = (source.node(), copy.node_mut()) else {
                continue;
            };
            if let Some(left) = source.left.node() {
                copy.left = Link(Some(Node::new(left.item.clone(), parent)));
                stack.push((source.left, copy.left));
            }
            if let Some(right) = source.right.node() {
                copy.right = Link(Some(Node::new(right.item.clone(), parent)));
                stack.push((source.right, copy.right));
            }
        }
        tree.len = self.len;
        tree
    }
}

impl<T, C, D> fmt::Debug for Tree<T, C, D>
where
    T: fmt::Debug,
    D: FnMut(T),
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<'a, T, C, D> IntoIterator for &'a Tree<T, C, D>
where
    D: FnMut(T),
{
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, C, D> Extend<T> for Tree<T, C, D>
where
    C: Fn(&T, &T) -> Ordering,
    D: FnMut(T),
{
    /// Inserts every item. Items rejected by [`ConflictPolicy::Reject`] are dropped and running
    /// out of memory aborts, like the standard collections.
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            if let Err(InsertError::OutOfMemory(_)) = self.insert(item) {
                handle_alloc_error(Layout::new::<Node<T>>());
            }
        }
    }
}

impl<T: Ord> FromIterator<T> for Tree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<T: Ord> Tree<T> {
    /// Generate a new, empty `Tree` ordered by `T`'s [`Ord`] implementation.
    pub fn new() -> Self {
        Self::with_compare(T::cmp)
    }
}

impl<T, C> Tree<T, C>
where
    C: Fn(&T, &T) -> Ordering,
{
    /// Generate a new, empty `Tree` ordered by `compare`, which must be a total order over every
    /// item that will be inserted.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::Tree;
    ///
    /// let mut tree = Tree::with_compare(|a: &i32, b: &i32| b.cmp(a));
    /// tree.extend([1, 3, 2]);
    ///
    /// assert_eq!(tree.minimum(), Ok(&3));
    /// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), [3, 2, 1]);
    /// ```
    pub fn with_compare(compare: C) -> Self {
        Self {
            root: Link::NONE,
            len: 0,
            compare,
            destroy: None,
            conflict: ConflictPolicy::default(),
            _owns: PhantomData,
        }
    }
}

impl<T, C, D> Tree<T, C, D>
where
    D: FnMut(T),
{
    /// Replaces the cleanup callback with `destroy`, which may be any closure. Items already in
    /// the tree will be released through it too.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::cell::RefCell;
    /// use ordtree::Tree;
    ///
    /// let released = RefCell::new(Vec::new());
    /// {
    ///     let mut tree = Tree::new().with_destroy(|item| released.borrow_mut().push(item));
    ///     tree.extend([2, 1, 3]);
    ///     tree.delete(&2).unwrap();
    /// }
    ///
    /// let mut released = released.into_inner();
    /// released.sort();
    /// assert_eq!(released, [1, 2, 3]);
    /// ```
    pub fn with_destroy<E>(self, destroy: E) -> Tree<T, C, E>
    where
        E: FnMut(T),
    {
        let mut this = ManuallyDrop::new(self);
        let root = this.root.take();
        // SAFETY: `this` is never dropped or used after these reads so `compare` and the old
        // callback are each moved out exactly once.
        let (compare, old_destroy) =
            unsafe { (ptr::read(&this.compare), ptr::read(&this.destroy)) };
        drop(old_destroy);

        Tree {
            root,
            len: this.len,
            compare,
            destroy: Some(destroy),
            conflict: this.conflict,
            _owns: PhantomData,
        }
    }

    /// Sets what [`Tree::insert`] does with an item equal to one already stored.
    pub fn with_conflict_policy(mut self, conflict: ConflictPolicy) -> Self {
        self.conflict = conflict;
        self
    }

    /// The number of items in the tree.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree has no items.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The current conflict policy.
    pub fn conflict_policy(&self) -> ConflictPolicy {
        self.conflict
    }

    /// Changes what [`Tree::insert`] does with an item equal to one already stored. Items already
    /// in the tree are unaffected.
    pub fn set_conflict_policy(&mut self, conflict: ConflictPolicy) {
        self.conflict = conflict;
    }

    /// Replaces the comparator.
    ///
    /// The new comparator must have the same type `C` as the old one. With the default
    /// [`CompareFn`] any non-capturing closure or `fn` fits, but a tree built by
    /// [`Tree::with_compare`] from a closure can only ever be given that same closure type, so
    /// swapping comparators at runtime needs a `fn` comparator.
    ///
    /// The tree doesn't reorder itself. Replacing the comparator of a non-empty tree is only
    /// sound if the new one orders the stored items exactly like the old one did; otherwise later
    /// lookups silently miss.
    pub fn set_compare(&mut self, compare: C) {
        if !self.is_empty() {
            log::warn!(
                "replacing the comparator of a tree holding {} items without reordering it",
                self.len
            );
        }
        self.compare = compare;
    }

    /// Replaces the cleanup callback. Every item released from now on, including those already
    /// stored, is passed to `destroy`.
    pub fn set_destroy(&mut self, destroy: D) {
        self.destroy = Some(destroy);
    }

    /// The smallest item.
    pub fn minimum(&self) -> Result<&T, TreeError> {
        self.item_at(self.root.minimum()).ok_or(TreeError::EmptyTree)
    }

    /// The largest item.
    pub fn maximum(&self) -> Result<&T, TreeError> {
        self.item_at(self.root.maximum()).ok_or(TreeError::EmptyTree)
    }

    /// Iterates over the items in ascending order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter::new(self.root, self.len)
    }

    /// Removes every item, passing each to the cleanup callback.
    pub fn clear(&mut self) {
        let destroy = &mut self.destroy;
        let freed = teardown(&mut self.root, |item| policy::release(destroy, item));
        if freed > 0 {
            log::trace!("tore down {} nodes", freed);
        }
        self.len = 0;
    }

    fn node_at(&self, link: Link<T>) -> Option<&Node<T>> {
        // SAFETY: Links handed to this come from walking down from `self.root` so they point at
        // nodes owned by `self`, which can't be freed or mutated while `self` is borrowed.
        link.0.map(|ptr| unsafe { &*ptr.as_ptr() })
    }

    fn item_at(&self, link: Link<T>) -> Option<&T> {
        self.node_at(link).map(|node| &node.item)
    }
}

impl<T, C, D> Tree<T, C, D>
where
    C: Fn(&T, &T) -> Ordering,
    D: FnMut(T),
{
    /// Inserts the given item. If an item of equal order is already stored, the conflict policy
    /// decides: by default the old item is released and replaced without changing the tree's
    /// shape.
    ///
    /// # Errors
    ///
    /// Returns the item back in [`InsertError::OutOfMemory`] if the node can't be allocated and in
    /// [`InsertError::Conflict`] if the tree rejects conflicts. The tree is unchanged in both
    /// cases.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::{ConflictPolicy, InsertError, Tree};
    ///
    /// // Order pairs by their first element only.
    /// let mut tree = Tree::with_compare(|a: &(i32, char), b: &(i32, char)| a.0.cmp(&b.0));
    ///
    /// tree.insert((1, 'a')).unwrap();
    /// tree.insert((1, 'b')).unwrap();
    /// assert_eq!(tree.search(&(1, '?')), Ok(&(1, 'b')));
    /// assert_eq!(tree.len(), 1);
    ///
    /// tree.set_conflict_policy(ConflictPolicy::Reject);
    /// let rejected = tree.insert((1, 'c')).unwrap_err();
    /// assert!(matches!(rejected, InsertError::Conflict((1, 'c'))));
    /// assert_eq!(tree.search(&(1, '?')), Ok(&(1, 'b')));
    /// ```
    pub fn insert(&mut self, item: T) -> Result<(), InsertError<T>> {
        let mut parent = Link::NONE;
        let mut went_left = false;
        let mut current = self.root;
        while let Some(node) = current.node_mut() {
            let next = match (self.compare)(&item, &node.item) {
                Ordering::Less => {
                    went_left = true;
                    node.left
                }
                Ordering::Equal => {
                    return match self.conflict {
                        ConflictPolicy::Reject => Err(InsertError::Conflict(item)),
                        ConflictPolicy::Replace => {
                            log::trace!("replacing an item of equal order");
                            let old = mem::replace(&mut node.item, item);
                            policy::release(&mut self.destroy, old);
                            Ok(())
                        }
                    };
                }
                Ordering::Greater => {
                    went_left = false;
                    node.right
                }
            };
            parent = current;
            current = next;
        }

        let new = Link(Some(
            Node::try_new(item, parent).map_err(InsertError::OutOfMemory)?,
        ));
        match parent.node_mut() {
            None => self.root = new,
            Some(parent) if went_left => parent.left = new,
            Some(parent) => parent.right = new,
        }
        self.len += 1;
        Ok(())
    }

    /// Finds the stored item that compares equal to `item`.
    ///
    /// # Errors
    ///
    /// [`TreeError::NotFound`] if there is none.
    pub fn search(&self, item: &T) -> Result<&T, TreeError> {
        self.item_at(self.find(item)).ok_or(TreeError::NotFound)
    }

    /// Whether an item comparing equal to `item` is stored.
    pub fn contains(&self, item: &T) -> bool {
        self.find(item).is_some()
    }

    /// Removes the item comparing equal to `item` and passes it to the cleanup callback.
    ///
    /// # Errors
    ///
    /// [`TreeError::NotFound`] if there is no such item. Nothing changes in that case.
    pub fn delete(&mut self, item: &T) -> Result<(), TreeError> {
        let removed = self.take(item)?;
        policy::release(&mut self.destroy, removed);
        Ok(())
    }

    /// Removes the item comparing equal to `item` and returns it. Unlike [`Tree::delete`], the
    /// cleanup callback is not called.
    ///
    /// # Errors
    ///
    /// [`TreeError::NotFound`] if there is no such item. Nothing changes in that case.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordtree::{Tree, TreeError};
    ///
    /// let mut tree: Tree<String> = ["b", "a", "c"].iter().map(|s| s.to_string()).collect();
    ///
    /// assert_eq!(tree.take(&"a".to_string()), Ok("a".to_string()));
    /// assert_eq!(tree.take(&"a".to_string()), Err(TreeError::NotFound));
    /// assert_eq!(tree.len(), 2);
    /// ```
    pub fn take(&mut self, item: &T) -> Result<T, TreeError> {
        let Some(target) = self.find(item).0 else {
            return Err(TreeError::NotFound);
        };
        Ok(self.unlink(target))
    }

    /// The next larger item after the one comparing equal to `item`.
    ///
    /// # Errors
    ///
    /// [`TreeError::NotFound`] if `item` isn't stored or is the largest item.
    pub fn successor(&self, item: &T) -> Result<&T, TreeError> {
        let node = self.find(item);
        if !node.is_some() {
            return Err(TreeError::NotFound);
        }
        self.item_at(node.successor()).ok_or(TreeError::NotFound)
    }

    /// The next smaller item before the one comparing equal to `item`.
    ///
    /// # Errors
    ///
    /// [`TreeError::NotFound`] if `item` isn't stored or is the smallest item.
    pub fn predecessor(&self, item: &T) -> Result<&T, TreeError> {
        let node = self.find(item);
        if !node.is_some() {
            return Err(TreeError::NotFound);
        }
        self.item_at(node.predecessor()).ok_or(TreeError::NotFound)
    }

    /// Checks the whole structure: items strictly increase in order, every child points back at
    /// its parent and the number of nodes matches [`Tree::len`].
    ///
    /// This is `O(len)` and meant for tests and debugging.
    pub fn is_valid(&self) -> bool {
        if self.node_at(self.root).map_or(false, |root| root.parent.is_some()) {
            return false;
        }

        let mut stack = Vec::new();
        let mut current = self.root;
        let mut previous: Option<&T> = None;
        let mut visited = 0;
        loop {
            if let Some(node) = self.node_at(current) {
                for child in [node.left, node.right] {
                    if self.node_at(child).map_or(false, |c| c.parent != current) {
                        return false;
                    }
                }
                stack.push(current);
                current = node.left;
                continue;
            }

            let Some(node) = stack.pop().and_then(|link| self.node_at(link)) else {
                break;
            };
            if let Some(previous) = previous {
                if (self.compare)(previous, &node.item) != Ordering::Less {
                    return false;
                }
            }
            previous = Some(&node.item);
            visited += 1;
            current = node.right;
        }
        visited == self.len
    }

    /// Walks down from the root to the node holding an item equal to `item`. Returns an empty link
    /// if there is none.
    fn find(&self, item: &T) -> Link<T> {
        let mut current = self.root;
        while let Some(node) = self.node_at(current) {
            current = match (self.compare)(item, &node.item) {
                Ordering::Less => node.left,
                Ordering::Equal => break,
                Ordering::Greater => node.right,
            };
        }
        current
    }

    /// Removes `target` from the tree and returns the item it held.
    ///
    /// ```text
    /// no children      one child        two children: successor(4) = 5
    ///
    ///    (2)              (2)               (4)              (5)
    ///   /   \    ->      /   \     ->      /   \    ->      /   \
    /// (1)   [3]        (1)   [3]         (2)   (6)        (2)   (6)
    ///                          \               /  \               \
    ///                          (4)           (5)  (7)             (7)
    /// ```
    ///
    /// With two children the successor's node is the one freed. Its item moves into `target`.
    fn unlink(&mut self, target: NonNull<Node<T>>) -> T {
        let link = Link(Some(target));
        let has_two_children = self
            .node_at(link)
            .map_or(false, |n| n.left.is_some() && n.right.is_some());
        let successor = if has_two_children {
            link.successor().0
        } else {
            None
        };

        let removed = match successor {
            Some(successor) => {
                // SAFETY: The successor of a node with a right subtree is the minimum of that
                // subtree, so it has no left child.
                let item = unsafe { self.splice_out(successor) };
                // SAFETY: Only the successor was freed. `target` is still in the tree and nothing
                // else references it while we hold `&mut self`.
                mem::replace(unsafe { &mut (*target.as_ptr()).item }, item)
            }
            // SAFETY: `target` came from `find` and has at most one child.
            None => unsafe { self.splice_out(target) },
        };
        self.len -= 1;
        removed
    }

    /// Puts the only child of `ptr` (if any) in its place, then frees `ptr` and returns its item.
    ///
    /// # Safety
    ///
    /// `ptr` must be a node of this tree with at most one child.
    unsafe fn splice_out(&mut self, ptr: NonNull<Node<T>>) -> T {
        let (parent, mut child) = {
            let node = ptr.as_ref();
            debug_assert!(!(node.left.is_some() && node.right.is_some()));
            let child = if node.left.is_some() {
                node.left
            } else {
                node.right
            };
            (node.parent, child)
        };

        if let Some(child) = child.node_mut() {
            child.parent = parent;
        }
        match parent.0 {
            None => self.root = child,
            Some(parent) => {
                let parent = &mut *parent.as_ptr();
                if parent.left.0 == Some(ptr) {
                    parent.left = child;
                } else {
                    parent.right = child;
                }
            }
        }

        Node::into_item(ptr)
    }
}
