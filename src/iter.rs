//! In-order iteration over a [`Tree`][crate::Tree].

use std::iter::FusedIterator;
use std::marker::PhantomData;

use crate::node::{Link, Node};

/// An iterator over the items of a [`Tree`][crate::Tree] in ascending order. Created by
/// [`Tree::iter`][crate::Tree::iter].
///
/// It walks between neighbors with parent links so it needs no stack of its own. Iterating from
/// the back yields the items in descending order.
pub struct Iter<'a, T> {
    front: Link<T>,
    back: Link<T>,
    remaining: usize,
    _tree: PhantomData<&'a Node<T>>,
}

impl<'a, T> Iter<'a, T> {
    pub(crate) fn new(root: Link<T>, len: usize) -> Self {
        Self {
            front: root.minimum(),
            back: root.maximum(),
            remaining: len,
            _tree: PhantomData,
        }
    }

    fn item(link: Link<T>) -> Option<&'a T> {
        // SAFETY: The iterator holds a shared borrow of the tree for `'a` so no node can be freed
        // or mutated while the reference is alive.
        link.0.map(|ptr| unsafe { &(*ptr.as_ptr()).item })
    }
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Self {
            front: self.front,
            back: self.back,
            remaining: self.remaining,
            _tree: PhantomData,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let item = Self::item(self.front)?;
        self.front = self.front.successor();
        self.remaining -= 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let item = Self::item(self.back)?;
        self.back = self.back.predecessor();
        self.remaining -= 1;
        Some(item)
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}
