//! Tree nodes, the links between them and the structural queries (minimum, maximum, successor,
//! predecessor) that only follow links and never compare items.

use std::alloc::{self, Layout};
use std::ptr::NonNull;

/// A possibly empty pointer to a [`Node`]. A node's `left` and `right` links own the node they
/// point to. Its `parent` link only refers back and is never used to free anything.
pub(crate) struct Link<T>(pub(crate) Option<NonNull<Node<T>>>);

impl<T> Clone for Link<T> {
    fn clone(&self) -> Self {
        Self(self.0)
    }
}
impl<T> Copy for Link<T> {}

impl<T> PartialEq for Link<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Link<T> {
    pub(crate) const NONE: Self = Link(None);

    pub(crate) fn is_some(&self) -> bool {
        self.0.is_some()
    }

    pub(crate) fn node(&self) -> Option<&Node<T>> {
        // SAFETY: A non-empty link always points at a live node allocated by `Node::try_new` or
        // `Node::new`. Nodes are only freed after every link to them has been cleared, so the
        // pointer can't dangle. The tree hands out shared references only while it is itself
        // borrowed immutably, so there is no aliasing `&mut`.
        unsafe { self.0.as_ref().map(|ptr| ptr.as_ref()) }
    }

    pub(crate) fn node_mut(&mut self) -> Option<&mut Node<T>> {
        // SAFETY: See `Link::node`. Mutable access only happens through `&mut Tree`.
        unsafe { self.0.as_mut().map(|ptr| ptr.as_mut()) }
    }

    pub(crate) fn take(&mut self) -> Self {
        Link(self.0.take())
    }

    /// The leftmost node of the subtree rooted here.
    pub(crate) fn minimum(self) -> Self {
        let mut current = self;
        while let Some(left) = current.node().map(|n| n.left).filter(Link::is_some) {
            current = left;
        }
        current
    }

    /// The rightmost node of the subtree rooted here.
    pub(crate) fn maximum(self) -> Self {
        let mut current = self;
        while let Some(right) = current.node().map(|n| n.right).filter(Link::is_some) {
            current = right;
        }
        current
    }

    /// The node holding the next larger item, or an empty link if this node holds the largest.
    ///
    /// ```text
    ///      (4)        successor(3) has no right subtree so we climb while we are a right
    ///     /   \       child: 3 -> 2. 2 is the left child of 4 so 4 is the answer.
    ///   (2)   (6)
    ///   / \           successor(4) has a right subtree so it's the minimum of it: 5.
    /// (1) (3) ...
    /// ```
    pub(crate) fn successor(self) -> Self {
        let Some(node) = self.node() else {
            return Link::NONE;
        };
        if node.right.is_some() {
            return node.right.minimum();
        }

        let mut child = self;
        let mut parent = node.parent;
        while let Some(p) = parent.node() {
            if p.right != child {
                break;
            }
            let grandparent = p.parent;
            child = parent;
            parent = grandparent;
        }
        parent
    }

    /// The node holding the next smaller item, or an empty link if this node holds the smallest.
    /// Mirror image of [`Link::successor`].
    pub(crate) fn predecessor(self) -> Self {
        let Some(node) = self.node() else {
            return Link::NONE;
        };
        if node.left.is_some() {
            return node.left.maximum();
        }

        let mut child = self;
        let mut parent = node.parent;
        while let Some(p) = parent.node() {
            if p.left != child {
                break;
            }
            let grandparent = p.parent;
            child = parent;
            parent = grandparent;
        }
        parent
    }
}

pub(crate) struct Node<T> {
    pub(crate) item: T,
    pub(crate) parent: Link<T>,
    pub(crate) left: Link<T>,
    pub(crate) right: Link<T>,
}

impl<T> Node<T> {
    /// Allocates a childless node under `parent`. If the allocator fails, the item is handed back
    /// instead of aborting.
    pub(crate) fn try_new(item: T, parent: Link<T>) -> Result<NonNull<Self>, T> {
        let layout = Layout::new::<Self>();
        // SAFETY: `Node` holds three pointer sized links so `layout` is never zero sized.
        let ptr = unsafe { alloc::alloc(layout) }.cast::<Self>();
        let Some(ptr) = NonNull::new(ptr) else {
            return Err(item);
        };
        // SAFETY: `ptr` is freshly allocated for exactly one `Node` and is properly aligned.
        unsafe {
            ptr.as_ptr().write(Node {
                item,
                parent,
                left: Link::NONE,
                right: Link::NONE,
            })
        };
        Ok(ptr)
    }

    /// Allocates a childless node under `parent`, aborting on allocation failure like `Box::new`.
    pub(crate) fn new(item: T, parent: Link<T>) -> NonNull<Self> {
        NonNull::from(Box::leak(Box::new(Node {
            item,
            parent,
            left: Link::NONE,
            right: Link::NONE,
        })))
    }

    /// Frees the node and returns its item.
    ///
    /// # Safety
    ///
    /// `ptr` must have come from [`Node::try_new`] or [`Node::new`], must not have been freed
    /// already and nothing may dereference it afterwards. In practice this means every link to it
    /// has been cleared or is about to be overwritten.
    pub(crate) unsafe fn into_item(ptr: NonNull<Self>) -> T {
        // `try_new` allocates with the global allocator and `Layout::new::<Node<T>>()` which is
        // exactly what `Box` expects.
        let node = Box::from_raw(ptr.as_ptr());
        node.item
    }
}
