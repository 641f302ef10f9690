use super::handle::Handle;

/// A binary search tree node.
///
/// `left` and `right` are the ownership edges of the tree: a node is reachable
/// from the root only through them. `parent` is a back-link used for in-order
/// stepping and for re-pointing the parent's slot during removal; it never
/// decides when a node is freed.
pub(crate) struct Node<K> {
    pub(crate) key: K,
    /// Slot of this entry's value in the values arena.
    pub(crate) value: Handle,
    pub(crate) left: Option<Handle>,
    pub(crate) right: Option<Handle>,
    pub(crate) parent: Option<Handle>,
}

impl<K> Node<K> {
    pub(crate) const fn leaf(key: K, value: Handle, parent: Option<Handle>) -> Self {
        Self {
            key,
            value,
            left: None,
            right: None,
            parent,
        }
    }

    /// Returns the only child of a node with at most one child.
    pub(crate) fn sole_child(&self) -> Option<Handle> {
        debug_assert!(self.left.is_none() || self.right.is_none(), "node has two children");
        self.left.or(self.right)
    }
}

impl<K: Clone> Clone for Node<K> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            ..*self
        }
    }
}

/// Where a key lives, or where it would be linked in.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Search {
    /// The key is stored at this node.
    Found(Handle),
    /// The key is absent; inserting it fills this empty slot.
    Vacant(Slot),
}

/// An empty child slot.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Slot {
    Root,
    Left(Handle),
    Right(Handle),
}

impl Slot {
    /// The node that would become the parent of whatever fills this slot.
    pub(crate) const fn parent(self) -> Option<Handle> {
        match self {
            Slot::Root => None,
            Slot::Left(parent) | Slot::Right(parent) => Some(parent),
        }
    }
}
