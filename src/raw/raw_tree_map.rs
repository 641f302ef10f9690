use alloc::vec::Vec;
use core::borrow::Borrow;
use core::cmp::Ordering;
use core::mem;

use smallvec::SmallVec;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Node, Search, Slot};

/// The unbalanced binary search tree backing `OrderedMap`.
///
/// Cloning copies both arenas, so a clone has exactly the shape (and height) of
/// its source.
#[derive(Clone)]
pub(crate) struct RawTreeMap<K, V> {
    /// Arena storing keys and links.
    nodes: Arena<Node<K>>,
    /// Arena storing values, kept apart from the links so mutable iteration never
    /// aliases the nodes it walks.
    values: Arena<V>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
    /// Number of key-value pairs in the tree.
    len: usize,
}

impl<K, V> RawTreeMap<K, V> {
    pub(crate) const fn new() -> Self {
        Self {
            nodes: Arena::new(),
            values: Arena::new(),
            root: None,
            len: 0,
        }
    }

    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Arena::with_capacity(capacity),
            values: Arena::with_capacity(capacity),
            root: None,
            len: 0,
        }
    }

    pub(crate) const fn len(&self) -> usize {
        debug_assert!(self.nodes.len() == self.len && self.values.len() == self.len);
        self.len
    }

    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity().min(self.values.capacity())
    }

    pub(crate) fn clear(&mut self) {
        tracing::trace!(len = self.len, "clearing tree");
        self.nodes.clear();
        self.values.clear();
        self.root = None;
        self.len = 0;
    }

    pub(crate) fn node(&self, handle: Handle) -> &Node<K> {
        self.nodes.get(handle)
    }

    /// Returns the entry stored at a node.
    pub(crate) fn entry(&self, handle: Handle) -> (&K, &V) {
        let node = self.nodes.get(handle);
        (&node.key, self.values.get(node.value))
    }

    /// Returns the entry stored at a node with a mutable value.
    pub(crate) fn entry_mut(&mut self, handle: Handle) -> (&K, &mut V) {
        let node = self.nodes.get(handle);
        (&node.key, self.values.get_mut(node.value))
    }

    /// Returns a mutable reference to a node's value from a raw pointer.
    ///
    /// # Safety
    /// - `ptr` must point to a live `RawTreeMap<K, V>`.
    /// - The caller must have logical exclusive access to the value stored at `handle`.
    pub(crate) unsafe fn value_mut_ptr<'a>(ptr: *mut Self, handle: Handle) -> &'a mut V {
        // SAFETY: Reading the node only touches the `nodes` arena; the value is reached
        // through `Arena::get_mut_ptr`, which reborrows that single slot.
        unsafe {
            let value = (*(&raw const (*ptr).nodes)).get(handle).value;
            Arena::get_mut_ptr(&raw mut (*ptr).values, value)
        }
    }

    /// Handle of the smallest key, if any.
    pub(crate) fn first(&self) -> Option<Handle> {
        self.root.map(|root| self.leftmost(root))
    }

    /// Handle of the largest key, if any.
    pub(crate) fn last(&self) -> Option<Handle> {
        self.root.map(|root| self.rightmost(root))
    }

    fn leftmost(&self, mut handle: Handle) -> Handle {
        while let Some(left) = self.nodes.get(handle).left {
            handle = left;
        }
        handle
    }

    fn rightmost(&self, mut handle: Handle) -> Handle {
        while let Some(right) = self.nodes.get(handle).right {
            handle = right;
        }
        handle
    }

    /// In-order successor of `handle`, or `None` past the largest key.
    pub(crate) fn next(&self, handle: Handle) -> Option<Handle> {
        let node = self.nodes.get(handle);
        if let Some(right) = node.right {
            return Some(self.leftmost(right));
        }

        // Climb while we are a right child; the first ancestor entered from its
        // left subtree comes next.
        let mut child = handle;
        let mut parent = node.parent;
        while let Some(p) = parent {
            let above = self.nodes.get(p);
            if above.right != Some(child) {
                break;
            }
            child = p;
            parent = above.parent;
        }
        parent
    }

    /// In-order predecessor of `handle`, or `None` before the smallest key.
    pub(crate) fn prev(&self, handle: Handle) -> Option<Handle> {
        let node = self.nodes.get(handle);
        if let Some(left) = node.left {
            return Some(self.rightmost(left));
        }

        let mut child = handle;
        let mut parent = node.parent;
        while let Some(p) = parent {
            let above = self.nodes.get(p);
            if above.left != Some(child) {
                break;
            }
            child = p;
            parent = above.parent;
        }
        parent
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub(crate) fn height(&self) -> usize {
        let mut stack: SmallVec<[(Handle, usize); 32]> = SmallVec::new();
        if let Some(root) = self.root {
            stack.push((root, 1));
        }

        let mut height = 0;
        while let Some((handle, depth)) = stack.pop() {
            height = height.max(depth);
            let node = self.nodes.get(handle);
            stack.extend([node.left, node.right].into_iter().flatten().map(|child| (child, depth + 1)));
        }
        height
    }

    /// Removes the entry at `handle`.
    ///
    /// Returns the removed entry together with the node that now holds its
    /// in-order successor (`None` if the removed key was the largest).
    ///
    /// A node with two children is not unlinked itself: its in-order successor
    /// (which has no left child) is spliced out instead and its payload moves into
    /// `handle`, so `handle` is also the returned successor position.
    pub(crate) fn remove_at(&mut self, handle: Handle) -> ((K, V), Option<Handle>) {
        let node = self.nodes.get(handle);
        let (removed, next) = if let (Some(_), Some(right)) = (node.left, node.right) {
            let successor = self.leftmost(right);
            tracing::trace!(target_node = ?handle, successor = ?successor, "promoting in-order successor");
            let promoted = self.unlink(successor);
            let node = self.nodes.get_mut(handle);
            let key = mem::replace(&mut node.key, promoted.key);
            let value = mem::replace(&mut node.value, promoted.value);
            ((key, value), Some(handle))
        } else {
            let next = self.next(handle);
            let node = self.unlink(handle);
            ((node.key, node.value), next)
        };

        self.len -= 1;
        let (key, value) = removed;
        ((key, self.values.take(value)), next)
    }

    /// Splices a node with at most one child out of the tree and frees its slot.
    fn unlink(&mut self, handle: Handle) -> Node<K> {
        let node = self.nodes.take(handle);
        let child = node.sole_child();

        if let Some(child) = child {
            self.nodes.get_mut(child).parent = node.parent;
        }
        match node.parent {
            None => self.root = child,
            Some(parent) => {
                let parent = self.nodes.get_mut(parent);
                if parent.left == Some(handle) {
                    parent.left = child;
                } else {
                    parent.right = child;
                }
            }
        }
        node
    }

    /// Moves every entry out of the tree in ascending key order.
    pub(crate) fn drain_to_vec(&mut self) -> Vec<(K, V)> {
        let mut order = Vec::with_capacity(self.len);
        let mut current = self.first();
        while let Some(handle) = current {
            order.push(handle);
            current = self.next(handle);
        }

        let entries: Vec<(K, V)> = order
            .into_iter()
            .map(|handle| {
                let node = self.nodes.take(handle);
                (node.key, self.values.take(node.value))
            })
            .collect();
        self.clear();
        entries
    }
}

impl<K: Ord, V> RawTreeMap<K, V> {
    /// Walks from the root towards `key`.
    pub(crate) fn search<Q>(&self, key: &Q) -> Search
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let Some(mut current) = self.root else {
            return Search::Vacant(Slot::Root);
        };

        loop {
            let node = self.nodes.get(current);
            match key.cmp(node.key.borrow()) {
                Ordering::Equal => return Search::Found(current),
                Ordering::Less => match node.left {
                    Some(left) => current = left,
                    None => return Search::Vacant(Slot::Left(current)),
                },
                Ordering::Greater => match node.right {
                    Some(right) => current = right,
                    None => return Search::Vacant(Slot::Right(current)),
                },
            }
        }
    }

    pub(crate) fn find<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        match self.search(key) {
            Search::Found(handle) => Some(handle),
            Search::Vacant(_) => None,
        }
    }

    /// Returns the value for `key`, linking a new leaf built by `default` if the key is absent.
    pub(crate) fn get_or_insert_with<F>(&mut self, key: K, default: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        let handle = match self.search(&key) {
            Search::Found(handle) => handle,
            Search::Vacant(slot) => self.link(slot, key, default()),
        };
        self.entry_mut(handle).1
    }

    /// Inserts a key-value pair, returning the previous value if the key was present.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.search(&key) {
            Search::Found(handle) => Some(mem::replace(self.entry_mut(handle).1, value)),
            Search::Vacant(slot) => {
                self.link(slot, key, value);
                None
            }
        }
    }

    /// Allocates a leaf for `key` and hangs it from `slot`.
    fn link(&mut self, slot: Slot, key: K, value: V) -> Handle {
        let value = self.values.alloc(value);
        let handle = self.nodes.alloc(Node::leaf(key, value, slot.parent()));
        match slot {
            Slot::Root => {
                tracing::trace!(root = ?handle, "planting root");
                self.root = Some(handle);
            }
            Slot::Left(parent) => self.nodes.get_mut(parent).left = Some(handle),
            Slot::Right(parent) => self.nodes.get_mut(parent).right = Some(handle),
        }
        self.len += 1;
        handle
    }

    /// Asserts the ordering, parent-link and size invariants.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        let mut count = 0;
        let mut stack: SmallVec<[Handle; 32]> = SmallVec::new();
        if let Some(root) = self.root {
            assert_eq!(self.nodes.get(root).parent, None, "root has a parent");
            stack.push(root);
        }
        while let Some(handle) = stack.pop() {
            count += 1;
            let node = self.nodes.get(handle);
            if let Some(left) = node.left {
                assert_eq!(self.nodes.get(left).parent, Some(handle), "broken parent link");
                assert!(self.nodes.get(left).key < node.key, "left child out of order");
                stack.push(left);
            }
            if let Some(right) = node.right {
                assert_eq!(self.nodes.get(right).parent, Some(handle), "broken parent link");
                assert!(self.nodes.get(right).key > node.key, "right child out of order");
                stack.push(right);
            }
        }
        assert_eq!(count, self.len, "reachable nodes differ from len");
        assert_eq!(self.nodes.len(), self.len, "leaked node slots");
        assert_eq!(self.values.len(), self.len, "leaked value slots");

        // Parent/child ordering alone misses violations deeper in a subtree, so
        // also require the in-order walk to be strictly ascending.
        let mut current = self.first();
        let mut previous: Option<&K> = None;
        while let Some(handle) = current {
            let key = &self.nodes.get(handle).key;
            if let Some(previous) = previous {
                assert!(previous < key, "in-order walk is not ascending");
            }
            previous = Some(key);
            current = self.next(handle);
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::collections::BTreeMap;
    use proptest::prelude::*;

    fn keys_in_order(tree: &RawTreeMap<i32, i32>) -> Vec<i32> {
        let mut keys = Vec::new();
        let mut current = tree.first();
        while let Some(handle) = current {
            keys.push(*tree.entry(handle).0);
            current = tree.next(handle);
        }
        keys
    }

    fn keys_in_reverse(tree: &RawTreeMap<i32, i32>) -> Vec<i32> {
        let mut keys = Vec::new();
        let mut current = tree.last();
        while let Some(handle) = current {
            keys.push(*tree.entry(handle).0);
            current = tree.prev(handle);
        }
        keys
    }

    fn sample() -> RawTreeMap<i32, i32> {
        let mut tree = RawTreeMap::new();
        for key in [5, 3, 8, 1, 4, 7, 9] {
            tree.insert(key, key * 10);
        }
        tree
    }

    #[test]
    fn in_order_walks_both_ways() {
        let tree = sample();
        tree.check_invariants();
        assert_eq!(keys_in_order(&tree), [1, 3, 4, 5, 7, 8, 9]);
        assert_eq!(keys_in_reverse(&tree), [9, 8, 7, 5, 4, 3, 1]);
        assert_eq!(tree.height(), 3);
    }

    #[test]
    fn search_reports_vacant_slot() {
        let tree = sample();
        // 6 walks 5 -> 8 -> 7 and hangs to the left of 7.
        let Search::Vacant(Slot::Left(parent)) = tree.search(&6) else {
            panic!("expected a left slot");
        };
        assert_eq!(*tree.entry(parent).0, 7);
        // 10 walks down the right spine and hangs to the right of 9.
        let Search::Vacant(Slot::Right(parent)) = tree.search(&10) else {
            panic!("expected a right slot");
        };
        assert_eq!(*tree.entry(parent).0, 9);
        assert_eq!(RawTreeMap::<i32, i32>::new().search(&1), Search::Vacant(Slot::Root));
    }

    #[test]
    fn two_child_removal_keeps_target_node() {
        let mut tree = sample();
        let eight = tree.find(&8).unwrap();
        let ((key, value), next) = tree.remove_at(eight);
        assert_eq!((key, value), (8, 80));
        // 9 was promoted into the node that held 8.
        assert_eq!(next, Some(eight));
        assert_eq!(tree.entry(eight), (&9, &90));
        assert_eq!(keys_in_order(&tree), [1, 3, 4, 5, 7, 9]);
        assert_eq!(tree.len(), 6);
        tree.check_invariants();
    }

    #[test]
    fn leaf_and_root_removal() {
        let mut tree = sample();
        let nine = tree.find(&9).unwrap();
        assert_eq!(tree.remove_at(nine), ((9, 90), None));

        let root = tree.find(&5).unwrap();
        let ((key, _), next) = tree.remove_at(root);
        assert_eq!(key, 5);
        assert_eq!(next.map(|h| *tree.entry(h).0), Some(7));
        tree.check_invariants();

        for key in [1, 3, 4, 7, 8] {
            let handle = tree.find(&key).unwrap();
            tree.remove_at(handle);
            tree.check_invariants();
        }
        assert!(tree.is_empty());
        assert_eq!(tree.first(), None);
        assert_eq!(tree.height(), 0);
    }

    #[test]
    fn sorted_insertion_degenerates_to_a_list() {
        let mut tree = RawTreeMap::new();
        for key in 0..100 {
            tree.insert(key, key);
        }
        assert_eq!(tree.height(), 100);
        tree.check_invariants();
    }

    #[test]
    fn clone_preserves_shape() {
        let mut tree = RawTreeMap::new();
        for key in 0..50 {
            tree.insert(key, key);
        }
        let copy = tree.clone();
        assert_eq!(copy.height(), tree.height());
        assert_eq!(keys_in_order(&copy), keys_in_order(&tree));
        copy.check_invariants();
    }

    #[test]
    fn drain_yields_sorted_entries() {
        let mut tree = sample();
        let drained = tree.drain_to_vec();
        assert_eq!(drained.iter().map(|&(k, _)| k).collect::<Vec<_>>(), [1, 3, 4, 5, 7, 8, 9]);
        assert!(tree.is_empty());
        tree.check_invariants();
    }

    #[test]
    fn get_or_insert_with_only_builds_missing_values() {
        let mut tree = RawTreeMap::new();
        *tree.get_or_insert_with(1, || 10) += 1;
        *tree.get_or_insert_with(1, || unreachable!()) += 1;
        assert_eq!(tree.entry(tree.find(&1).unwrap()), (&1, &12));
        assert_eq!(tree.len(), 1);
    }

    proptest! {
        #[test]
        fn random_operations_match_btreemap(
            operations in prop::collection::vec((any::<bool>(), -200i32..200), 0..1024)
        ) {
            let mut tree = RawTreeMap::new();
            let mut model = BTreeMap::new();

            for (insert, key) in operations {
                if insert {
                    prop_assert_eq!(tree.insert(key, key * 2), model.insert(key, key * 2));
                } else {
                    let removed = tree.find(&key).map(|handle| tree.remove_at(handle).0);
                    prop_assert_eq!(removed, model.remove_entry(&key));
                }
                prop_assert_eq!(tree.len(), model.len());
            }

            tree.check_invariants();
            prop_assert_eq!(keys_in_order(&tree), model.keys().copied().collect::<Vec<_>>());
            prop_assert_eq!(keys_in_reverse(&tree), model.keys().rev().copied().collect::<Vec<_>>());
        }
    }
}
