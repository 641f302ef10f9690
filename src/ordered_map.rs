use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::FusedIterator;
use core::marker::PhantomData;
use core::ops::Index;

use crate::error::{MapError, Result};
use crate::raw::{Handle, RawTreeMap};

mod capacity;
mod cursor;

pub use cursor::{Cursor, CursorMut};
pub(crate) use cursor::Position;

/// An ordered map based on an unbalanced [binary search tree].
///
/// Keys must implement [`Ord`]; iteration visits entries in ascending key order.
/// The tree never rebalances, so its height (and the cost of every keyed
/// operation) depends on insertion order: inserting already-sorted keys builds a
/// tree as tall as the map is long.
///
/// Besides the usual `get`/`insert`/`remove` family the map offers failing
/// lookups ([`lookup`](OrderedMap::lookup)) that distinguish an empty map from a
/// missing key, and bidirectional [`Cursor`]s obtained from
/// [`begin`](OrderedMap::begin), [`end`](OrderedMap::end) and
/// [`find`](OrderedMap::find).
///
/// # Examples
///
/// ```
/// use bst_maps::{MapError, OrderedMap};
///
/// let mut stock = OrderedMap::new();
/// *stock.insert_or_access("pears") += 3;
/// *stock.insert_or_access("apples") += 5;
/// *stock.insert_or_access("pears") += 1;
///
/// assert_eq!(stock.lookup("pears"), Ok(&4));
/// assert_eq!(stock.lookup("plums"), Err(MapError::KeyNotFound));
///
/// let fruit: Vec<_> = stock.keys().copied().collect();
/// assert_eq!(fruit, ["apples", "pears"]);
/// ```
///
/// [binary search tree]: https://en.wikipedia.org/wiki/Binary_search_tree
pub struct OrderedMap<K, V> {
    raw: RawTreeMap<K, V>,
}

/// An iterator over the entries of an `OrderedMap`, sorted by key.
///
/// This `struct` is created by the [`iter`] method on [`OrderedMap`].
///
/// [`iter`]: OrderedMap::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V> {
    tree: &'a RawTreeMap<K, V>,
    front: Option<Handle>,
    back: Option<Handle>,
    remaining: usize,
}

/// A mutable iterator over the entries of an `OrderedMap`, sorted by key.
///
/// This `struct` is created by the [`iter_mut`] method on [`OrderedMap`].
///
/// [`iter_mut`]: OrderedMap::iter_mut
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct IterMut<'a, K: 'a, V: 'a> {
    tree: *mut RawTreeMap<K, V>,
    front: Option<Handle>,
    back: Option<Handle>,
    remaining: usize,
    _marker: PhantomData<&'a mut (K, V)>,
}

// SAFETY: IterMut behaves as &mut RawTreeMap<K, V>, so it is Send when K and V are Send.
// It is NOT Sync because mutable iterators should not be shared across threads.
unsafe impl<K: Send, V: Send> Send for IterMut<'_, K, V> {}

/// An owning iterator over the entries of an `OrderedMap`, sorted by key.
pub struct IntoIter<K, V> {
    inner: alloc::vec::IntoIter<(K, V)>,
}

/// An iterator over the keys of an `OrderedMap`.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// An iterator over the values of an `OrderedMap`.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// A mutable iterator over the values of an `OrderedMap`.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<K, V> OrderedMap<K, V> {
    /// Makes a new, empty `OrderedMap`.
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::OrderedMap;
    ///
    /// let mut map = OrderedMap::new();
    /// map.insert(1, "a");
    /// ```
    #[must_use]
    pub const fn new() -> OrderedMap<K, V> {
        OrderedMap { raw: RawTreeMap::new() }
    }

    /// Returns the number of elements in the map.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the map contains no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns the number of nodes on the longest path from the root to a leaf.
    ///
    /// The tree is not self-balancing, so this ranges from `log2(len + 1)` up to
    /// `len` depending on insertion order.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::OrderedMap;
    ///
    /// let sorted: OrderedMap<_, _> = (0..8).map(|k| (k, ())).collect();
    /// assert_eq!(sorted.height(), 8);
    ///
    /// let shuffled: OrderedMap<_, _> = [4, 2, 6, 1, 3, 5, 7].map(|k| (k, ())).into_iter().collect();
    /// assert_eq!(shuffled.height(), 3);
    /// ```
    #[must_use]
    pub fn height(&self) -> usize {
        self.raw.height()
    }

    /// Clears the map, removing all elements.
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns the first key-value pair in the map.
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.raw.first().map(|handle| self.raw.entry(handle))
    }

    /// Returns the last key-value pair in the map.
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.raw.last().map(|handle| self.raw.entry(handle))
    }

    /// Returns a cursor at the smallest key, or the end cursor if the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::OrderedMap;
    ///
    /// let map = OrderedMap::from([(2, 'b'), (1, 'a')]);
    /// let mut cursor = map.begin();
    /// assert_eq!(cursor.entry(), Ok((&1, &'a')));
    /// cursor.move_next().unwrap();
    /// cursor.move_next().unwrap();
    /// assert_eq!(cursor, map.end());
    /// ```
    pub fn begin(&self) -> Cursor<'_, K, V> {
        self.cursor_at(Position::begin(&self.raw))
    }

    /// Returns the past-the-end cursor.
    pub fn end(&self) -> Cursor<'_, K, V> {
        self.cursor_at(Position::END)
    }

    /// Returns a mutable cursor at the smallest key, or the end cursor if the map is empty.
    pub fn begin_mut(&mut self) -> CursorMut<'_, K, V> {
        let position = Position::begin(&self.raw);
        self.cursor_mut_at(position)
    }

    /// Returns the past-the-end mutable cursor.
    pub fn end_mut(&mut self) -> CursorMut<'_, K, V> {
        self.cursor_mut_at(Position::END)
    }

    pub(crate) fn cursor_at(&self, position: Position) -> Cursor<'_, K, V> {
        Cursor::new(&self.raw, position)
    }

    pub(crate) fn cursor_mut_at(&mut self, position: Position) -> CursorMut<'_, K, V> {
        CursorMut::new(&mut self.raw, position)
    }

    /// Gets an iterator over the entries of the map, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::OrderedMap;
    ///
    /// let map = OrderedMap::from([(3, "c"), (2, "b"), (1, "a")]);
    /// for (key, value) in map.iter() {
    ///     println!("{key}: {value}");
    /// }
    ///
    /// let (first_key, first_value) = map.iter().next().unwrap();
    /// assert_eq!((*first_key, *first_value), (1, "a"));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(1) to create the iterator; O(n) to walk all of it.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            tree: &self.raw,
            front: self.raw.first(),
            back: self.raw.last(),
            remaining: self.raw.len(),
        }
    }

    /// Gets a mutable iterator over the entries of the map, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::OrderedMap;
    ///
    /// let mut map = OrderedMap::from([("a", 1), ("b", 2), ("c", 3)]);
    /// for (key, value) in map.iter_mut() {
    ///     if key != &"a" {
    ///         *value += 10;
    ///     }
    /// }
    /// assert_eq!(map["c"], 13);
    /// ```
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            front: self.raw.first(),
            back: self.raw.last(),
            remaining: self.raw.len(),
            tree: &raw mut self.raw,
            _marker: PhantomData,
        }
    }

    /// Gets an iterator over the keys of the map, in sorted order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Gets an iterator over the values of the map, in order by key.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Gets a mutable iterator over the values of the map, in order by key.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut { inner: self.iter_mut() }
    }
}

impl<K: Ord, V> OrderedMap<K, V> {
    /// Returns a mutable reference to the value for `key`, inserting
    /// `V::default()` first if the key is absent.
    ///
    /// A present key is never reallocated; a new key becomes a leaf below the
    /// last node visited on the search path.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::OrderedMap;
    ///
    /// let mut counts: OrderedMap<&str, u32> = OrderedMap::new();
    /// for word in ["a", "b", "a"] {
    ///     *counts.insert_or_access(word) += 1;
    /// }
    /// assert_eq!(counts["a"], 2);
    /// assert_eq!(counts.len(), 2);
    /// ```
    ///
    /// # Complexity
    ///
    /// O(height)
    pub fn insert_or_access(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.raw.get_or_insert_with(key, V::default)
    }

    /// Returns a mutable reference to the value for `key`, inserting the result of
    /// `default` first if the key is absent.
    pub fn get_or_insert_with<F>(&mut self, key: K, default: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        self.raw.get_or_insert_with(key, default)
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map did not have this key present, `None` is returned. Otherwise
    /// the value is updated and the old value is returned; the key is not updated.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::OrderedMap;
    ///
    /// let mut map = OrderedMap::new();
    /// assert_eq!(map.insert(37, "a"), None);
    /// assert_eq!(map.insert(37, "b"), Some("a"));
    /// assert_eq!(map[&37], "b");
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.raw.insert(key, value)
    }

    /// Returns a reference to the value for `key`.
    ///
    /// # Errors
    ///
    /// [`MapError::EmptyContainer`] if the map is empty, [`MapError::KeyNotFound`]
    /// if the key is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::{MapError, OrderedMap};
    ///
    /// let mut map = OrderedMap::new();
    /// assert_eq!(map.lookup(&1), Err(MapError::EmptyContainer));
    /// map.insert(1, "a");
    /// assert_eq!(map.lookup(&1), Ok(&"a"));
    /// assert_eq!(map.lookup(&2), Err(MapError::KeyNotFound));
    /// ```
    pub fn lookup<Q>(&self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.locate(key)?;
        Ok(self.raw.entry(handle).1)
    }

    /// Returns a mutable reference to the value for `key`.
    ///
    /// # Errors
    ///
    /// Fails exactly like [`lookup`](OrderedMap::lookup).
    pub fn lookup_mut<Q>(&mut self, key: &Q) -> Result<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.locate(key)?;
        Ok(self.raw.entry_mut(handle).1)
    }

    /// Returns a reference to the value corresponding to the key.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.find(key).map(|handle| self.raw.entry(handle).1)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.raw.find(key)?;
        Some(self.raw.entry_mut(handle).1)
    }

    /// Returns `true` if the map contains a value for the specified key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.raw.find(key).is_some()
    }

    /// Returns a cursor at `key`, or the end cursor if the key is absent.
    ///
    /// Never fails; compare against [`end`](OrderedMap::end) or call
    /// [`Cursor::is_end`] to test for a miss.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::OrderedMap;
    ///
    /// let map = OrderedMap::from([(1, 'a'), (5, 'e'), (9, 'i')]);
    /// let mut cursor = map.find(&5);
    /// cursor.move_prev().unwrap();
    /// assert_eq!(cursor.key(), Some(&1));
    /// assert!(map.find(&4).is_end());
    /// ```
    pub fn find<Q>(&self, key: &Q) -> Cursor<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.cursor_at(Position::at(self.raw.find(key)))
    }

    /// Returns a mutable cursor at `key`, or the end cursor if the key is absent.
    pub fn find_mut<Q>(&mut self, key: &Q) -> CursorMut<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let position = Position::at(self.raw.find(key));
        self.cursor_mut_at(position)
    }

    /// Removes a key from the map, returning its value.
    ///
    /// # Errors
    ///
    /// [`MapError::EmptyContainer`] if the map is empty, [`MapError::KeyNotFound`]
    /// if the key is absent. The map is unchanged on error.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::{MapError, OrderedMap};
    ///
    /// let mut map = OrderedMap::from([(1, "a")]);
    /// assert_eq!(map.remove(&1), Ok("a"));
    /// assert_eq!(map.remove(&1), Err(MapError::EmptyContainer));
    /// ```
    ///
    /// # Complexity
    ///
    /// O(height)
    pub fn remove<Q>(&mut self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes a key from the map, returning the stored key and value.
    ///
    /// # Errors
    ///
    /// Fails exactly like [`remove`](OrderedMap::remove).
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Result<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        let handle = self.locate(key)?;
        Ok(self.raw.remove_at(handle).0)
    }

    fn locate<Q>(&self, key: &Q) -> Result<Handle>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord,
    {
        if self.raw.is_empty() {
            return Err(MapError::EmptyContainer);
        }
        self.raw.find(key).ok_or(MapError::KeyNotFound)
    }
}

impl<K: Clone, V: Clone> Clone for OrderedMap<K, V> {
    /// Copies the tree node for node, so the clone has the same shape and height.
    fn clone(&self) -> Self {
        OrderedMap { raw: self.raw.clone() }
    }
}

impl<K: Hash, V: Hash> Hash for OrderedMap<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for (k, v) in self {
            k.hash(state);
            v.hash(state);
        }
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for OrderedMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<K: Eq, V: Eq> Eq for OrderedMap<K, V> {}

impl<K: PartialOrd, V: PartialOrd> PartialOrd for OrderedMap<K, V> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<K: Ord, V: Ord> Ord for OrderedMap<K, V> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for OrderedMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V> Default for OrderedMap<K, V> {
    fn default() -> Self {
        OrderedMap::new()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for OrderedMap<K, V> {
    /// Builds the map by inserting the pairs in order; a repeated key keeps the last value.
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = OrderedMap::new();
        map.extend(iter);
        map
    }
}

impl<K: Ord, V> Extend<(K, V)> for OrderedMap<K, V> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<'a, K: Ord + Copy, V: Copy> Extend<(&'a K, &'a V)> for OrderedMap<K, V> {
    fn extend<I: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: I) {
        self.extend(iter.into_iter().map(|(&key, &value)| (key, value)));
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for OrderedMap<K, V> {
    fn from(arr: [(K, V); N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<K, Q, V> Index<&Q> for OrderedMap<K, V>
where
    K: Borrow<Q> + Ord,
    Q: ?Sized + Ord,
{
    type Output = V;

    /// Returns a reference to the value corresponding to the supplied key.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present in the map.
    #[inline]
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<'a, K, V> IntoIterator for &'a OrderedMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<'a, K, V> IntoIterator for &'a mut OrderedMap<K, V> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> IterMut<'a, K, V> {
        self.iter_mut()
    }
}

impl<K, V> IntoIterator for OrderedMap<K, V> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    /// Gets an owning iterator over the entries of the map, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::OrderedMap;
    ///
    /// let map = OrderedMap::from([(3, "c"), (1, "a"), (2, "b")]);
    /// let entries: Vec<_> = map.into_iter().collect();
    /// assert_eq!(entries, [(1, "a"), (2, "b"), (3, "c")]);
    /// ```
    fn into_iter(mut self) -> IntoIter<K, V> {
        IntoIter {
            inner: self.raw.drain_to_vec().into_iter(),
        }
    }
}

impl<'a, K: 'a, V: 'a> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let handle = self.front?;
        self.front = self.tree.next(handle);
        self.remaining -= 1;
        Some(self.tree.entry(handle))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K: 'a, V: 'a> DoubleEndedIterator for Iter<'a, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let handle = self.back?;
        self.back = self.tree.prev(handle);
        self.remaining -= 1;
        Some(self.tree.entry(handle))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Iter { ..*self }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Iter<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let handle = self.front?;

        // SAFETY: self.tree came from a live `&'a mut` in iter_mut(). Walking only reads
        // the nodes arena, and `remaining` guarantees each handle is yielded once, so the
        // value reference is unique.
        let (key, value) = unsafe {
            let tree = &*self.tree;
            self.front = tree.next(handle);
            let key: &'a K = &(*self.tree).node(handle).key;
            (key, RawTreeMap::value_mut_ptr(self.tree, handle))
        };
        self.remaining -= 1;
        Some((key, value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for IterMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let handle = self.back?;

        // SAFETY: See `next`.
        let (key, value) = unsafe {
            let tree = &*self.tree;
            self.back = tree.prev(handle);
            let key = &(*self.tree).node(handle).key;
            (key, RawTreeMap::value_mut_ptr(self.tree, handle))
        };
        self.remaining -= 1;
        Some((key, value))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V> FusedIterator for IterMut<'_, K, V> {}

impl<K, V> fmt::Debug for IterMut<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterMut").field("remaining", &self.remaining).finish()
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<(K, V)> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<(K, V)> {
        self.inner.next_back()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for IntoIter<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.inner.as_slice()).finish()
    }
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, _)| k)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

impl<K, V> FusedIterator for Keys<'_, K, V> {}

impl<K, V> Clone for Keys<'_, K, V> {
    fn clone(&self) -> Self {
        Keys {
            inner: self.inner.clone(),
        }
    }
}

impl<K: fmt::Debug, V> fmt::Debug for Keys<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

impl<K, V> FusedIterator for Values<'_, K, V> {}

impl<K, V> Clone for Values<'_, K, V> {
    fn clone(&self) -> Self {
        Values {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V: fmt::Debug> fmt::Debug for Values<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<&'a mut V> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for ValuesMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}

impl<K, V> FusedIterator for ValuesMut<'_, K, V> {}

impl<K, V> fmt::Debug for ValuesMut<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValuesMut").field("remaining", &self.inner.remaining).finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;

    #[test]
    fn mutable_iteration_from_both_ends() {
        let mut map: OrderedMap<i32, i32> = (1..=6).map(|k| (k, 0)).collect();
        let mut iter = map.iter_mut();
        *iter.next().unwrap().1 = 1;
        *iter.next_back().unwrap().1 = 6;
        assert_eq!(iter.len(), 4);
        for (k, v) in iter {
            *v = *k * 10;
        }
        assert_eq!(map.values().copied().collect::<Vec<_>>(), vec![1, 20, 30, 40, 50, 6]);
        map.raw.check_invariants();
    }

    #[test]
    fn iterators_meet_in_the_middle() {
        let map: OrderedMap<i32, ()> = [3, 1, 2].map(|k| (k, ())).into_iter().collect();
        let mut keys = map.keys();
        assert_eq!(keys.next(), Some(&1));
        assert_eq!(keys.next_back(), Some(&3));
        assert_eq!(keys.next(), Some(&2));
        assert_eq!(keys.next_back(), None);
        assert_eq!(keys.next(), None);
    }
}
