use alloc::boxed::Box;
use alloc::vec::Vec;
use core::borrow::Borrow;
use core::fmt;
use core::iter::{Flatten, FusedIterator};
use core::ops::Index;
use core::slice;

use crate::error::{MapError, Result};
use crate::ordered_map::OrderedMap;

mod bucket_key;
mod cursor;

pub use bucket_key::BucketKey;
pub use cursor::{BucketCursor, BucketCursorMut};

/// Number of buckets used when `BucketedMap`'s `B` parameter is not spelled out.
pub const DEFAULT_BUCKETS: usize = 50;

/// A map that spreads integer keys over `B` [`OrderedMap`] buckets by `key mod B`.
///
/// Every keyed operation is routed to a single bucket and delegated to that
/// bucket's own operation. `B` is part of the type, so every map of a given type
/// has the same bucket layout.
///
/// Iteration walks the buckets in index order and each bucket in key order.
/// The result is **not** sorted by key overall: with `B = 3`, key `3` (bucket 0)
/// comes before key `1` (bucket 1).
///
/// # Examples
///
/// ```
/// use bst_maps::BucketedMap;
///
/// let mut map: BucketedMap<u32, &str, 3> = BucketedMap::new();
/// for (key, name) in [(0, "zero"), (1, "one"), (2, "two"), (3, "three")] {
///     *map.insert_or_access(key) = name;
/// }
///
/// let keys: Vec<_> = map.keys().copied().collect();
/// assert_eq!(keys, [0, 3, 1, 2]);
/// assert_eq!(map.lookup(&3), Ok(&"three"));
/// ```
pub struct BucketedMap<K, V, const B: usize = DEFAULT_BUCKETS> {
    /// Exactly `B` buckets.
    buckets: Box<[OrderedMap<K, V>]>,
    /// Sum of the bucket lengths, kept in step with every insert and removal.
    len: usize,
}

/// An iterator over the entries of a `BucketedMap`, bucket by bucket.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V> {
    inner: Flatten<slice::Iter<'a, OrderedMap<K, V>>>,
    remaining: usize,
}

/// A mutable iterator over the entries of a `BucketedMap`, bucket by bucket.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct IterMut<'a, K, V> {
    inner: Flatten<slice::IterMut<'a, OrderedMap<K, V>>>,
    remaining: usize,
}

/// An owning iterator over the entries of a `BucketedMap`, bucket by bucket.
pub struct IntoIter<K, V> {
    inner: Flatten<alloc::vec::IntoIter<OrderedMap<K, V>>>,
    remaining: usize,
}

/// An iterator over the keys of a `BucketedMap`.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// An iterator over the values of a `BucketedMap`.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

/// A mutable iterator over the values of a `BucketedMap`.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<K, V, const B: usize> BucketedMap<K, V, B> {
    /// The number of buckets.
    pub const BUCKETS: usize = B;

    /// Makes a new, empty `BucketedMap` with `B` empty buckets.
    ///
    /// A zero bucket count is rejected at compile time.
    #[must_use]
    pub fn new() -> Self {
        const { assert!(B > 0, "a BucketedMap needs at least one bucket") };
        BucketedMap {
            buckets: (0..B).map(|_| OrderedMap::new()).collect(),
            len: 0,
        }
    }

    /// Returns the number of elements in the map.
    ///
    /// # Complexity
    ///
    /// O(1); the count is maintained on insert and removal rather than summed.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the map contains no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the bucket at `index`, or `None` if `index >= B`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::BucketedMap;
    ///
    /// let map: BucketedMap<i32, (), 3> = [0, 1, 2, 3].map(|k| (k, ())).into_iter().collect();
    /// let first: Vec<_> = map.bucket(0).unwrap().keys().copied().collect();
    /// assert_eq!(first, [0, 3]);
    /// assert!(map.bucket(3).is_none());
    /// ```
    #[must_use]
    pub fn bucket(&self, index: usize) -> Option<&OrderedMap<K, V>> {
        self.buckets.get(index)
    }

    /// Removes every entry, keeping the `B` (now empty) buckets.
    pub fn clear(&mut self) {
        tracing::trace!(len = self.len, buckets = B, "clearing bucketed map");
        self.buckets.iter_mut().for_each(OrderedMap::clear);
        self.len = 0;
    }

    /// Returns a cursor at the first entry of the lowest non-empty bucket, or the
    /// end cursor if the map is empty.
    pub fn begin(&self) -> BucketCursor<'_, K, V, B> {
        BucketCursor::first_from(self, 0)
    }

    /// Returns the past-the-end cursor.
    pub fn end(&self) -> BucketCursor<'_, K, V, B> {
        BucketCursor::end(self)
    }

    /// Returns a mutable cursor at the first entry, or the end cursor if the map is empty.
    pub fn begin_mut(&mut self) -> BucketCursorMut<'_, K, V, B> {
        BucketCursorMut::first_from(self, 0)
    }

    /// Returns the past-the-end mutable cursor.
    pub fn end_mut(&mut self) -> BucketCursorMut<'_, K, V, B> {
        BucketCursorMut::end(self)
    }

    /// Gets an iterator over the entries, bucket by bucket and by key within a bucket.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.buckets.iter().flatten(),
            remaining: self.len,
        }
    }

    /// Gets a mutable iterator over the entries, in the same order as [`iter`](BucketedMap::iter).
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            inner: self.buckets.iter_mut().flatten(),
            remaining: self.len,
        }
    }

    /// Gets an iterator over the keys, in iteration order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Gets an iterator over the values, in iteration order.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Gets a mutable iterator over the values, in iteration order.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut { inner: self.iter_mut() }
    }

    /// Index of the first non-empty bucket at or after `start`.
    fn next_occupied(&self, start: usize) -> Option<usize> {
        (start..B).find(|&index| !self.buckets[index].is_empty())
    }

    /// Index of the last non-empty bucket strictly before `end`.
    fn prev_occupied(&self, end: usize) -> Option<usize> {
        (0..end).rev().find(|&index| !self.buckets[index].is_empty())
    }
}

impl<K: BucketKey + Ord, V, const B: usize> BucketedMap<K, V, B> {
    /// Returns the index of the bucket that holds (or would hold) `key`.
    pub fn bucket_of<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + BucketKey,
    {
        key.bucket(B)
    }

    /// Returns a mutable reference to the value for `key`, inserting
    /// `V::default()` first if the key is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::BucketedMap;
    ///
    /// let mut hits: BucketedMap<u64, u32> = BucketedMap::new();
    /// *hits.insert_or_access(404) += 1;
    /// *hits.insert_or_access(404) += 1;
    /// assert_eq!(hits.len(), 1);
    /// assert_eq!(hits[&404], 2);
    /// ```
    pub fn insert_or_access(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.get_or_insert_with(key, V::default)
    }

    /// Returns a mutable reference to the value for `key`, inserting the result of
    /// `default` first if the key is absent.
    pub fn get_or_insert_with<F>(&mut self, key: K, default: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        let index = key.bucket(B);
        let bucket = &mut self.buckets[index];
        // Membership is decided before the bucket is touched.
        if !bucket.contains_key(&key) {
            tracing::trace!(bucket = index, "routing new key");
            self.len += 1;
        }
        bucket.get_or_insert_with(key, default)
    }

    /// Inserts a key-value pair, returning the previous value if the key was present.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let index = key.bucket(B);
        let bucket = &mut self.buckets[index];
        if !bucket.contains_key(&key) {
            self.len += 1;
        }
        bucket.insert(key, value)
    }

    /// Returns a reference to the value for `key`.
    ///
    /// # Errors
    ///
    /// [`MapError::EmptyContainer`] if the whole map is empty, otherwise
    /// [`MapError::KeyNotFound`] if the key is absent (even when its bucket is empty).
    pub fn lookup<Q>(&self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord + BucketKey,
    {
        self.occupied()?;
        self.buckets[key.bucket(B)].lookup(key).map_err(|_| MapError::KeyNotFound)
    }

    /// Returns a mutable reference to the value for `key`.
    ///
    /// # Errors
    ///
    /// Fails exactly like [`lookup`](BucketedMap::lookup).
    pub fn lookup_mut<Q>(&mut self, key: &Q) -> Result<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord + BucketKey,
    {
        self.occupied()?;
        self.buckets[key.bucket(B)].lookup_mut(key).map_err(|_| MapError::KeyNotFound)
    }

    /// Returns a reference to the value corresponding to the key.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord + BucketKey,
    {
        self.buckets[key.bucket(B)].get(key)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord + BucketKey,
    {
        self.buckets[key.bucket(B)].get_mut(key)
    }

    /// Returns `true` if the map contains a value for the specified key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord + BucketKey,
    {
        self.buckets[key.bucket(B)].contains_key(key)
    }

    /// Returns a cursor at `key`, or the end cursor if the key is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::BucketedMap;
    ///
    /// let map: BucketedMap<i32, char, 3> = [(0, 'a'), (1, 'b'), (3, 'd')].into_iter().collect();
    /// let mut cursor = map.find(&3);
    /// cursor.move_next().unwrap();
    /// assert_eq!(cursor.key(), Some(&1));
    /// assert!(map.find(&2).is_end());
    /// ```
    pub fn find<Q>(&self, key: &Q) -> BucketCursor<'_, K, V, B>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord + BucketKey,
    {
        BucketCursor::find(self, key)
    }

    /// Returns a mutable cursor at `key`, or the end cursor if the key is absent.
    pub fn find_mut<Q>(&mut self, key: &Q) -> BucketCursorMut<'_, K, V, B>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord + BucketKey,
    {
        BucketCursorMut::find(self, key)
    }

    /// Removes a key from the map, returning its value.
    ///
    /// # Errors
    ///
    /// Fails like [`lookup`](BucketedMap::lookup); the map is unchanged on error.
    pub fn remove<Q>(&mut self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord + BucketKey,
    {
        self.remove_entry(key).map(|(_, value)| value)
    }

    /// Removes a key from the map, returning the stored key and value.
    ///
    /// # Errors
    ///
    /// Fails like [`lookup`](BucketedMap::lookup); the map is unchanged on error.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Result<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Ord + BucketKey,
    {
        self.occupied()?;
        let entry = self.buckets[key.bucket(B)].remove_entry(key).map_err(|_| MapError::KeyNotFound)?;
        self.len -= 1;
        Ok(entry)
    }

    fn occupied(&self) -> Result<()> {
        if self.is_empty() {
            return Err(MapError::EmptyContainer);
        }
        Ok(())
    }
}

impl<K: Clone, V: Clone, const B: usize> Clone for BucketedMap<K, V, B> {
    fn clone(&self) -> Self {
        BucketedMap {
            buckets: self.buckets.clone(),
            len: self.len,
        }
    }
}

impl<K: PartialEq, V: PartialEq, const B: usize> PartialEq for BucketedMap<K, V, B> {
    /// Both maps share `B`, so equal contents enumerate in the same order.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<K: Eq, V: Eq, const B: usize> Eq for BucketedMap<K, V, B> {}

impl<K: fmt::Debug, V: fmt::Debug, const B: usize> fmt::Debug for BucketedMap<K, V, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, const B: usize> Default for BucketedMap<K, V, B> {
    fn default() -> Self {
        BucketedMap::new()
    }
}

impl<K: BucketKey + Ord, V, const B: usize> FromIterator<(K, V)> for BucketedMap<K, V, B> {
    /// Builds the map by inserting the pairs in order; a repeated key keeps the last value.
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = BucketedMap::new();
        map.extend(iter);
        map
    }
}

impl<K: BucketKey + Ord, V, const B: usize> Extend<(K, V)> for BucketedMap<K, V, B> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: BucketKey + Ord, V, const B: usize, const N: usize> From<[(K, V); N]> for BucketedMap<K, V, B> {
    fn from(arr: [(K, V); N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<K, Q, V, const B: usize> Index<&Q> for BucketedMap<K, V, B>
where
    K: Borrow<Q> + BucketKey + Ord,
    Q: ?Sized + Ord + BucketKey,
{
    type Output = V;

    /// # Panics
    ///
    /// Panics if the key is not present in the map.
    #[inline]
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<'a, K, V, const B: usize> IntoIterator for &'a BucketedMap<K, V, B> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<'a, K, V, const B: usize> IntoIterator for &'a mut BucketedMap<K, V, B> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> IterMut<'a, K, V> {
        self.iter_mut()
    }
}

impl<K, V, const B: usize> IntoIterator for BucketedMap<K, V, B> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> IntoIter<K, V> {
        IntoIter {
            inner: Vec::from(self.buckets).into_iter().flatten(),
            remaining: self.len,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.inner.next()?;
        self.remaining -= 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let entry = self.inner.next_back()?;
        self.remaining -= 1;
        Some(entry)
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
        Iter {
            inner: self.inner.clone(),
            remaining: self.remaining,
        }
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
        let entry = self.inner.next()?;
        self.remaining -= 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for IterMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let entry = self.inner.next_back()?;
        self.remaining -= 1;
        Some(entry)
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
        let entry = self.inner.next()?;
        self.remaining -= 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<(K, V)> {
        let entry = self.inner.next_back()?;
        self.remaining -= 1;
        Some(entry)
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<K, V> fmt::Debug for IntoIter<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntoIter").field("remaining", &self.remaining).finish()
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

impl<K: fmt::Debug, V> fmt::Debug for Keys<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keys").field("remaining", &self.inner.remaining).finish()
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

impl<K, V: fmt::Debug> fmt::Debug for Values<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Values").field("remaining", &self.inner.remaining).finish()
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
