use core::borrow::Borrow;
use core::fmt;
use core::ptr;

use super::{BucketKey, BucketedMap};
use crate::error::{MapError, Result};
use crate::ordered_map::{Cursor, OrderedMap, Position};

/// A read-only cursor over a [`BucketedMap`].
///
/// The cursor is a bucket index paired with a position inside that bucket. It
/// only ever rests on an entry or on the end sentinel, which is the end of the
/// last bucket. Stepping moves within a bucket in key order and hops to the
/// nearest non-empty bucket at the bucket's edges.
///
/// # Examples
///
/// ```
/// use bst_maps::{BucketedMap, MapError};
///
/// let map: BucketedMap<u32, (), 3> = [0, 1, 2, 3].map(|k| (k, ())).into_iter().collect();
/// let mut cursor = map.begin();
/// let mut keys = Vec::new();
/// while let Some(key) = cursor.key() {
///     keys.push(*key);
///     cursor.move_next().unwrap();
/// }
/// assert_eq!(keys, [0, 3, 1, 2]);
///
/// cursor.move_prev().unwrap();
/// assert_eq!(cursor.key(), Some(&2));
/// assert_eq!(map.begin().move_prev(), Err(MapError::IteratorOutOfRange));
/// ```
pub struct BucketCursor<'a, K, V, const B: usize> {
    map: &'a BucketedMap<K, V, B>,
    bucket: usize,
    position: Position,
}

impl<'a, K, V, const B: usize> BucketCursor<'a, K, V, B> {
    /// Cursor at the first entry of the first non-empty bucket at or after `start`.
    pub(crate) fn first_from(map: &'a BucketedMap<K, V, B>, start: usize) -> Self {
        match map.next_occupied(start) {
            Some(bucket) => {
                let position = map.buckets[bucket].begin().position();
                Self { map, bucket, position }
            }
            None => Self::end(map),
        }
    }

    pub(crate) fn end(map: &'a BucketedMap<K, V, B>) -> Self {
        Self {
            map,
            bucket: B - 1,
            position: Position::END,
        }
    }

    pub(crate) fn find<Q>(map: &'a BucketedMap<K, V, B>, key: &Q) -> Self
    where
        K: Borrow<Q> + Ord,
        Q: ?Sized + Ord + BucketKey,
    {
        let bucket = key.bucket(B);
        let position = map.buckets[bucket].find(key).position();
        if position.is_end() {
            return Self::end(map);
        }
        Self { map, bucket, position }
    }

    fn inner(&self) -> Cursor<'a, K, V> {
        self.map.buckets[self.bucket].cursor_at(self.position)
    }

    /// Returns `true` if this is the past-the-end cursor.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.position.is_end()
    }

    /// Returns the index of the bucket the cursor is in (`B - 1` at the end).
    #[must_use]
    pub fn bucket(&self) -> usize {
        self.bucket
    }

    /// Returns the key under the cursor, or `None` at the end.
    #[must_use]
    pub fn key(&self) -> Option<&'a K> {
        self.inner().key()
    }

    /// Returns the value under the cursor, or `None` at the end.
    #[must_use]
    pub fn value(&self) -> Option<&'a V> {
        self.inner().value()
    }

    /// Returns the entry under the cursor.
    ///
    /// # Errors
    ///
    /// [`MapError::IteratorOutOfRange`] at the end.
    pub fn entry(&self) -> Result<(&'a K, &'a V)> {
        self.inner().entry()
    }

    /// Moves to the next entry, crossing into the next non-empty bucket if needed.
    ///
    /// # Errors
    ///
    /// [`MapError::IteratorOutOfRange`] if the cursor is already at the end.
    pub fn move_next(&mut self) -> Result<()> {
        let mut inner = self.inner();
        inner.move_next()?;
        if inner.is_end() {
            *self = Self::first_from(self.map, self.bucket + 1);
        } else {
            self.position = inner.position();
        }
        Ok(())
    }

    /// Moves to the previous entry, crossing into the previous non-empty bucket if needed.
    ///
    /// # Errors
    ///
    /// [`MapError::IteratorOutOfRange`] if the cursor is at the first entry, or the
    /// map is empty. The cursor does not move.
    pub fn move_prev(&mut self) -> Result<()> {
        let mut inner = self.inner();
        if inner.move_prev().is_ok() {
            self.position = inner.position();
            return Ok(());
        }

        let bucket = self.map.prev_occupied(self.bucket).ok_or(MapError::IteratorOutOfRange)?;
        let mut last = self.map.buckets[bucket].end();
        last.move_prev()?;
        self.bucket = bucket;
        self.position = last.position();
        Ok(())
    }
}

impl<K, V, const B: usize> Clone for BucketCursor<'_, K, V, B> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V, const B: usize> Copy for BucketCursor<'_, K, V, B> {}

impl<K, V, const B: usize> PartialEq for BucketCursor<'_, K, V, B> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.map, other.map) && self.bucket == other.bucket && self.position == other.position
    }
}

impl<K, V, const B: usize> Eq for BucketCursor<'_, K, V, B> {}

impl<K: fmt::Debug, V: fmt::Debug, const B: usize> fmt::Debug for BucketCursor<'_, K, V, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BucketCursor")
            .field("bucket", &self.bucket)
            .field("entry", &self.entry().ok())
            .finish()
    }
}

/// A cursor over a [`BucketedMap`] that can modify values and remove entries.
///
/// Each operation re-enters the current bucket's own
/// [`CursorMut`](crate::ordered_map::CursorMut), so removal follows the ordered
/// map's rules and the map's element count is kept in step.
pub struct BucketCursorMut<'a, K, V, const B: usize> {
    map: &'a mut BucketedMap<K, V, B>,
    bucket: usize,
    position: Position,
}

impl<'a, K, V, const B: usize> BucketCursorMut<'a, K, V, B> {
    pub(crate) fn first_from(map: &'a mut BucketedMap<K, V, B>, start: usize) -> Self {
        let BucketCursor { bucket, position, .. } = BucketCursor::first_from(map, start);
        Self { map, bucket, position }
    }

    pub(crate) fn end(map: &'a mut BucketedMap<K, V, B>) -> Self {
        Self {
            map,
            bucket: B - 1,
            position: Position::END,
        }
    }

    pub(crate) fn find<Q>(map: &'a mut BucketedMap<K, V, B>, key: &Q) -> Self
    where
        K: Borrow<Q> + Ord,
        Q: ?Sized + Ord + BucketKey,
    {
        let BucketCursor { bucket, position, .. } = BucketCursor::find(map, key);
        Self { map, bucket, position }
    }

    fn current(&mut self) -> &mut OrderedMap<K, V> {
        &mut self.map.buckets[self.bucket]
    }

    /// Returns a read-only cursor at the same position, borrowing this one.
    pub fn as_cursor(&self) -> BucketCursor<'_, K, V, B> {
        BucketCursor {
            map: &*self.map,
            bucket: self.bucket,
            position: self.position,
        }
    }

    /// Returns `true` if this is the past-the-end cursor.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.position.is_end()
    }

    /// Returns the index of the bucket the cursor is in (`B - 1` at the end).
    #[must_use]
    pub fn bucket(&self) -> usize {
        self.bucket
    }

    /// Returns the key under the cursor, or `None` at the end.
    #[must_use]
    pub fn key(&self) -> Option<&K> {
        self.as_cursor().key()
    }

    /// Returns the value under the cursor, or `None` at the end.
    #[must_use]
    pub fn value(&self) -> Option<&V> {
        self.as_cursor().value()
    }

    /// Returns the value under the cursor mutably, or `None` at the end.
    pub fn value_mut(&mut self) -> Option<&mut V> {
        let position = self.position;
        self.current().cursor_mut_at(position).into_value_mut().ok()
    }

    /// Returns the entry under the cursor.
    ///
    /// # Errors
    ///
    /// [`MapError::IteratorOutOfRange`] at the end.
    pub fn entry(&self) -> Result<(&K, &V)> {
        self.as_cursor().entry()
    }

    /// Returns the entry under the cursor with a mutable value.
    ///
    /// # Errors
    ///
    /// [`MapError::IteratorOutOfRange`] at the end.
    pub fn entry_mut(&mut self) -> Result<(&K, &mut V)> {
        let position = self.position;
        self.current().cursor_mut_at(position).into_entry_mut()
    }

    /// Moves to the next entry, crossing into the next non-empty bucket if needed.
    ///
    /// # Errors
    ///
    /// [`MapError::IteratorOutOfRange`] if the cursor is already at the end.
    pub fn move_next(&mut self) -> Result<()> {
        let mut cursor = self.as_cursor();
        cursor.move_next()?;
        (self.bucket, self.position) = (cursor.bucket, cursor.position);
        Ok(())
    }

    /// Moves to the previous entry, crossing into the previous non-empty bucket if needed.
    ///
    /// # Errors
    ///
    /// [`MapError::IteratorOutOfRange`] if the cursor is at the first entry, or the
    /// map is empty. The cursor does not move.
    pub fn move_prev(&mut self) -> Result<()> {
        let mut cursor = self.as_cursor();
        cursor.move_prev()?;
        (self.bucket, self.position) = (cursor.bucket, cursor.position);
        Ok(())
    }

    /// Removes the entry under the cursor and returns it.
    ///
    /// The cursor moves to the entry that followed the removed one in iteration
    /// order, which may be in a later bucket, or to the end.
    ///
    /// # Errors
    ///
    /// [`MapError::KeyNotFound`] if the cursor is at the end; the map is unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::BucketedMap;
    ///
    /// let mut map: BucketedMap<u32, char, 3> = [(0, 'a'), (1, 'b'), (3, 'd')].into();
    /// let mut cursor = map.find_mut(&3);
    /// assert_eq!(cursor.remove_current(), Ok((3, 'd')));
    /// assert_eq!(cursor.key(), Some(&1));
    /// assert_eq!(map.len(), 2);
    /// ```
    pub fn remove_current(&mut self) -> Result<(K, V)> {
        let position = self.position;
        let mut cursor = self.current().cursor_mut_at(position);
        let entry = cursor.remove_current()?;
        let next = cursor.position();
        self.map.len -= 1;

        if next.is_end() {
            let BucketCursor { bucket, position, .. } = BucketCursor::first_from(&*self.map, self.bucket + 1);
            (self.bucket, self.position) = (bucket, position);
        } else {
            self.position = next;
        }
        Ok(entry)
    }
}

impl<K: fmt::Debug, V: fmt::Debug, const B: usize> fmt::Debug for BucketCursorMut<'_, K, V, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BucketCursorMut")
            .field("bucket", &self.bucket)
            .field("entry", &self.entry().ok())
            .finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use crate::{BucketedMap, MapError};
    use alloc::vec::Vec;

    type Small = BucketedMap<u32, u32, 5>;

    fn sparse() -> Small {
        // Buckets 0, 2 and 4 are occupied; 1 and 3 are empty.
        [(10, 1), (0, 2), (2, 3), (7, 4), (4, 5)].into()
    }

    #[test]
    fn skips_empty_buckets_both_ways() {
        let map = sparse();
        let mut cursor = map.begin();
        let mut forward = Vec::new();
        while let Some(key) = cursor.key() {
            forward.push((cursor.bucket(), *key));
            cursor.move_next().unwrap();
        }
        assert_eq!(forward, [(0, 0), (0, 10), (2, 2), (2, 7), (4, 4)]);
        assert_eq!(cursor, map.end());

        let mut backward = Vec::new();
        while cursor.move_prev().is_ok() {
            backward.push(*cursor.key().unwrap());
        }
        assert_eq!(backward, [4, 7, 2, 10, 0]);
        assert_eq!(cursor, map.begin());
    }

    #[test]
    fn end_steps_back_over_an_empty_last_bucket() {
        let map: Small = [(1, 1), (6, 6)].into();
        let mut cursor = map.end();
        cursor.move_prev().unwrap();
        assert_eq!(cursor.key(), Some(&6));
        assert_eq!(cursor.bucket(), 1);
    }

    #[test]
    fn empty_map_cursor_is_stuck() {
        let map = Small::new();
        let mut cursor = map.begin();
        assert_eq!(cursor, map.end());
        assert_eq!(cursor.move_next(), Err(MapError::IteratorOutOfRange));
        assert_eq!(cursor.move_prev(), Err(MapError::IteratorOutOfRange));
        assert_eq!(cursor.entry(), Err(MapError::IteratorOutOfRange));
    }

    #[test]
    fn failed_step_leaves_cursor_in_place() {
        let map = sparse();
        let mut cursor = map.begin();
        let before = cursor;
        assert_eq!(cursor.move_prev(), Err(MapError::IteratorOutOfRange));
        assert_eq!(cursor, before);
    }

    #[test]
    fn removal_crosses_buckets_and_updates_len() {
        let mut map = sparse();
        let mut cursor = map.find_mut(&10);
        assert_eq!(cursor.remove_current(), Ok((10, 1)));
        assert_eq!(cursor.key(), Some(&2));
        assert_eq!(cursor.bucket(), 2);
        *cursor.value_mut().unwrap() += 100;
        assert_eq!(map.len(), 4);
        assert_eq!(map[&2], 103);
    }

    #[test]
    fn draining_through_a_cursor() {
        let mut map = sparse();
        let mut cursor = map.begin_mut();
        let mut removed = Vec::new();
        while !cursor.is_end() {
            removed.push(cursor.remove_current().unwrap().0);
        }
        assert_eq!(cursor.remove_current(), Err(MapError::KeyNotFound));
        assert_eq!(removed, [0, 10, 2, 7, 4]);
        assert!(map.is_empty());
        assert_eq!(map.remove(&0), Err(MapError::EmptyContainer));
    }
}
