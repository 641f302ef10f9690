use core::fmt;
use core::ptr;

use crate::error::{MapError, Result};
use crate::raw::{Handle, RawTreeMap};

/// A position in the in-order walk of a tree: a node, or past the end.
///
/// This is the state shared by [`Cursor`] and [`CursorMut`] (and by the bucketed
/// map's cursors); it holds no reference, so each cursor pairs it with the kind of
/// borrow it needs.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Position {
    current: Option<Handle>,
}

impl Position {
    pub(crate) const END: Self = Self { current: None };

    pub(crate) const fn at(current: Option<Handle>) -> Self {
        Self { current }
    }

    pub(crate) fn begin<K, V>(tree: &RawTreeMap<K, V>) -> Self {
        Self::at(tree.first())
    }

    pub(crate) const fn is_end(self) -> bool {
        self.current.is_none()
    }

    pub(crate) const fn handle(self) -> Option<Handle> {
        self.current
    }

    /// Steps to the in-order successor; fails (and stays put) at the end.
    pub(crate) fn advance<K, V>(&mut self, tree: &RawTreeMap<K, V>) -> Result<()> {
        let handle = self.current.ok_or(MapError::IteratorOutOfRange)?;
        self.current = tree.next(handle);
        Ok(())
    }

    /// Steps to the in-order predecessor; from the end this is the largest key.
    /// Fails (and stays put) at the first key.
    pub(crate) fn retreat<K, V>(&mut self, tree: &RawTreeMap<K, V>) -> Result<()> {
        let previous = match self.current {
            Some(handle) => tree.prev(handle),
            None => tree.last(),
        };
        self.current = Some(previous.ok_or(MapError::IteratorOutOfRange)?);
        Ok(())
    }
}

/// A read-only cursor over an [`OrderedMap`](crate::OrderedMap).
///
/// A cursor points at one entry or at the past-the-end sentinel. It moves in key
/// order with [`move_next`](Cursor::move_next) and
/// [`move_prev`](Cursor::move_prev); a step that would leave `begin..=end` fails
/// with [`MapError::IteratorOutOfRange`] and leaves the cursor where it was.
///
/// Cursors compare equal when they point at the same position of the same map.
///
/// # Examples
///
/// ```
/// use bst_maps::{MapError, OrderedMap};
///
/// let map = OrderedMap::from([(1, "a"), (2, "b")]);
/// let mut cursor = map.end();
/// assert_eq!(cursor.entry(), Err(MapError::IteratorOutOfRange));
///
/// cursor.move_prev().unwrap();
/// assert_eq!(cursor.entry(), Ok((&2, &"b")));
/// cursor.move_prev().unwrap();
/// assert_eq!(cursor, map.begin());
/// assert_eq!(cursor.move_prev(), Err(MapError::IteratorOutOfRange));
/// ```
pub struct Cursor<'a, K, V> {
    tree: &'a RawTreeMap<K, V>,
    position: Position,
}

impl<'a, K, V> Cursor<'a, K, V> {
    pub(crate) fn new(tree: &'a RawTreeMap<K, V>, position: Position) -> Self {
        Self { tree, position }
    }

    pub(crate) fn position(&self) -> Position {
        self.position
    }

    /// Returns `true` if this is the past-the-end cursor.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.position.is_end()
    }

    /// Returns the key under the cursor, or `None` at the end.
    #[must_use]
    pub fn key(&self) -> Option<&'a K> {
        self.entry().ok().map(|(key, _)| key)
    }

    /// Returns the value under the cursor, or `None` at the end.
    #[must_use]
    pub fn value(&self) -> Option<&'a V> {
        self.entry().ok().map(|(_, value)| value)
    }

    /// Returns the entry under the cursor.
    ///
    /// # Errors
    ///
    /// [`MapError::IteratorOutOfRange`] at the end.
    pub fn entry(&self) -> Result<(&'a K, &'a V)> {
        let handle = self.position.handle().ok_or(MapError::IteratorOutOfRange)?;
        Ok(self.tree.entry(handle))
    }

    /// Moves to the next key.
    ///
    /// # Errors
    ///
    /// [`MapError::IteratorOutOfRange`] if the cursor is already at the end.
    pub fn move_next(&mut self) -> Result<()> {
        self.position.advance(self.tree)
    }

    /// Moves to the previous key; from the end this is the largest key.
    ///
    /// # Errors
    ///
    /// [`MapError::IteratorOutOfRange`] if the cursor is at the first key, or the
    /// map is empty.
    pub fn move_prev(&mut self) -> Result<()> {
        self.position.retreat(self.tree)
    }
}

impl<K, V> Clone for Cursor<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for Cursor<'_, K, V> {}

impl<K, V> PartialEq for Cursor<'_, K, V> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.tree, other.tree) && self.position == other.position
    }
}

impl<K, V> Eq for Cursor<'_, K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Cursor<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cursor").field(&self.entry().ok()).finish()
    }
}

/// A cursor over an [`OrderedMap`](crate::OrderedMap) that can modify values
/// and remove entries.
///
/// The cursor holds the map's unique borrow, so no other cursor can observe the
/// tree while it changes.
///
/// # Examples
///
/// ```
/// use bst_maps::OrderedMap;
///
/// let mut map = OrderedMap::from([(1, 10), (2, 20), (3, 30)]);
/// let mut cursor = map.find_mut(&2);
/// *cursor.value_mut().unwrap() += 1;
/// assert_eq!(cursor.remove_current(), Ok((2, 21)));
/// assert_eq!(cursor.key(), Some(&3));
/// assert_eq!(map.len(), 2);
/// ```
pub struct CursorMut<'a, K, V> {
    tree: &'a mut RawTreeMap<K, V>,
    position: Position,
}

impl<'a, K, V> CursorMut<'a, K, V> {
    pub(crate) fn new(tree: &'a mut RawTreeMap<K, V>, position: Position) -> Self {
        Self { tree, position }
    }

    pub(crate) fn position(&self) -> Position {
        self.position
    }

    /// Returns `true` if this is the past-the-end cursor.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.position.is_end()
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
        self.entry_mut().ok().map(|(_, value)| value)
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
        let handle = self.position.handle().ok_or(MapError::IteratorOutOfRange)?;
        Ok(self.tree.entry_mut(handle))
    }

    /// Converts the cursor into a mutable reference to the value under it, with
    /// the lifetime of the map borrow.
    ///
    /// # Errors
    ///
    /// [`MapError::IteratorOutOfRange`] at the end.
    pub fn into_value_mut(self) -> Result<&'a mut V> {
        self.into_entry_mut().map(|(_, value)| value)
    }

    /// Converts the cursor into the entry under it, with the lifetime of the map borrow.
    ///
    /// # Errors
    ///
    /// [`MapError::IteratorOutOfRange`] at the end.
    pub fn into_entry_mut(self) -> Result<(&'a K, &'a mut V)> {
        let handle = self.position.handle().ok_or(MapError::IteratorOutOfRange)?;
        Ok(self.tree.entry_mut(handle))
    }

    /// Moves to the next key.
    ///
    /// # Errors
    ///
    /// [`MapError::IteratorOutOfRange`] if the cursor is already at the end.
    pub fn move_next(&mut self) -> Result<()> {
        self.position.advance(self.tree)
    }

    /// Moves to the previous key; from the end this is the largest key.
    ///
    /// # Errors
    ///
    /// [`MapError::IteratorOutOfRange`] if the cursor is at the first key, or the
    /// map is empty.
    pub fn move_prev(&mut self) -> Result<()> {
        self.position.retreat(self.tree)
    }

    /// Removes the entry under the cursor and returns it.
    ///
    /// The cursor moves to the entry that followed the removed one (or to the end).
    /// When the removed node had two children its in-order successor's entry is
    /// moved into that node, which is where the cursor then points.
    ///
    /// # Errors
    ///
    /// [`MapError::KeyNotFound`] if the cursor is at the end; the map is unchanged.
    pub fn remove_current(&mut self) -> Result<(K, V)> {
        let handle = self.position.handle().ok_or(MapError::KeyNotFound)?;
        let (entry, next) = self.tree.remove_at(handle);
        self.position = Position::at(next);
        Ok(entry)
    }

    /// Returns a read-only cursor at the same position, borrowing this one.
    pub fn as_cursor(&self) -> Cursor<'_, K, V> {
        Cursor::new(self.tree, self.position)
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for CursorMut<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CursorMut").field(&self.entry().ok()).finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use crate::{MapError, OrderedMap};
    use alloc::vec::Vec;

    fn scenario() -> OrderedMap<i32, char> {
        [(5, 'e'), (3, 'c'), (8, 'h'), (1, 'a'), (4, 'd'), (7, 'g'), (9, 'i')].into_iter().collect()
    }

    #[test]
    fn walks_forward_then_back() {
        let map = scenario();
        let mut cursor = map.begin();
        let mut forward = Vec::new();
        while let Some(key) = cursor.key() {
            forward.push(*key);
            cursor.move_next().unwrap();
        }
        assert_eq!(forward, [1, 3, 4, 5, 7, 8, 9]);
        assert_eq!(cursor.move_next(), Err(MapError::IteratorOutOfRange));
        assert_eq!(cursor, map.end());

        let mut backward = Vec::new();
        while cursor.move_prev().is_ok() {
            backward.push(*cursor.key().unwrap());
        }
        assert_eq!(backward, [9, 8, 7, 5, 4, 3, 1]);
        assert_eq!(cursor, map.begin());
    }

    #[test]
    fn empty_map_has_begin_equal_to_end() {
        let map: OrderedMap<i32, i32> = OrderedMap::new();
        let mut cursor = map.begin();
        assert_eq!(cursor, map.end());
        assert_eq!(cursor.move_prev(), Err(MapError::IteratorOutOfRange));
        assert_eq!(cursor.move_next(), Err(MapError::IteratorOutOfRange));
        assert!(cursor.is_end());
    }

    #[test]
    fn cursors_of_different_maps_differ() {
        let a = scenario();
        let b = scenario();
        assert_ne!(a.end(), b.end());
    }

    #[test]
    fn removing_a_two_child_node_lands_on_its_successor() {
        let mut map = scenario();
        let mut cursor = map.find_mut(&8);
        assert_eq!(cursor.remove_current(), Ok((8, 'h')));
        assert_eq!(cursor.entry(), Ok((&9, &'i')));
        cursor.move_prev().unwrap();
        assert_eq!(cursor.key(), Some(&7));
        map.raw.check_invariants();
    }

    #[test]
    fn removing_at_end_fails_without_changes() {
        let mut map = scenario();
        let mut cursor = map.end_mut();
        assert_eq!(cursor.remove_current(), Err(MapError::KeyNotFound));
        assert_eq!(map.len(), 7);
    }

    #[test]
    fn draining_through_a_cursor() {
        let mut map = scenario();
        let mut cursor = map.begin_mut();
        let mut removed = Vec::new();
        while !cursor.is_end() {
            removed.push(cursor.remove_current().unwrap().0);
        }
        assert_eq!(removed, [1, 3, 4, 5, 7, 8, 9]);
        assert!(map.is_empty());
        map.raw.check_invariants();
    }
}
