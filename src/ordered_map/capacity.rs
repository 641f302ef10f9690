use super::OrderedMap;
use crate::raw::RawTreeMap;

impl<K, V> OrderedMap<K, V> {
    /// Creates an empty map with room for at least `capacity` entries before
    /// the node storage reallocates.
    ///
    /// # Examples
    ///
    /// ```
    /// use bst_maps::OrderedMap;
    ///
    /// let map: OrderedMap<i32, i32> = OrderedMap::with_capacity(32);
    /// assert!(map.is_empty());
    /// assert!(map.capacity() >= 32);
    /// ```
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        OrderedMap {
            raw: RawTreeMap::with_capacity(capacity),
        }
    }

    /// Returns how many entries the map can hold without reallocating its node storage.
    ///
    /// Slots freed by removals are reused before the storage grows.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.raw.capacity()
    }
}
