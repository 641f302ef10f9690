/// Errors reported by the fallible operations of [`OrderedMap`](crate::OrderedMap),
/// [`BucketedMap`](crate::BucketedMap) and their cursors.
#[derive(thiserror::Error, Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum MapError {
    /// A lookup or removal was attempted on a map with no elements.
    #[error("the map contains no elements")]
    EmptyContainer,

    /// A lookup or removal named a key that is not present.
    #[error("the key is not present in the map")]
    KeyNotFound,

    /// A cursor was stepped outside `begin..=end`, or an entry was read through
    /// the end sentinel.
    #[error("the cursor is out of range")]
    IteratorOutOfRange,
}

/// Result type for map and cursor operations.
pub type Result<T> = core::result::Result<T, MapError>;
