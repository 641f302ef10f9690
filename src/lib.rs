//! Ordered maps built on a plain, unbalanced binary search tree.
//!
//! This crate provides two maps:
//!
//! - [`OrderedMap`] - a sorted key-value map stored as an unbalanced BST, with
//!   `BTreeMap`-style accessors plus failing lookups and bidirectional cursors
//! - [`BucketedMap`] - a fixed number `B` of [`OrderedMap`] buckets, with each
//!   integer key routed to bucket `key mod B`
//!
//! Both maps report failures through [`MapError`]: looking up in an empty map is
//! [`EmptyContainer`](MapError::EmptyContainer), a missing key is
//! [`KeyNotFound`](MapError::KeyNotFound), and stepping or dereferencing a cursor
//! outside `begin..=end` is [`IteratorOutOfRange`](MapError::IteratorOutOfRange).
//!
//! # Example
//!
//! ```
//! use bst_maps::{BucketedMap, MapError, OrderedMap};
//!
//! let mut scores = OrderedMap::new();
//! scores.insert("Carol", 92);
//! scores.insert("Alice", 100);
//! scores.insert("Bob", 85);
//!
//! // Iteration is sorted by key.
//! let names: Vec<_> = scores.keys().copied().collect();
//! assert_eq!(names, ["Alice", "Bob", "Carol"]);
//!
//! // Cursors walk both ways and refuse to leave the map.
//! let mut cursor = scores.find("Bob");
//! cursor.move_prev().unwrap();
//! assert_eq!(cursor.key(), Some(&"Alice"));
//! assert_eq!(cursor.move_prev(), Err(MapError::IteratorOutOfRange));
//!
//! // Bucketed iteration is grouped by `key mod B`, not sorted.
//! let buckets: BucketedMap<u32, (), 3> = (0..4).map(|k| (k, ())).collect();
//! let keys: Vec<_> = buckets.keys().copied().collect();
//! assert_eq!(keys, [0, 3, 1, 2]);
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`, no standard library dependency
//! - **No recursion** - Traversal, cloning and teardown never recurse, so a
//!   degenerate (list-shaped) tree cannot overflow the stack
//!
//! # Implementation
//!
//! Tree nodes live in an index arena and refer to their children and parent by
//! handle. Child links own the subtree; the parent link exists only so cursors
//! and iterators can climb back up. Values sit in a second arena so that a
//! mutable iterator can hand out `&mut V` without aliasing the tree links.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
// NOTE: `IterMut` needs unsafe code to hand out disjoint `&mut V` while walking the tree.
// #![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod error;
mod raw;

pub mod bucketed_map;
pub mod ordered_map;

pub use bucketed_map::{BucketCursor, BucketCursorMut, BucketKey, BucketedMap, DEFAULT_BUCKETS};
pub use error::{MapError, Result};
pub use ordered_map::{Cursor, CursorMut, OrderedMap};
