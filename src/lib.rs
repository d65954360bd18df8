//! Associative containers for bounded unsigned integer keys.
//!
//! Every map in this crate stores values of any type `V` under `u32` keys and
//! exposes the same operations through the [`IndexMap`] trait. They differ in
//! memory layout, and therefore in what is cheap:
//!
//! | Map                    | Layout                                                | Iteration order   |
//! |------------------------|-------------------------------------------------------|-------------------|
//! | [`SparseDirectMap`]    | one slot per key of `0..key_range`                    | ascending key     |
//! | [`TwoLevelMap`]        | blocks of [`BLOCK_LEN`] slots, allocated on demand    | ascending key     |
//! | [`FlatIndexMap`]       | dense entry vector plus a key-to-position index       | storage order     |
//! | [`FlatSortedMap`]      | entry vector sorted by key                            | ascending key     |
//! | [`UnorderedIndexMap`]  | open-addressing hash table                            | bucket order      |
//!
//! The first three are range-bounded: they are built for keys in
//! `0..key_range` and reject larger keys with [`Error::KeyOutOfRange`]. The
//! other two accept every `u32` and treat the construction argument as a
//! capacity hint.
//!
//! # Example
//!
//! ```
//! use index_maps::{Error, IndexMap, TwoLevelMap};
//!
//! let mut map = TwoLevelMap::new(10);
//! map.insert(2, 3.5).unwrap();
//! map.insert(5, 123.0).unwrap();
//! *map.get_or_insert_default(9).unwrap() = 7.0;
//!
//! assert_eq!(map.at(5), Ok(&123.0));
//! assert_eq!(map.at(3), Err(Error::KeyNotFound { key: 3 }));
//! assert_eq!(map.keys().collect::<Vec<_>>(), [2, 5, 9]);
//!
//! map.remove(2);
//! assert_eq!(map.len(), 2);
//! ```
//!
//! # Borrowing
//!
//! References and iterators borrow the map, so a map cannot be changed while
//! they are alive. To mutate based on a scan, collect what you need first:
//!
//! ```
//! use index_maps::FlatIndexMap;
//!
//! let mut map = FlatIndexMap::new(100);
//! for key in 0..100 {
//!     map.insert(key, key % 7).unwrap();
//! }
//!
//! let zeros: Vec<u32> = map.iter().filter(|(_, value)| **value == 0).map(|(key, _)| key).collect();
//! for key in zeros {
//!     map.remove(key);
//! }
//! assert!(map.values().all(|value| *value != 0));
//! ```
//!
//! [`BLOCK_LEN`]: two_level_map::BLOCK_LEN

#![no_std]
#![forbid(unsafe_code)]
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
mod index_map;
mod raw;

pub mod flat_index_map;
pub mod flat_sorted_map;
pub mod sparse_direct_map;
pub mod two_level_map;
pub mod unordered_index_map;

pub use error::{Error, Result};
pub use flat_index_map::FlatIndexMap;
pub use flat_sorted_map::FlatSortedMap;
pub use index_map::IndexMap;
pub use sparse_direct_map::SparseDirectMap;
pub use two_level_map::TwoLevelMap;
pub use unordered_index_map::UnorderedIndexMap;
