use alloc::collections::TryReserveError;

/// The error type for fallible map operations.
///
/// Probing a map with [`get`](crate::IndexMap::get) never fails; only the
/// operations that must report *why* they could not complete return an `Error`.
///
/// # Examples
///
/// ```
/// use index_maps::{Error, SparseDirectMap};
///
/// let mut map = SparseDirectMap::new(10);
/// map.insert(5, 123.0).unwrap();
///
/// assert_eq!(map.at(5), Ok(&123.0));
/// assert_eq!(map.at(3), Err(Error::KeyNotFound { key: 3 }));
/// assert_eq!(map.insert(10, 1.0), Err(Error::KeyOutOfRange { key: 10, key_range: 10 }));
/// ```
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    /// The key is valid for the map but has no entry.
    #[error("no entry found for key {key}")]
    KeyNotFound {
        /// The key that was looked up.
        key: u32,
    },

    /// The key lies outside the key range the map was constructed with.
    #[error("key {key} is outside the key range 0..{key_range}")]
    KeyOutOfRange {
        /// The rejected key.
        key: u32,
        /// The exclusive upper bound on keys.
        key_range: usize,
    },

    /// Growing the backing storage failed. The map is left unchanged.
    #[error("allocation failed: {0}")]
    AllocationFailure(#[from] TryReserveError),
}

/// A specialized [`Result`](core::result::Result) for map operations.
pub type Result<T> = core::result::Result<T, Error>;
