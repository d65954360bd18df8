//! A map with one slot per possible key.

use core::fmt;
use core::iter::FusedIterator;
use core::ops::Index;

use crate::error::{Error, Result};
use crate::index_map::impl_index_map;
use crate::raw::{KeyRange, Slots, key_of, slots};

/// A direct-addressed map over the keys `0..key_range`.
///
/// The map owns an array of `key_range` slots, each holding an optional value,
/// so every keyed operation is a single array access. The price is memory
/// proportional to the key range rather than to the number of entries, and
/// iteration that has to skip empty slots: a full scan costs O(`key_range`)
/// in the worst case (it stops once every entry has been visited).
///
/// Iteration yields entries in ascending key order.
///
/// # Examples
///
/// ```
/// use index_maps::SparseDirectMap;
///
/// let mut map = SparseDirectMap::new(10);
/// map.insert(2, 3.5).unwrap();
/// map.insert(9, 7.0).unwrap();
/// map.insert(5, 123.0).unwrap();
///
/// assert_eq!(map.get(5), Some(&123.0));
/// assert_eq!(map.len(), 3);
///
/// let keys: Vec<_> = map.keys().collect();
/// assert_eq!(keys, [2, 5, 9]);
///
/// // Keys outside the range are rejected rather than truncated.
/// assert!(map.insert(10, 1.0).is_err());
/// ```
///
/// Iterators borrow the map, so it cannot be modified mid-iteration:
///
/// ```compile_fail
/// use index_maps::SparseDirectMap;
///
/// let mut map = SparseDirectMap::new(10);
/// map.insert(1, 1.0).unwrap();
/// for (key, _) in map.iter() {
///     map.remove(key);
/// }
/// ```
#[derive(Clone, PartialEq)]
pub struct SparseDirectMap<V> {
    range: KeyRange,
    slots: Slots<V>,
}

impl<V> SparseDirectMap<V> {
    /// Creates an empty map accepting keys in `0..key_range`.
    ///
    /// A `key_range` of zero is allowed and yields a map that can never hold
    /// an entry.
    ///
    /// # Panics
    ///
    /// Panics if the slot array cannot be allocated. See [`try_new`](Self::try_new).
    ///
    /// # Complexity
    ///
    /// O(`key_range`)
    #[must_use]
    pub fn new(key_range: usize) -> Self {
        match Self::try_new(key_range) {
            Ok(map) => map,
            Err(err) => panic!("`SparseDirectMap::new()` - {err}"),
        }
    }

    /// Creates an empty map accepting keys in `0..key_range`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailure`] if the slot array cannot be allocated.
    ///
    /// # Examples
    ///
    /// ```
    /// use index_maps::SparseDirectMap;
    ///
    /// let map = SparseDirectMap::<f64>::try_new(1_000).unwrap();
    /// assert!(map.is_empty());
    /// assert!(SparseDirectMap::<f64>::try_new(usize::MAX).is_err());
    /// ```
    pub fn try_new(key_range: usize) -> Result<Self> {
        let slots = Slots::try_new(key_range)?;
        log::debug!("allocated SparseDirectMap with {key_range} slots ({} bytes)", slots.heap_size());
        Ok(Self {
            range: KeyRange::new(key_range),
            slots,
        })
    }

    /// The exclusive upper bound on keys.
    #[must_use]
    pub const fn key_range(&self) -> usize {
        self.range.len()
    }

    /// Returns the number of entries.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub const fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns `true` if the map has no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Bytes of heap storage owned by the map: one `Option<V>` per key.
    #[must_use]
    pub fn heap_size(&self) -> usize {
        self.slots.heap_size()
    }

    /// Returns a reference to the value for `key`, or `None` if absent or out
    /// of range.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn get(&self, key: u32) -> Option<&V> {
        self.slots.get(self.range.index(key)?)
    }

    /// Returns a mutable reference to the value for `key`.
    ///
    /// # Complexity
    ///
    /// O(1)
    pub fn get_mut(&mut self, key: u32) -> Option<&mut V> {
        self.slots.get_mut(self.range.index(key)?)
    }

    /// Returns `true` if the map has an entry for `key`.
    #[must_use]
    pub fn contains_key(&self, key: u32) -> bool {
        self.get(key).is_some()
    }

    /// Returns the value for `key`.
    ///
    /// # Errors
    ///
    /// [`Error::KeyOutOfRange`] if `key >= key_range`, [`Error::KeyNotFound`]
    /// if the slot is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use index_maps::{Error, SparseDirectMap};
    ///
    /// let mut map = SparseDirectMap::new(4);
    /// map.insert(1, "a").unwrap();
    /// assert_eq!(map.at(1), Ok(&"a"));
    /// assert_eq!(map.at(2), Err(Error::KeyNotFound { key: 2 }));
    /// assert_eq!(map.at(4), Err(Error::KeyOutOfRange { key: 4, key_range: 4 }));
    /// ```
    pub fn at(&self, key: u32) -> Result<&V> {
        self.slots.get(self.range.check(key)?).ok_or(Error::KeyNotFound { key })
    }

    /// Inserts `value` under `key`, returning the value it replaced.
    ///
    /// # Errors
    ///
    /// [`Error::KeyOutOfRange`] if `key >= key_range`.
    ///
    /// # Complexity
    ///
    /// O(1)
    pub fn insert(&mut self, key: u32, value: V) -> Result<Option<V>> {
        let index = self.range.check(key)?;
        Ok(self.slots.insert(index, value))
    }

    /// Returns the value for `key`, inserting `f()` first if the slot is empty.
    ///
    /// # Errors
    ///
    /// [`Error::KeyOutOfRange`] if `key >= key_range`.
    ///
    /// # Examples
    ///
    /// ```
    /// use index_maps::SparseDirectMap;
    ///
    /// let mut map = SparseDirectMap::new(10);
    /// *map.get_or_insert_with(9, || 0.0).unwrap() = 7.0;
    /// *map.get_or_insert_with(9, || 0.0).unwrap() += 1.0;
    /// assert_eq!(map[9], 8.0);
    /// ```
    pub fn get_or_insert_with<F: FnOnce() -> V>(&mut self, key: u32, f: F) -> Result<&mut V> {
        let index = self.range.check(key)?;
        Ok(self.slots.get_or_insert_with(index, f))
    }

    /// Removes the entry for `key`, returning its value. Absent and
    /// out-of-range keys are ignored.
    ///
    /// # Complexity
    ///
    /// O(1)
    pub fn remove(&mut self, key: u32) -> Option<V> {
        self.slots.remove(self.range.index(key)?)
    }

    /// Removes every entry, keeping the slot array.
    ///
    /// # Complexity
    ///
    /// O(`key_range`)
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Iterates over the entries in ascending key order.
    ///
    /// # Complexity
    ///
    /// O(`key_range`) for a full scan.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            inner: self.slots.iter(),
        }
    }

    /// Iterates over the entries in ascending key order, with mutable values.
    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        IterMut {
            inner: self.slots.iter_mut(),
        }
    }

    /// Iterates over the keys in ascending order.
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = u32> + ExactSizeIterator {
        self.iter().map(|(key, _)| key)
    }

    /// Iterates over the values in ascending key order.
    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> + ExactSizeIterator {
        self.iter().map(|(_, value)| value)
    }
}

impl_index_map!(SparseDirectMap, Iter, ordered: true, bounded: true);

impl<V: fmt::Debug> fmt::Debug for SparseDirectMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<V> Index<u32> for SparseDirectMap<V> {
    type Output = V;

    fn index(&self, key: u32) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<'a, V> IntoIterator for &'a SparseDirectMap<V> {
    type Item = (u32, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Iter<'a, V> {
        self.iter()
    }
}

impl<'a, V> IntoIterator for &'a mut SparseDirectMap<V> {
    type Item = (u32, &'a mut V);
    type IntoIter = IterMut<'a, V>;

    fn into_iter(self) -> IterMut<'a, V> {
        self.iter_mut()
    }
}

/// An iterator over the entries of a [`SparseDirectMap`], in ascending key order.
///
/// This `struct` is created by [`SparseDirectMap::iter`].
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, V> {
    inner: slots::Iter<'a, V>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (u32, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(index, value)| (key_of(index), value))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> DoubleEndedIterator for Iter<'_, V> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(index, value)| (key_of(index), value))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<V> FusedIterator for Iter<'_, V> {}

impl<V> Clone for Iter<'_, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<V> Default for Iter<'_, V> {
    fn default() -> Self {
        Self {
            inner: slots::Iter::default(),
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for Iter<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// A mutable iterator over the entries of a [`SparseDirectMap`].
///
/// This `struct` is created by [`SparseDirectMap::iter_mut`].
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct IterMut<'a, V> {
    inner: slots::IterMut<'a, V>,
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = (u32, &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(index, value)| (key_of(index), value))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for IterMut<'_, V> {}

impl<V> FusedIterator for IterMut<'_, V> {}

impl<V> fmt::Debug for IterMut<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterMut").field("remaining", &self.len()).finish()
    }
}
