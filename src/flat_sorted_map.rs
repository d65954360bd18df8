//! A map stored as one vector of entries sorted by key.

use alloc::vec::Vec;
use core::fmt;
use core::iter::FusedIterator;
use core::mem;
use core::ops::{Bound, Index, RangeBounds};
use core::slice;

use crate::error::{Error, Result};
use crate::index_map::impl_index_map;

/// Panics on the same inverted ranges `BTreeMap::range` rejects.
fn validate_range_bounds<R: RangeBounds<u32>>(range: &R) {
    if let (Bound::Included(start) | Bound::Excluded(start), Bound::Included(end) | Bound::Excluded(end)) =
        (range.start_bound(), range.end_bound())
    {
        let valid = if matches!(range.start_bound(), Bound::Excluded(_)) && matches!(range.end_bound(), Bound::Excluded(_))
        {
            start < end
        } else {
            start <= end
        };
        assert!(valid, "range start is greater than range end in FlatSortedMap");
    }
}

/// An ordered map kept as a sorted `Vec<(u32, V)>`.
///
/// Lookups binary-search the entries; inserting a new key or removing one
/// shifts the tail of the vector. This is the most compact layout in the crate
/// and the fastest to scan, at the price of O(n) mutation.
///
/// Every `u32` key is accepted. The construction argument only reserves
/// capacity.
///
/// # Examples
///
/// ```
/// use index_maps::FlatSortedMap;
///
/// let mut map = FlatSortedMap::new(0);
/// for key in [40, 10, 30, 20] {
///     map.insert(key, key * 2).unwrap();
/// }
///
/// assert_eq!(map.first_key_value(), Some((10, &20)));
/// assert_eq!(map.last_key_value(), Some((40, &80)));
///
/// let middle: Vec<_> = map.range(15..=30).map(|(key, _)| key).collect();
/// assert_eq!(middle, [20, 30]);
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct FlatSortedMap<V> {
    entries: Vec<(u32, V)>,
}

impl<V> FlatSortedMap<V> {
    /// Creates an empty map with room for `capacity` entries.
    ///
    /// # Panics
    ///
    /// Panics if the reservation fails. See [`try_new`](Self::try_new).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        match Self::try_new(capacity) {
            Ok(map) => map,
            Err(err) => panic!("`FlatSortedMap::new()` - {err}"),
        }
    }

    /// Creates an empty map with room for `capacity` entries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailure`] if the reservation fails.
    pub fn try_new(capacity: usize) -> Result<Self> {
        let mut entries = Vec::new();
        entries.try_reserve(capacity)?;
        if capacity > 0 {
            log::debug!("reserved FlatSortedMap storage for {capacity} entries");
        }
        Ok(Self { entries })
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bytes of heap storage owned by the map.
    #[must_use]
    pub fn heap_size(&self) -> usize {
        self.entries.capacity() * mem::size_of::<(u32, V)>()
    }

    /// The entries, in ascending key order.
    #[must_use]
    pub fn as_slice(&self) -> &[(u32, V)] {
        &self.entries
    }

    /// Releases spare capacity.
    pub fn shrink_to_fit(&mut self) {
        self.entries.shrink_to_fit();
    }

    #[inline]
    fn search(&self, key: u32) -> core::result::Result<usize, usize> {
        self.entries.binary_search_by_key(&key, |&(k, _)| k)
    }

    /// Returns a reference to the value for `key`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    #[must_use]
    pub fn get(&self, key: u32) -> Option<&V> {
        let position = self.search(key).ok()?;
        Some(&self.entries[position].1)
    }

    /// Returns a mutable reference to the value for `key`.
    pub fn get_mut(&mut self, key: u32) -> Option<&mut V> {
        let position = self.search(key).ok()?;
        Some(&mut self.entries[position].1)
    }

    /// Returns `true` if the map has an entry for `key`.
    #[must_use]
    pub fn contains_key(&self, key: u32) -> bool {
        self.search(key).is_ok()
    }

    /// Returns the value for `key`.
    ///
    /// # Errors
    ///
    /// [`Error::KeyNotFound`] if there is no entry.
    pub fn at(&self, key: u32) -> Result<&V> {
        self.get(key).ok_or(Error::KeyNotFound { key })
    }

    /// Inserts `value` under `key`, returning the value it replaced.
    ///
    /// # Errors
    ///
    /// [`Error::AllocationFailure`] if a new entry needs room the vector
    /// cannot reserve.
    ///
    /// # Complexity
    ///
    /// O(log n) to overwrite, O(n) to add a key.
    pub fn insert(&mut self, key: u32, value: V) -> Result<Option<V>> {
        match self.search(key) {
            Ok(position) => Ok(Some(mem::replace(&mut self.entries[position].1, value))),
            Err(position) => {
                self.entries.try_reserve(1)?;
                self.entries.insert(position, (key, value));
                Ok(None)
            }
        }
    }

    /// Returns the value for `key`, inserting `f()` at its sorted position
    /// first if there is none.
    ///
    /// # Errors
    ///
    /// Same as [`insert`](Self::insert).
    pub fn get_or_insert_with<F: FnOnce() -> V>(&mut self, key: u32, f: F) -> Result<&mut V> {
        let position = match self.search(key) {
            Ok(position) => position,
            Err(position) => {
                self.entries.try_reserve(1)?;
                self.entries.insert(position, (key, f()));
                position
            }
        };
        Ok(&mut self.entries[position].1)
    }

    /// Removes the entry for `key`, returning its value.
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn remove(&mut self, key: u32) -> Option<V> {
        let position = self.search(key).ok()?;
        Some(self.entries.remove(position).1)
    }

    /// Removes every entry, keeping the allocated storage.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// The entry with the smallest key.
    #[must_use]
    pub fn first_key_value(&self) -> Option<(u32, &V)> {
        self.entries.first().map(|(key, value)| (*key, value))
    }

    /// The entry with the largest key.
    #[must_use]
    pub fn last_key_value(&self) -> Option<(u32, &V)> {
        self.entries.last().map(|(key, value)| (*key, value))
    }

    /// Iterates over the entries in ascending key order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            inner: self.entries.iter(),
        }
    }

    /// Iterates over the entries in ascending key order, with mutable values.
    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        IterMut {
            inner: self.entries.iter_mut(),
        }
    }

    /// Iterates over the entries whose keys fall in `range`, in ascending key
    /// order.
    ///
    /// # Panics
    ///
    /// Panics if range `start > end`, or if `start == end` and both bounds
    /// are `Excluded`.
    ///
    /// # Complexity
    ///
    /// O(log n) to locate the bounds.
    ///
    /// # Examples
    ///
    /// ```
    /// use core::ops::Bound::{Excluded, Unbounded};
    /// use index_maps::FlatSortedMap;
    ///
    /// let mut map = FlatSortedMap::new(8);
    /// for key in 0..8 {
    ///     map.insert(key * 10, ()).unwrap();
    /// }
    /// let keys: Vec<_> = map.range((Excluded(40), Unbounded)).map(|(key, _)| key).collect();
    /// assert_eq!(keys, [50, 60, 70]);
    /// ```
    pub fn range<R: RangeBounds<u32>>(&self, range: R) -> Iter<'_, V> {
        validate_range_bounds(&range);
        let start = match range.start_bound() {
            Bound::Included(&start) => self.entries.partition_point(|&(key, _)| key < start),
            Bound::Excluded(&start) => self.entries.partition_point(|&(key, _)| key <= start),
            Bound::Unbounded => 0,
        };
        let end = match range.end_bound() {
            Bound::Included(&end) => self.entries.partition_point(|&(key, _)| key <= end),
            Bound::Excluded(&end) => self.entries.partition_point(|&(key, _)| key < end),
            Bound::Unbounded => self.entries.len(),
        };
        Iter {
            inner: self.entries[start..end].iter(),
        }
    }

    /// Iterates over the keys in ascending order.
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = u32> + ExactSizeIterator {
        self.entries.iter().map(|&(key, _)| key)
    }

    /// Iterates over the values in ascending key order.
    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> + ExactSizeIterator {
        self.entries.iter().map(|(_, value)| value)
    }
}

impl_index_map!(FlatSortedMap, Iter, ordered: true, bounded: false);

impl<V> Default for FlatSortedMap<V> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<V: fmt::Debug> fmt::Debug for FlatSortedMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<V> Index<u32> for FlatSortedMap<V> {
    type Output = V;

    fn index(&self, key: u32) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<'a, V> IntoIterator for &'a FlatSortedMap<V> {
    type Item = (u32, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Iter<'a, V> {
        self.iter()
    }
}

impl<'a, V> IntoIterator for &'a mut FlatSortedMap<V> {
    type Item = (u32, &'a mut V);
    type IntoIter = IterMut<'a, V>;

    fn into_iter(self) -> IterMut<'a, V> {
        self.iter_mut()
    }
}

/// An iterator over the entries of a [`FlatSortedMap`], in ascending key order.
///
/// This `struct` is created by [`FlatSortedMap::iter`] and [`FlatSortedMap::range`].
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, V> {
    inner: slice::Iter<'a, (u32, V)>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (u32, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, value)| (*key, value))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> DoubleEndedIterator for Iter<'_, V> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(key, value)| (*key, value))
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
            inner: <&[(u32, V)]>::default().iter(),
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for Iter<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// A mutable iterator over the entries of a [`FlatSortedMap`].
///
/// This `struct` is created by [`FlatSortedMap::iter_mut`].
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct IterMut<'a, V> {
    inner: slice::IterMut<'a, (u32, V)>,
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = (u32, &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, value)| (*key, value))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> DoubleEndedIterator for IterMut<'_, V> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(key, value)| (*key, value))
    }
}

impl<V> ExactSizeIterator for IterMut<'_, V> {}

impl<V> FusedIterator for IterMut<'_, V> {}

impl<V> fmt::Debug for IterMut<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterMut").field("remaining", &self.inner.len()).finish()
    }
}
