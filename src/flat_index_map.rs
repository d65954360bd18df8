//! A dense entry vector with a direct-addressed key index.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;
use core::iter::FusedIterator;
use core::mem;
use core::ops::Index;
use core::slice;

use crate::error::{Error, Result};
use crate::index_map::impl_index_map;
use crate::raw::{KeyRange, Position};

/// A map over the keys `0..key_range` storing its entries contiguously.
///
/// Entries live in one `Vec<(u32, V)>`; a second array of `key_range`
/// positions maps every key to its entry (or to nothing). Lookup, insertion
/// and removal are O(1), and scans walk a dense array with no holes.
///
/// Entries are appended, so iteration follows insertion order *until the first
/// removal*: `remove` moves the last entry into the vacated position to keep
/// the storage dense, which reorders the remaining entries.
///
/// # Examples
///
/// ```
/// use index_maps::FlatIndexMap;
///
/// let mut map = FlatIndexMap::new(100);
/// map.insert(30, 'a').unwrap();
/// map.insert(10, 'b').unwrap();
/// map.insert(20, 'c').unwrap();
/// assert_eq!(map.as_slice(), [(30, 'a'), (10, 'b'), (20, 'c')]);
///
/// // The last entry fills the hole left by the removed one.
/// map.remove(30);
/// assert_eq!(map.as_slice(), [(20, 'c'), (10, 'b')]);
/// assert_eq!(map.get(20), Some(&'c'));
/// ```
#[derive(Clone)]
pub struct FlatIndexMap<V> {
    range: KeyRange,
    index: Box<[Option<Position>]>,
    entries: Vec<(u32, V)>,
}

impl<V> FlatIndexMap<V> {
    /// Creates an empty map accepting keys in `0..key_range`.
    ///
    /// # Panics
    ///
    /// Panics if the key index cannot be allocated. See [`try_new`](Self::try_new).
    #[must_use]
    pub fn new(key_range: usize) -> Self {
        match Self::try_new(key_range) {
            Ok(map) => map,
            Err(err) => panic!("`FlatIndexMap::new()` - {err}"),
        }
    }

    /// Creates an empty map accepting keys in `0..key_range`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailure`] if the key index cannot be allocated.
    pub fn try_new(key_range: usize) -> Result<Self> {
        let mut index = Vec::new();
        index.try_reserve_exact(key_range)?;
        index.resize(key_range, None);
        log::debug!(
            "allocated FlatIndexMap index with {key_range} slots ({} bytes)",
            key_range * mem::size_of::<Option<Position>>()
        );
        Ok(Self {
            range: KeyRange::new(key_range),
            index: index.into_boxed_slice(),
            entries: Vec::new(),
        })
    }

    /// The exclusive upper bound on keys.
    #[must_use]
    pub const fn key_range(&self) -> usize {
        self.range.len()
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

    /// Bytes of heap storage owned by the map: the key index plus the entry
    /// vector's capacity.
    #[must_use]
    pub fn heap_size(&self) -> usize {
        self.index.len() * mem::size_of::<Option<Position>>() + self.entries.capacity() * mem::size_of::<(u32, V)>()
    }

    /// The entries, in storage order.
    #[must_use]
    pub fn as_slice(&self) -> &[(u32, V)] {
        &self.entries
    }

    /// Releases spare capacity of the entry vector.
    pub fn shrink_to_fit(&mut self) {
        self.entries.shrink_to_fit();
    }

    #[inline]
    fn position(&self, key: u32) -> Option<usize> {
        let position = self.index[self.range.index(key)?]?;
        Some(position.to_index())
    }

    /// Returns a reference to the value for `key`, or `None` if absent or out
    /// of range.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn get(&self, key: u32) -> Option<&V> {
        let position = self.position(key)?;
        Some(&self.entries[position].1)
    }

    /// Returns a mutable reference to the value for `key`.
    pub fn get_mut(&mut self, key: u32) -> Option<&mut V> {
        let position = self.position(key)?;
        Some(&mut self.entries[position].1)
    }

    /// Returns `true` if the map has an entry for `key`.
    #[must_use]
    pub fn contains_key(&self, key: u32) -> bool {
        self.position(key).is_some()
    }

    /// Returns the value for `key`.
    ///
    /// # Errors
    ///
    /// [`Error::KeyOutOfRange`] if `key >= key_range`, [`Error::KeyNotFound`]
    /// if there is no entry.
    pub fn at(&self, key: u32) -> Result<&V> {
        let slot = self.range.check(key)?;
        match self.index[slot] {
            Some(position) => Ok(&self.entries[position.to_index()].1),
            None => Err(Error::KeyNotFound { key }),
        }
    }

    /// Inserts `value` under `key`, returning the value it replaced.
    ///
    /// A new key is appended to the entry vector; an existing key keeps its
    /// position.
    ///
    /// # Errors
    ///
    /// [`Error::KeyOutOfRange`] if `key >= key_range`,
    /// [`Error::AllocationFailure`] if the entry vector cannot grow.
    ///
    /// # Complexity
    ///
    /// Amortized O(1)
    pub fn insert(&mut self, key: u32, value: V) -> Result<Option<V>> {
        let slot = self.range.check(key)?;
        if let Some(position) = self.index[slot] {
            return Ok(Some(mem::replace(&mut self.entries[position.to_index()].1, value)));
        }
        self.push(slot, key, value)?;
        Ok(None)
    }

    /// Returns the value for `key`, appending `(key, f())` first if there is none.
    ///
    /// # Errors
    ///
    /// Same as [`insert`](Self::insert).
    pub fn get_or_insert_with<F: FnOnce() -> V>(&mut self, key: u32, f: F) -> Result<&mut V> {
        let slot = self.range.check(key)?;
        let position = match self.index[slot] {
            Some(position) => position.to_index(),
            None => self.push(slot, key, f())?,
        };
        Ok(&mut self.entries[position].1)
    }

    /// Appends a new entry and records its position under `slot`.
    fn push(&mut self, slot: usize, key: u32, value: V) -> Result<usize> {
        self.entries.try_reserve(1)?;
        let position = self.entries.len();
        self.index[slot] = Some(Position::from_index(position));
        self.entries.push((key, value));
        Ok(position)
    }

    /// Removes the entry for `key`, returning its value. Absent and
    /// out-of-range keys are ignored.
    ///
    /// The last entry is moved into the removed entry's position.
    ///
    /// # Complexity
    ///
    /// O(1)
    pub fn remove(&mut self, key: u32) -> Option<V> {
        let slot = self.range.index(key)?;
        let position = self.index[slot].take()?.to_index();
        let (_, value) = self.entries.swap_remove(position);
        if let Some(&(moved, _)) = self.entries.get(position) {
            self.index[moved as usize] = Some(Position::from_index(position));
        }
        Some(value)
    }

    /// Removes every entry, keeping the allocated storage.
    ///
    /// # Complexity
    ///
    /// O(n)
    pub fn clear(&mut self) {
        for (key, _) in self.entries.drain(..) {
            self.index[key as usize] = None;
        }
    }

    /// Iterates over the entries in storage order.
    ///
    /// # Complexity
    ///
    /// O(n) for a full scan.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            inner: self.entries.iter(),
        }
    }

    /// Iterates over the entries in storage order, with mutable values.
    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        IterMut {
            inner: self.entries.iter_mut(),
        }
    }

    /// Iterates over the keys in storage order.
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = u32> + ExactSizeIterator {
        self.entries.iter().map(|&(key, _)| key)
    }

    /// Iterates over the values in storage order.
    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> + ExactSizeIterator {
        self.entries.iter().map(|(_, value)| value)
    }
}

impl_index_map!(FlatIndexMap, Iter, ordered: false, bounded: true);

impl<V: fmt::Debug> fmt::Debug for FlatIndexMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Two maps are equal if they hold the same entries, in any order.
impl<V: PartialEq> PartialEq for FlatIndexMap<V> {
    fn eq(&self, other: &Self) -> bool {
        self.key_range() == other.key_range()
            && self.len() == other.len()
            && self.iter().all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<V> Index<u32> for FlatIndexMap<V> {
    type Output = V;

    fn index(&self, key: u32) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<'a, V> IntoIterator for &'a FlatIndexMap<V> {
    type Item = (u32, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Iter<'a, V> {
        self.iter()
    }
}

impl<'a, V> IntoIterator for &'a mut FlatIndexMap<V> {
    type Item = (u32, &'a mut V);
    type IntoIter = IterMut<'a, V>;

    fn into_iter(self) -> IterMut<'a, V> {
        self.iter_mut()
    }
}

/// An iterator over the entries of a [`FlatIndexMap`], in storage order.
///
/// This `struct` is created by [`FlatIndexMap::iter`].
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

/// A mutable iterator over the entries of a [`FlatIndexMap`], in storage order.
///
/// This `struct` is created by [`FlatIndexMap::iter_mut`].
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
