//! A direct-addressed map whose slot array is split into lazily allocated blocks.

use alloc::vec::Vec;
use core::fmt;
use core::iter::{Enumerate, FusedIterator};
use core::mem;
use core::ops::Index;
use core::slice;

use crate::error::{Error, Result};
use crate::index_map::impl_index_map;
use crate::raw::{KeyRange, Slots, key_of, slots};

/// log2 of the number of keys covered by one block.
pub const BLOCK_BITS: u32 = 6;

/// Number of keys covered by one block.
pub const BLOCK_LEN: usize = 1 << BLOCK_BITS;

const OFFSET_MASK: usize = BLOCK_LEN - 1;

/// A two-level direct-addressed map over the keys `0..key_range`.
///
/// The key range is cut into blocks of [`BLOCK_LEN`] consecutive keys. The
/// map keeps one optional block per range; a block is allocated the first
/// time a key inside it is inserted and released as soon as its last entry is
/// removed. Memory therefore follows the number of *occupied blocks* instead
/// of the whole key range, while every keyed operation stays O(1) with one
/// extra indirection compared to [`SparseDirectMap`](crate::SparseDirectMap).
///
/// Iteration yields entries in ascending key order, skipping unallocated
/// blocks entirely.
///
/// # Examples
///
/// ```
/// use index_maps::TwoLevelMap;
///
/// let mut map = TwoLevelMap::new(10_000_000);
/// map.insert(7, 0.25).unwrap();
/// map.insert(9_999_999, 0.5).unwrap();
/// assert_eq!(map.allocated_blocks(), 2);
///
/// assert_eq!(map.remove(7), Some(0.25));
/// assert_eq!(map.allocated_blocks(), 1);
///
/// let entries: Vec<_> = map.iter().collect();
/// assert_eq!(entries, [(9_999_999, &0.5)]);
/// ```
#[derive(Clone, PartialEq)]
pub struct TwoLevelMap<V> {
    range: KeyRange,
    blocks: Vec<Option<Slots<V>>>,
    allocated: usize,
    len: usize,
}

#[inline]
const fn split(index: usize) -> (usize, usize) {
    (index >> BLOCK_BITS, index & OFFSET_MASK)
}

impl<V> TwoLevelMap<V> {
    /// Creates an empty map accepting keys in `0..key_range`.
    ///
    /// Only the outer block table is allocated up front.
    ///
    /// # Panics
    ///
    /// Panics if the block table cannot be allocated. See [`try_new`](Self::try_new).
    #[must_use]
    pub fn new(key_range: usize) -> Self {
        match Self::try_new(key_range) {
            Ok(map) => map,
            Err(err) => panic!("`TwoLevelMap::new()` - {err}"),
        }
    }

    /// Creates an empty map accepting keys in `0..key_range`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailure`] if the block table cannot be allocated.
    pub fn try_new(key_range: usize) -> Result<Self> {
        let block_count = key_range.div_ceil(BLOCK_LEN);
        let mut blocks = Vec::new();
        blocks.try_reserve_exact(block_count)?;
        blocks.resize_with(block_count, || None);
        log::debug!("allocated TwoLevelMap table of {block_count} blocks of {BLOCK_LEN} slots");
        Ok(Self {
            range: KeyRange::new(key_range),
            blocks,
            allocated: 0,
            len: 0,
        })
    }

    /// The exclusive upper bound on keys.
    #[must_use]
    pub const fn key_range(&self) -> usize {
        self.range.len()
    }

    /// Returns the number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the map has no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of blocks currently allocated.
    #[must_use]
    pub const fn allocated_blocks(&self) -> usize {
        self.allocated
    }

    /// Bytes of heap storage owned by the map: the block table plus every
    /// allocated block.
    #[must_use]
    pub fn heap_size(&self) -> usize {
        self.blocks.capacity() * mem::size_of::<Option<Slots<V>>>()
            + self.allocated * BLOCK_LEN * mem::size_of::<Option<V>>()
    }

    /// Returns a reference to the value for `key`, or `None` if absent or out
    /// of range.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn get(&self, key: u32) -> Option<&V> {
        let (block, offset) = split(self.range.index(key)?);
        self.blocks[block].as_ref()?.get(offset)
    }

    /// Returns a mutable reference to the value for `key`.
    pub fn get_mut(&mut self, key: u32) -> Option<&mut V> {
        let (block, offset) = split(self.range.index(key)?);
        self.blocks[block].as_mut()?.get_mut(offset)
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
    /// if there is no entry (including when its block is not allocated).
    pub fn at(&self, key: u32) -> Result<&V> {
        let (block, offset) = split(self.range.check(key)?);
        self.blocks[block]
            .as_ref()
            .and_then(|block| block.get(offset))
            .ok_or(Error::KeyNotFound { key })
    }

    /// Inserts `value` under `key`, returning the value it replaced.
    ///
    /// Allocates the key's block if it does not exist yet.
    ///
    /// # Errors
    ///
    /// [`Error::KeyOutOfRange`] if `key >= key_range`,
    /// [`Error::AllocationFailure`] if a new block cannot be allocated.
    ///
    /// # Complexity
    ///
    /// O(1), plus O([`BLOCK_LEN`]) when a block is allocated.
    pub fn insert(&mut self, key: u32, value: V) -> Result<Option<V>> {
        let (block, offset) = split(self.range.check(key)?);
        let old = Self::block_mut(&mut self.blocks, &mut self.allocated, block)?.insert(offset, value);
        if old.is_none() {
            self.len += 1;
        }
        Ok(old)
    }

    /// Returns the value for `key`, inserting `f()` first if there is none.
    ///
    /// # Errors
    ///
    /// Same as [`insert`](Self::insert).
    ///
    /// # Examples
    ///
    /// ```
    /// use index_maps::TwoLevelMap;
    ///
    /// let mut map = TwoLevelMap::new(10);
    /// *map.get_or_insert_with(7, || 0.0).unwrap() = -2.9;
    /// assert_eq!(map.get(7), Some(&-2.9));
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn get_or_insert_with<F: FnOnce() -> V>(&mut self, key: u32, f: F) -> Result<&mut V> {
        let (block, offset) = split(self.range.check(key)?);
        let slots = Self::block_mut(&mut self.blocks, &mut self.allocated, block)?;
        if slots.get(offset).is_none() {
            self.len += 1;
        }
        Ok(slots.get_or_insert_with(offset, f))
    }

    /// Removes the entry for `key`, returning its value, and releases the
    /// key's block if it became empty. Absent and out-of-range keys are
    /// ignored.
    ///
    /// # Complexity
    ///
    /// O(1)
    pub fn remove(&mut self, key: u32) -> Option<V> {
        let (block, offset) = split(self.range.index(key)?);
        let slots = self.blocks[block].as_mut()?;
        let old = slots.remove(offset)?;
        self.len -= 1;
        if slots.is_empty() {
            self.blocks[block] = None;
            self.allocated -= 1;
            log::trace!("released block {block} ({} blocks live)", self.allocated);
        }
        Some(old)
    }

    /// Removes every entry and releases every block.
    ///
    /// # Complexity
    ///
    /// O(`key_range` / [`BLOCK_LEN`])
    pub fn clear(&mut self) {
        self.blocks.fill_with(|| None);
        self.allocated = 0;
        self.len = 0;
    }

    /// Iterates over the entries in ascending key order.
    ///
    /// # Complexity
    ///
    /// O(`key_range` / [`BLOCK_LEN`] + allocated blocks × [`BLOCK_LEN`]) for a
    /// full scan.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            blocks: self.blocks.iter().enumerate(),
            base: 0,
            block: slots::Iter::default(),
            remaining: self.len,
        }
    }

    /// Iterates over the entries in ascending key order, with mutable values.
    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        IterMut {
            blocks: self.blocks.iter_mut().enumerate(),
            base: 0,
            block: slots::IterMut::default(),
            remaining: self.len,
        }
    }

    /// Iterates over the keys in ascending order.
    pub fn keys(&self) -> impl ExactSizeIterator<Item = u32> {
        self.iter().map(|(key, _)| key)
    }

    /// Iterates over the values in ascending key order.
    pub fn values(&self) -> impl ExactSizeIterator<Item = &V> {
        self.iter().map(|(_, value)| value)
    }

    /// Returns block `block`, allocating it if necessary.
    fn block_mut<'a>(
        blocks: &'a mut [Option<Slots<V>>],
        allocated: &mut usize,
        block: usize,
    ) -> Result<&'a mut Slots<V>> {
        let slot = &mut blocks[block];
        match slot {
            Some(slots) => Ok(slots),
            None => {
                let slots = Slots::try_new(BLOCK_LEN)?;
                *allocated += 1;
                log::trace!("allocated block {block} ({allocated} blocks live)");
                Ok(slot.insert(slots))
            }
        }
    }
}

impl_index_map!(TwoLevelMap, Iter, ordered: true, bounded: true);

impl<V: fmt::Debug> fmt::Debug for TwoLevelMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<V> Index<u32> for TwoLevelMap<V> {
    type Output = V;

    fn index(&self, key: u32) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<'a, V> IntoIterator for &'a TwoLevelMap<V> {
    type Item = (u32, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Iter<'a, V> {
        self.iter()
    }
}

impl<'a, V> IntoIterator for &'a mut TwoLevelMap<V> {
    type Item = (u32, &'a mut V);
    type IntoIter = IterMut<'a, V>;

    fn into_iter(self) -> IterMut<'a, V> {
        self.iter_mut()
    }
}

/// An iterator over the entries of a [`TwoLevelMap`], in ascending key order.
///
/// This `struct` is created by [`TwoLevelMap::iter`].
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, V> {
    blocks: Enumerate<slice::Iter<'a, Option<Slots<V>>>>,
    base: usize,
    block: slots::Iter<'a, V>,
    remaining: usize,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (u32, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        loop {
            if let Some((offset, value)) = self.block.next() {
                self.remaining -= 1;
                return Some((key_of(self.base + offset), value));
            }
            let (block, slots) = self.blocks.find_map(|(block, slots)| Some((block, slots.as_ref()?)))?;
            self.base = block << BLOCK_BITS;
            self.block = slots.iter();
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<V> FusedIterator for Iter<'_, V> {}

impl<V> Clone for Iter<'_, V> {
    fn clone(&self) -> Self {
        Self {
            blocks: self.blocks.clone(),
            base: self.base,
            block: self.block.clone(),
            remaining: self.remaining,
        }
    }
}

impl<V: fmt::Debug> fmt::Debug for Iter<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

/// A mutable iterator over the entries of a [`TwoLevelMap`], in ascending key order.
///
/// This `struct` is created by [`TwoLevelMap::iter_mut`].
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct IterMut<'a, V> {
    blocks: Enumerate<slice::IterMut<'a, Option<Slots<V>>>>,
    base: usize,
    block: slots::IterMut<'a, V>,
    remaining: usize,
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = (u32, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        loop {
            if let Some((offset, value)) = self.block.next() {
                self.remaining -= 1;
                return Some((key_of(self.base + offset), value));
            }
            let (block, slots) = self.blocks.find_map(|(block, slots)| Some((block, slots.as_mut()?)))?;
            self.base = block << BLOCK_BITS;
            self.block = slots.iter_mut();
        }
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for IterMut<'_, V> {}

impl<V> FusedIterator for IterMut<'_, V> {}

impl<V> fmt::Debug for IterMut<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterMut").field("remaining", &self.remaining).finish()
    }
}
