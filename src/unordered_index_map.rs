//! An open-addressing hash map specialised for `u32` keys.

use core::fmt;
use core::iter::FusedIterator;
use core::mem;
use core::ops::Index;

use crate::error::{Error, Result};
use crate::index_map::impl_index_map;
use crate::raw::{Slots, slots};

/// Smallest bucket array the map allocates.
pub const MIN_BUCKETS: usize = 8;

/// The map grows before `len / bucket_count` would exceed
/// `LOAD_FACTOR_NUM / LOAD_FACTOR_DEN`.
pub const LOAD_FACTOR_NUM: usize = 3;
/// See [`LOAD_FACTOR_NUM`].
pub const LOAD_FACTOR_DEN: usize = 4;

/// Bucket count for a map expected to hold `capacity` entries.
fn buckets_for(capacity: usize) -> usize {
    (capacity.saturating_mul(LOAD_FACTOR_DEN) / LOAD_FACTOR_NUM)
        .next_power_of_two()
        .max(MIN_BUCKETS)
}

/// Fx-style multiplicative hash. The xor-shift folds the high half of the key
/// into the low half first, so keys that differ only above bit 16 do not all
/// land in the same bucket.
#[inline]
#[allow(clippy::cast_possible_truncation)]
fn hash(key: u32) -> usize {
    let k = u64::from(key);
    let k = k ^ (k >> 16);
    k.wrapping_mul(0x517c_c1b7_2722_0a95) as usize
}

/// Outcome of probing for a key.
enum Probe {
    Found(usize),
    Vacant(usize),
}

/// A hash map from `u32` keys using linear probing.
///
/// This is the baseline the direct-addressed layouts are measured against.
/// Any `u32` key is accepted; the construction argument is a capacity hint.
/// The bucket count is a power of two, at least [`MIN_BUCKETS`], and doubles
/// whenever an insertion would push the load above 3/4. Removal uses
/// backward-shift deletion, so there are no tombstones and probe sequences
/// never cross an empty bucket.
///
/// Iteration follows bucket order, which is unrelated to key order and may
/// change after any mutation.
///
/// # Examples
///
/// ```
/// use index_maps::UnorderedIndexMap;
///
/// let mut map = UnorderedIndexMap::new(0);
/// assert_eq!(map.bucket_count(), 8);
///
/// for key in 0..100 {
///     map.insert(key * 1_000_003, key).unwrap();
/// }
/// assert_eq!(map.len(), 100);
/// assert_eq!(map.bucket_count(), 256);
/// assert_eq!(map.get(42 * 1_000_003), Some(&42));
/// ```
#[derive(Clone)]
pub struct UnorderedIndexMap<V> {
    buckets: Slots<(u32, V)>,
    mask: usize,
}

impl<V> UnorderedIndexMap<V> {
    /// Creates an empty map sized for `capacity` entries.
    ///
    /// # Panics
    ///
    /// Panics if the bucket array cannot be allocated. See [`try_new`](Self::try_new).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        match Self::try_new(capacity) {
            Ok(map) => map,
            Err(err) => panic!("`UnorderedIndexMap::new()` - {err}"),
        }
    }

    /// Creates an empty map sized for `capacity` entries.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailure`] if the bucket array cannot be allocated.
    pub fn try_new(capacity: usize) -> Result<Self> {
        let count = buckets_for(capacity);
        let buckets = Slots::try_new(count)?;
        log::debug!("allocated UnorderedIndexMap with {count} buckets for {capacity} entries");
        Ok(Self {
            buckets,
            mask: count - 1,
        })
    }

    /// Returns the number of entries.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Returns `true` if the map has no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Number of buckets currently allocated.
    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.capacity()
    }

    /// Bytes of heap storage owned by the map.
    #[must_use]
    pub fn heap_size(&self) -> usize {
        self.buckets.heap_size()
    }

    #[inline]
    fn home(&self, key: u32) -> usize {
        hash(key) & self.mask
    }

    #[inline]
    const fn next(&self, bucket: usize) -> usize {
        (bucket + 1) & self.mask
    }

    fn probe(&self, key: u32) -> Probe {
        let mut bucket = self.home(key);
        loop {
            match self.buckets.get(bucket) {
                None => return Probe::Vacant(bucket),
                Some(&(k, _)) if k == key => return Probe::Found(bucket),
                Some(_) => bucket = self.next(bucket),
            }
        }
    }

    fn find(&self, key: u32) -> Option<usize> {
        match self.probe(key) {
            Probe::Found(bucket) => Some(bucket),
            Probe::Vacant(_) => None,
        }
    }

    #[inline]
    fn needs_grow(&self) -> bool {
        (self.len() + 1) * LOAD_FACTOR_DEN > self.bucket_count() * LOAD_FACTOR_NUM
    }

    /// First vacant bucket on the probe run of `key`.
    fn first_vacant(&self, key: u32) -> usize {
        let mut bucket = self.home(key);
        while self.buckets.get(bucket).is_some() {
            bucket = self.next(bucket);
        }
        bucket
    }

    /// Doubles the bucket array and rehashes every entry into it.
    ///
    /// The new array is allocated before anything moves, so on failure the
    /// map is left as it was.
    fn try_grow(&mut self) -> Result<()> {
        let count = self.bucket_count() * 2;
        let old = mem::replace(&mut self.buckets, Slots::try_new(count)?);
        self.mask = count - 1;
        for (key, value) in old.into_values() {
            let bucket = self.first_vacant(key);
            self.buckets.insert(bucket, (key, value));
        }
        log::debug!("grew UnorderedIndexMap to {count} buckets holding {} entries", self.len());
        Ok(())
    }

    /// A vacant bucket for `key`, which must not be present. Grows first if
    /// one more entry would exceed the load factor.
    fn vacant_bucket(&mut self, key: u32, probed: usize) -> Result<usize> {
        if !self.needs_grow() {
            return Ok(probed);
        }
        self.try_grow()?;
        Ok(self.first_vacant(key))
    }

    /// Returns a reference to the value for `key`.
    ///
    /// # Complexity
    ///
    /// Expected O(1)
    #[must_use]
    pub fn get(&self, key: u32) -> Option<&V> {
        let bucket = self.find(key)?;
        self.buckets.get(bucket).map(|(_, value)| value)
    }

    /// Returns a mutable reference to the value for `key`.
    pub fn get_mut(&mut self, key: u32) -> Option<&mut V> {
        let bucket = self.find(key)?;
        self.buckets.get_mut(bucket).map(|(_, value)| value)
    }

    /// Returns `true` if the map has an entry for `key`.
    #[must_use]
    pub fn contains_key(&self, key: u32) -> bool {
        self.find(key).is_some()
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
    /// [`Error::AllocationFailure`] if the table needs to grow and the larger
    /// bucket array cannot be allocated.
    ///
    /// # Complexity
    ///
    /// Expected amortized O(1)
    pub fn insert(&mut self, key: u32, value: V) -> Result<Option<V>> {
        let bucket = match self.probe(key) {
            Probe::Found(bucket) => bucket,
            Probe::Vacant(probed) => self.vacant_bucket(key, probed)?,
        };
        Ok(self.buckets.insert(bucket, (key, value)).map(|(_, old)| old))
    }

    /// Returns the value for `key`, inserting `f()` first if there is none.
    ///
    /// # Errors
    ///
    /// Same as [`insert`](Self::insert).
    pub fn get_or_insert_with<F: FnOnce() -> V>(&mut self, key: u32, f: F) -> Result<&mut V> {
        let bucket = match self.probe(key) {
            Probe::Found(bucket) => bucket,
            Probe::Vacant(probed) => self.vacant_bucket(key, probed)?,
        };
        Ok(&mut self.buckets.get_or_insert_with(bucket, || (key, f())).1)
    }

    /// Removes the entry for `key`, returning its value.
    ///
    /// Entries later in the probe run are shifted back into the hole when
    /// their home bucket allows it.
    ///
    /// # Complexity
    ///
    /// Expected O(1)
    pub fn remove(&mut self, key: u32) -> Option<V> {
        let bucket = self.find(key)?;
        let (_, value) = self.buckets.remove(bucket)?;

        let mut empty = bucket;
        let mut next = self.next(bucket);
        while let Some(&(moved, _)) = self.buckets.get(next) {
            let home = self.home(moved);
            // `empty` may take the entry only if it lies cyclically in `home..next`.
            let can_move = if home <= next {
                home <= empty && empty < next
            } else {
                home <= empty || empty < next
            };
            if can_move {
                if let Some(entry) = self.buckets.remove(next) {
                    self.buckets.insert(empty, entry);
                }
                empty = next;
            }
            next = self.next(next);
        }
        Some(value)
    }

    /// Removes every entry, keeping the bucket array.
    pub fn clear(&mut self) {
        self.buckets.clear();
    }

    /// Iterates over the entries in bucket order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            inner: self.buckets.iter(),
        }
    }

    /// Iterates over the entries in bucket order, with mutable values.
    pub fn iter_mut(&mut self) -> IterMut<'_, V> {
        IterMut {
            inner: self.buckets.iter_mut(),
        }
    }

    /// Iterates over the keys in bucket order.
    pub fn keys(&self) -> impl ExactSizeIterator<Item = u32> {
        self.iter().map(|(key, _)| key)
    }

    /// Iterates over the values in bucket order.
    pub fn values(&self) -> impl ExactSizeIterator<Item = &V> {
        self.iter().map(|(_, value)| value)
    }
}

impl_index_map!(UnorderedIndexMap, Iter, ordered: false, bounded: false);

impl<V> Default for UnorderedIndexMap<V> {
    fn default() -> Self {
        Self::new(0)
    }
}

impl<V: fmt::Debug> fmt::Debug for UnorderedIndexMap<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Two maps are equal if they hold the same entries, regardless of bucket layout.
impl<V: PartialEq> PartialEq for UnorderedIndexMap<V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<V> Index<u32> for UnorderedIndexMap<V> {
    type Output = V;

    fn index(&self, key: u32) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<'a, V> IntoIterator for &'a UnorderedIndexMap<V> {
    type Item = (u32, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Iter<'a, V> {
        self.iter()
    }
}

impl<'a, V> IntoIterator for &'a mut UnorderedIndexMap<V> {
    type Item = (u32, &'a mut V);
    type IntoIter = IterMut<'a, V>;

    fn into_iter(self) -> IterMut<'a, V> {
        self.iter_mut()
    }
}

/// An iterator over the entries of an [`UnorderedIndexMap`], in bucket order.
///
/// This `struct` is created by [`UnorderedIndexMap::iter`].
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, V> {
    inner: slots::Iter<'a, (u32, V)>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (u32, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, (key, value))| (*key, value))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
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

/// A mutable iterator over the entries of an [`UnorderedIndexMap`].
///
/// This `struct` is created by [`UnorderedIndexMap::iter_mut`].
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct IterMut<'a, V> {
    inner: slots::IterMut<'a, (u32, V)>,
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = (u32, &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, (key, value))| (*key, value))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<V> ExactSizeIterator for IterMut<'_, V> {}

impl<V> Default for IterMut<'_, V> {
    fn default() -> Self {
        Self {
            inner: slots::IterMut::default(),
        }
    }
}

impl<V> FusedIterator for IterMut<'_, V> {}

impl<V> fmt::Debug for IterMut<'_, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterMut").field("remaining", &self.inner.len()).finish()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::collections::BTreeMap;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    /// Every entry is reachable from its home bucket without crossing a
    /// vacant bucket.
    fn assert_no_holes<V>(map: &UnorderedIndexMap<V>) {
        for (bucket, (key, _)) in map.buckets.iter() {
            let mut probe = map.home(*key);
            while probe != bucket {
                assert!(map.buckets.get(probe).is_some(), "hole before key {key} at bucket {probe}");
                probe = map.next(probe);
            }
        }
    }

    /// Keys whose home bucket is `home` in a table of `buckets` buckets.
    fn colliding_keys(buckets: usize, home: usize, count: usize) -> Vec<u32> {
        (0u32..).filter(|&key| hash(key) & (buckets - 1) == home).take(count).collect()
    }

    #[test]
    fn bucket_count_for_hint() {
        assert_eq!(UnorderedIndexMap::<()>::new(0).bucket_count(), 8);
        assert_eq!(UnorderedIndexMap::<()>::new(6).bucket_count(), 8);
        assert_eq!(UnorderedIndexMap::<()>::new(7).bucket_count(), 16);
        assert_eq!(UnorderedIndexMap::<()>::new(100).bucket_count(), 256);
    }

    #[test]
    fn grows_before_load_exceeds_three_quarters() {
        let mut map = UnorderedIndexMap::new(0);
        for key in 0..6 {
            map.insert(key, ()).unwrap();
        }
        assert_eq!(map.bucket_count(), 8);
        map.insert(6, ()).unwrap();
        assert_eq!(map.bucket_count(), 16);
        assert_eq!(map.len(), 7);
        assert!((0..7).all(|key| map.contains_key(key)));
        assert_no_holes(&map);
    }

    #[test]
    fn overwrite_does_not_grow() {
        let mut map = UnorderedIndexMap::new(0);
        for key in 0..6 {
            map.insert(key, 0).unwrap();
        }
        assert_eq!(map.insert(5, 1), Ok(Some(0)));
        assert_eq!(map.bucket_count(), 8);
    }

    #[test]
    fn colliding_keys_survive_removal() {
        let keys = colliding_keys(8, 3, 5);
        let mut map = UnorderedIndexMap::new(0);
        for &key in &keys {
            map.insert(key, key).unwrap();
        }
        assert_eq!(map.bucket_count(), 8);

        assert_eq!(map.remove(keys[1]), Some(keys[1]));
        assert_no_holes(&map);
        assert_eq!(map.remove(keys[0]), Some(keys[0]));
        assert_no_holes(&map);
        for &key in &keys[2..] {
            assert_eq!(map.get(key), Some(&key));
        }
        assert_eq!(map.get(keys[0]), None);
        assert_eq!(map.len(), 3);
    }

    #[test]
    fn probe_run_wraps_around() {
        let keys = colliding_keys(8, 7, 4);
        let mut map = UnorderedIndexMap::new(0);
        for &key in &keys {
            map.insert(key, ()).unwrap();
        }
        assert_no_holes(&map);
        map.remove(keys[0]);
        assert_no_holes(&map);
        assert!(keys[1..].iter().all(|&key| map.contains_key(key)));
    }

    #[test]
    fn clear_keeps_buckets() {
        let mut map = UnorderedIndexMap::new(0);
        for key in 0..100 {
            map.insert(key, key).unwrap();
        }
        let buckets = map.bucket_count();
        map.clear();
        assert!(map.is_empty());
        assert_eq!(map.bucket_count(), buckets);
        assert_eq!(map.iter().count(), 0);
    }

    #[test]
    fn equality_ignores_bucket_layout() {
        let mut small = UnorderedIndexMap::new(0);
        let mut large = UnorderedIndexMap::new(1_000);
        for key in [9, 1, 400] {
            small.insert(key, key).unwrap();
            large.insert(key, key).unwrap();
        }
        assert_eq!(small, large);
    }

    proptest! {
        #[test]
        fn behaves_like_btreemap(operations in prop::collection::vec((any::<bool>(), 0u32..48), 0..512)) {
            let mut map = UnorderedIndexMap::new(0);
            let mut model = BTreeMap::new();
            for (insert, key) in operations {
                if insert {
                    prop_assert_eq!(map.insert(key, key).unwrap(), model.insert(key, key));
                } else {
                    prop_assert_eq!(map.remove(key), model.remove(&key));
                }
                prop_assert_eq!(map.len(), model.len());
                assert_no_holes(&map);
            }
            let mut entries: Vec<_> = map.iter().map(|(key, &value)| (key, value)).collect();
            entries.sort_unstable();
            prop_assert!(entries.into_iter().eq(model.into_iter()));
        }
    }
}
