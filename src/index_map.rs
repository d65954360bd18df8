use crate::error::Result;

/// The operations shared by every map in this crate.
///
/// Each map implements these as inherent methods as well; the trait exists so
/// that benchmark drivers and tests can be written once, generic over the
/// layout, and monomorphized per map with no dynamic dispatch on the lookup
/// path.
///
/// Keys are `u32`. Range-bounded maps ([`SparseDirectMap`], [`TwoLevelMap`],
/// [`FlatIndexMap`]) accept keys in `0..key_range` and reject the rest with
/// [`Error::KeyOutOfRange`]; the others accept every key and treat the
/// construction argument as a capacity hint.
///
/// # Examples
///
/// ```
/// use index_maps::{FlatSortedMap, IndexMap, SparseDirectMap, TwoLevelMap};
///
/// fn total<M: IndexMap<Value = f64>>(entries: &[(u32, f64)]) -> f64 {
///     let mut map = M::with_key_range(100);
///     for &(key, value) in entries {
///         map.insert(key, value).unwrap();
///     }
///     map.values().sum()
/// }
///
/// let entries = [(3, 1.5), (42, 2.0), (3, 0.5)];
/// assert_eq!(total::<SparseDirectMap<f64>>(&entries), 2.5);
/// assert_eq!(total::<TwoLevelMap<f64>>(&entries), 2.5);
/// assert_eq!(total::<FlatSortedMap<f64>>(&entries), 2.5);
/// ```
///
/// [`SparseDirectMap`]: crate::SparseDirectMap
/// [`TwoLevelMap`]: crate::TwoLevelMap
/// [`FlatIndexMap`]: crate::FlatIndexMap
/// [`Error::KeyOutOfRange`]: crate::Error::KeyOutOfRange
pub trait IndexMap: Sized {
    /// The stored value type.
    type Value;

    /// Iterator over `(key, &value)` pairs returned by [`iter`](IndexMap::iter).
    type Iter<'a>: Iterator<Item = (u32, &'a Self::Value)> + ExactSizeIterator
    where
        Self: 'a;

    /// `true` if [`iter`](IndexMap::iter) always yields keys in ascending order.
    const ORDERED: bool;

    /// Creates an empty map for keys in `0..key_range` (a capacity hint for
    /// unbounded maps).
    ///
    /// # Panics
    ///
    /// Panics if the initial allocation fails.
    fn with_key_range(key_range: usize) -> Self;

    /// Fallible counterpart of [`with_key_range`](IndexMap::with_key_range).
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailure`](crate::Error::AllocationFailure)
    /// if the initial allocation fails.
    fn try_with_key_range(key_range: usize) -> Result<Self>;

    /// The exclusive upper bound on keys, or `None` if every `u32` is accepted.
    fn key_range(&self) -> Option<usize>;

    /// Number of entries.
    fn len(&self) -> usize;

    /// `true` if the map holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the value stored for `key`, if any. Never fails.
    fn get(&self, key: u32) -> Option<&Self::Value>;

    /// Returns a mutable reference to the value stored for `key`, if any.
    fn get_mut(&mut self, key: u32) -> Option<&mut Self::Value>;

    /// `true` if an entry exists for `key`.
    fn contains_key(&self, key: u32) -> bool {
        self.get(key).is_some()
    }

    /// Returns the value stored for `key`, treating absence as an error.
    ///
    /// # Errors
    ///
    /// [`Error::KeyOutOfRange`](crate::Error::KeyOutOfRange) if the map is
    /// range-bounded and `key` is outside it, otherwise
    /// [`Error::KeyNotFound`](crate::Error::KeyNotFound) if there is no entry.
    fn at(&self, key: u32) -> Result<&Self::Value>;

    /// Inserts or overwrites the entry for `key`, returning the previous value.
    ///
    /// # Errors
    ///
    /// [`Error::KeyOutOfRange`](crate::Error::KeyOutOfRange) for keys outside
    /// a bounded map's range, [`Error::AllocationFailure`](crate::Error::AllocationFailure)
    /// if storage cannot grow. The map is unchanged on error.
    fn insert(&mut self, key: u32, value: Self::Value) -> Result<Option<Self::Value>>;

    /// Returns the value for `key`, inserting `f()` first if there is none.
    ///
    /// # Errors
    ///
    /// Same as [`insert`](IndexMap::insert).
    fn get_or_insert_with<F: FnOnce() -> Self::Value>(&mut self, key: u32, f: F) -> Result<&mut Self::Value>;

    /// Indexed write access: `*map.get_or_insert_default(k)? = v` stores `v`
    /// under `k` whether or not `k` was present.
    ///
    /// # Errors
    ///
    /// Same as [`insert`](IndexMap::insert).
    fn get_or_insert_default(&mut self, key: u32) -> Result<&mut Self::Value>
    where
        Self::Value: Default,
    {
        self.get_or_insert_with(key, Default::default)
    }

    /// Removes the entry for `key`, returning its value. Removing an absent
    /// key is a no-op.
    fn remove(&mut self, key: u32) -> Option<Self::Value>;

    /// Removes every entry.
    fn clear(&mut self);

    /// Iterates over every entry.
    fn iter(&self) -> Self::Iter<'_>;

    /// Iterates over every key, in the same order as [`iter`](IndexMap::iter).
    fn keys(&self) -> impl Iterator<Item = u32> {
        self.iter().map(|(key, _)| key)
    }

    /// Iterates over every value, in the same order as [`iter`](IndexMap::iter).
    fn values(&self) -> impl Iterator<Item = &Self::Value> {
        self.iter().map(|(_, value)| value)
    }

    /// Bytes of heap storage currently owned by the map.
    fn heap_size(&self) -> usize;
}

/// Implements [`IndexMap`] for a map type by delegating to its inherent methods.
macro_rules! impl_index_map {
    ($map:ident, $iter:ident, ordered: $ordered:tt, bounded: $bounded:tt) => {
        impl<V> $crate::IndexMap for $map<V> {
            type Value = V;
            type Iter<'a>
                = $iter<'a, V>
            where
                Self: 'a;

            const ORDERED: bool = $ordered;

            #[inline]
            fn with_key_range(key_range: usize) -> Self {
                Self::new(key_range)
            }

            #[inline]
            fn try_with_key_range(key_range: usize) -> $crate::Result<Self> {
                Self::try_new(key_range)
            }

            #[inline]
            fn key_range(&self) -> Option<usize> {
                $crate::index_map::impl_index_map!(@key_range self, $bounded)
            }

            #[inline]
            fn len(&self) -> usize {
                Self::len(self)
            }

            #[inline]
            fn get(&self, key: u32) -> Option<&V> {
                Self::get(self, key)
            }

            #[inline]
            fn get_mut(&mut self, key: u32) -> Option<&mut V> {
                Self::get_mut(self, key)
            }

            #[inline]
            fn at(&self, key: u32) -> $crate::Result<&V> {
                Self::at(self, key)
            }

            #[inline]
            fn insert(&mut self, key: u32, value: V) -> $crate::Result<Option<V>> {
                Self::insert(self, key, value)
            }

            #[inline]
            fn get_or_insert_with<F: FnOnce() -> V>(&mut self, key: u32, f: F) -> $crate::Result<&mut V> {
                Self::get_or_insert_with(self, key, f)
            }

            #[inline]
            fn remove(&mut self, key: u32) -> Option<V> {
                Self::remove(self, key)
            }

            #[inline]
            fn clear(&mut self) {
                Self::clear(self);
            }

            #[inline]
            fn iter(&self) -> $iter<'_, V> {
                Self::iter(self)
            }

            #[inline]
            fn heap_size(&self) -> usize {
                Self::heap_size(self)
            }
        }
    };
    (@key_range $this:ident, true) => {
        Some($this.key_range())
    };
    (@key_range $this:ident, false) => {
        None
    };
}

pub(crate) use impl_index_map;
