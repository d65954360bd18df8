use alloc::boxed::Box;
use alloc::collections::TryReserveError;
use alloc::vec::Vec;
use core::iter::{Enumerate, FusedIterator};
use core::mem;
use core::slice;

/// A fixed-length array of optional values with an occupancy count.
///
/// Shared by the direct-addressed layouts: `SparseDirectMap` keeps one
/// `Slots` over its whole key range, `TwoLevelMap` keeps one per block.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Slots<V> {
    slots: Box<[Option<V>]>,
    len: usize,
}

impl<V> Slots<V> {
    pub(crate) fn try_new(capacity: usize) -> Result<Self, TryReserveError> {
        let mut slots = Vec::new();
        slots.try_reserve_exact(capacity)?;
        slots.resize_with(capacity, || None);
        Ok(Self {
            slots: slots.into_boxed_slice(),
            len: 0,
        })
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bytes of slot storage owned by this array.
    pub(crate) fn heap_size(&self) -> usize {
        self.slots.len() * mem::size_of::<Option<V>>()
    }

    #[inline]
    pub(crate) fn get(&self, index: usize) -> Option<&V> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut V> {
        self.slots.get_mut(index).and_then(Option::as_mut)
    }

    /// Stores `value` at `index`, returning the value it replaced.
    ///
    /// `index` must be below `capacity()`.
    #[inline]
    pub(crate) fn insert(&mut self, index: usize, value: V) -> Option<V> {
        let old = self.slots[index].replace(value);
        if old.is_none() {
            self.len += 1;
        }
        old
    }

    /// `index` must be below `capacity()`.
    #[inline]
    pub(crate) fn get_or_insert_with<F: FnOnce() -> V>(&mut self, index: usize, f: F) -> &mut V {
        let slot = &mut self.slots[index];
        if slot.is_none() {
            self.len += 1;
        }
        slot.get_or_insert_with(f)
    }

    #[inline]
    pub(crate) fn remove(&mut self, index: usize) -> Option<V> {
        let old = self.slots.get_mut(index).and_then(Option::take);
        if old.is_some() {
            self.len -= 1;
        }
        old
    }

    pub(crate) fn clear(&mut self) {
        if self.len == 0 {
            return;
        }
        self.slots.fill_with(|| None);
        self.len = 0;
    }

    pub(crate) fn iter(&self) -> Iter<'_, V> {
        Iter {
            inner: self.slots.iter().enumerate(),
            remaining: self.len,
        }
    }

    pub(crate) fn iter_mut(&mut self) -> IterMut<'_, V> {
        IterMut {
            inner: self.slots.iter_mut().enumerate(),
            remaining: self.len,
        }
    }

    /// Consumes the array, yielding the occupied values in index order.
    pub(crate) fn into_values(self) -> impl Iterator<Item = V> {
        self.slots.into_vec().into_iter().flatten()
    }
}

/// Occupied `(index, &value)` pairs in ascending index order.
///
/// Stops scanning once every occupied slot has been yielded.
#[derive(Debug)]
pub(crate) struct Iter<'a, V> {
    inner: Enumerate<slice::Iter<'a, Option<V>>>,
    remaining: usize,
}

impl<V> Clone for Iter<'_, V> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            remaining: self.remaining,
        }
    }
}

impl<V> Default for Iter<'_, V> {
    fn default() -> Self {
        Self {
            inner: <&[Option<V>]>::default().iter().enumerate(),
            remaining: 0,
        }
    }
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (usize, &'a V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let (index, value) = self.inner.find_map(|(index, slot)| slot.as_ref().map(|value| (index, value)))?;
        self.remaining -= 1;
        Some((index, value))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> DoubleEndedIterator for Iter<'_, V> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        loop {
            if let (index, Some(value)) = self.inner.next_back()? {
                self.remaining -= 1;
                return Some((index, value));
            }
        }
    }
}

impl<V> ExactSizeIterator for Iter<'_, V> {}

impl<V> FusedIterator for Iter<'_, V> {}

/// Occupied `(index, &mut value)` pairs in ascending index order.
#[derive(Debug)]
pub(crate) struct IterMut<'a, V> {
    inner: Enumerate<slice::IterMut<'a, Option<V>>>,
    remaining: usize,
}

impl<V> Default for IterMut<'_, V> {
    fn default() -> Self {
        Self {
            inner: <&mut [Option<V>]>::default().iter_mut().enumerate(),
            remaining: 0,
        }
    }
}

impl<'a, V> Iterator for IterMut<'a, V> {
    type Item = (usize, &'a mut V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let (index, value) = self.inner.find_map(|(index, slot)| slot.as_mut().map(|value| (index, value)))?;
        self.remaining -= 1;
        Some((index, value))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<V> ExactSizeIterator for IterMut<'_, V> {}

impl<V> FusedIterator for IterMut<'_, V> {}
