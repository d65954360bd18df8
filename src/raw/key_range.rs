use crate::error::{Error, Result};

/// The exclusive upper bound on keys accepted by a range-bounded map.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(transparent)]
pub(crate) struct KeyRange(usize);

impl KeyRange {
    #[inline]
    pub(crate) const fn new(len: usize) -> Self {
        Self(len)
    }

    #[inline]
    pub(crate) const fn len(self) -> usize {
        self.0
    }

    /// Slot index of `key`, or `None` when `key` is outside the range.
    #[inline]
    pub(crate) const fn index(self, key: u32) -> Option<usize> {
        let index = key as usize;
        if index < self.0 { Some(index) } else { None }
    }

    #[inline]
    pub(crate) fn check(self, key: u32) -> Result<usize> {
        match self.index(key) {
            Some(index) => Ok(index),
            None => Err(Error::KeyOutOfRange { key, key_range: self.0 }),
        }
    }
}

/// Converts a slot index back into the key it was derived from.
///
/// Only called for occupied slots, which were all addressed by a `u32` key.
#[inline]
#[allow(clippy::cast_possible_truncation)]
pub(crate) const fn key_of(index: usize) -> u32 {
    debug_assert!(index <= u32::MAX as usize);
    index as u32
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_range_rejects_everything() {
        let range = KeyRange::new(0);
        assert_eq!(range.index(0), None);
        assert_eq!(range.check(0), Err(Error::KeyOutOfRange { key: 0, key_range: 0 }));
    }

    #[test]
    fn upper_bound_is_exclusive() {
        let range = KeyRange::new(10);
        assert_eq!(range.check(9), Ok(9));
        assert_eq!(range.check(10), Err(Error::KeyOutOfRange { key: 10, key_range: 10 }));
        assert_eq!(range.len(), 10);
    }

    proptest! {
        #[test]
        fn index_matches_bound(len in 0usize..1_000, key in 0u32..2_000) {
            let range = KeyRange::new(len);
            prop_assert_eq!(range.index(key).is_some(), (key as usize) < len);
            if let Some(index) = range.index(key) {
                prop_assert_eq!(key_of(index), key);
            }
        }
    }
}
