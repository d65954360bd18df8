use core::num::NonZero;

#[cfg(test)]
type RawPosition = u16;
#[cfg(not(test))]
type RawPosition = u32;

/// Position of an entry in a dense entry vector, stored off-by-one so that
/// `Option<Position>` is the same size as the raw integer.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(transparent)]
pub(crate) struct Position(NonZero<RawPosition>);

impl Position {
    pub(crate) const MAX: usize = (RawPosition::MAX - 1) as usize;

    #[inline]
    #[allow(clippy::cast_possible_truncation)]
    pub(crate) const fn from_index(index: usize) -> Self {
        assert!(index <= Self::MAX, "`Position::from_index()` - `index` > `Position::MAX`!");
        match NonZero::new((index + 1) as RawPosition) {
            Some(raw) => Self(raw),
            None => unreachable!(),
        }
    }

    #[inline]
    pub(crate) const fn to_index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}
