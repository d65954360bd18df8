mod key_range;
mod position;
pub(crate) mod slots;

pub(crate) use key_range::{KeyRange, key_of};
pub(crate) use position::Position;
pub(crate) use slots::Slots;
