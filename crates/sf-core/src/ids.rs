use core::fmt;
use core::num::NonZeroU32;

/// Compact identifier for a block slot in a system.
///
/// - `u32` keeps memory small
/// - `NonZero` enables `Option<BlockId>` to be pointer-optimized
///
/// A system hands ids out densely in insertion order and never recycles them,
/// so an id that has been freed keeps pointing at nothing.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(NonZeroU32);

impl BlockId {
    /// Create an id from a 0-based index by storing index+1.
    pub fn from_index(index: u32) -> Self {
        // index+1 must be nonzero
        Self(NonZeroU32::new(index.saturating_add(1)).unwrap_or(NonZeroU32::MAX))
    }

    /// Recover the 0-based index.
    pub fn index(self) -> u32 {
        self.0.get() - 1
    }

    /// The index as a `usize`, for arena lookups.
    pub fn slot(self) -> usize {
        self.index() as usize
    }
}

impl From<u32> for BlockId {
    fn from(index: u32) -> Self {
        Self::from_index(index)
    }
}

impl fmt::Debug for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlockId({})", self.index())
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_round_trip_index() {
        for i in [0_u32, 1, 2, 42, 10_000] {
            let id = BlockId::from_index(i);
            assert_eq!(id.index(), i);
            assert_eq!(id.slot(), i as usize);
        }
    }

    #[test]
    fn option_id_is_small() {
        assert_eq!(
            core::mem::size_of::<BlockId>(),
            core::mem::size_of::<Option<BlockId>>()
        );
    }

    #[test]
    fn display_shows_index() {
        assert_eq!(BlockId::from_index(7).to_string(), "7");
    }
}
