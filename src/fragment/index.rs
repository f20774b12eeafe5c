//! Zero-based fragment positioning within an encoded payload.
//!
//! Provides [`FragmentIndex`], a type-safe wrapper around `u32` that offers
//! overflow-safe increment operations for tracking fragment order.

use std::num::TryFromIntError;

use derive_more::{Display, From};

/// Zero-based ordinal describing a fragment's position within its payload.
///
/// # Examples
///
/// ```
/// use qrtransit::fragment::FragmentIndex;
/// let index = FragmentIndex::new(3);
/// assert_eq!(index.get(), 3);
/// assert_eq!(index.checked_increment(), Some(FragmentIndex::new(4)));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From)]
#[display("{_0}")]
pub struct FragmentIndex(u32);

impl FragmentIndex {
    /// Construct an index from a `u32` value.
    #[must_use]
    pub const fn new(value: u32) -> Self { Self(value) }

    /// Return the first valid fragment index.
    #[must_use]
    pub const fn zero() -> Self { Self(0) }

    /// Return the underlying numeric value.
    #[must_use]
    pub const fn get(self) -> u32 { self.0 }

    /// Return the value as a `usize` suitable for slice positions.
    #[must_use]
    pub const fn as_usize(self) -> usize { self.0 as usize }

    /// Increment the index, returning `None` on overflow.
    #[must_use]
    pub fn checked_increment(self) -> Option<Self> { self.0.checked_add(1).map(Self) }

    /// Iterate over every index below `count` in ascending order.
    pub fn range(count: u32) -> impl Iterator<Item = Self> { (0..count).map(Self) }
}

impl TryFrom<usize> for FragmentIndex {
    type Error = TryFromIntError;

    fn try_from(value: usize) -> Result<Self, Self::Error> { u32::try_from(value).map(Self) }
}

impl From<FragmentIndex> for u32 {
    fn from(value: FragmentIndex) -> Self { value.0 }
}
