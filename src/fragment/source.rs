//! Seam between the reassembler and wherever fragment text comes from.

use std::collections::BTreeSet;

use super::{FetchError, FragmentIndex};

/// Supplies the symbol text stored at a fragment ordinal.
///
/// Any `FnMut(FragmentIndex) -> Result<String, FetchError>` closure is a
/// source, which keeps unit tests free of filesystem fixtures.
pub trait FragmentSource {
    /// Return the text decoded from the artifact at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Absent`] when no artifact exists at `index` and
    /// [`FetchError::Unreadable`] when one exists but holds no symbol.
    fn fetch(&mut self, index: FragmentIndex) -> Result<String, FetchError>;

    /// Every ordinal the source can see without decoding anything.
    ///
    /// Sources that cannot enumerate return `None`, which skips the eager
    /// completeness check.
    fn inventory(&self) -> Option<BTreeSet<FragmentIndex>> { None }
}

impl<F> FragmentSource for F
where
    F: FnMut(FragmentIndex) -> Result<String, FetchError>,
{
    fn fetch(&mut self, index: FragmentIndex) -> Result<String, FetchError> { self(index) }
}
