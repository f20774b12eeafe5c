//! In-memory [`FragmentSource`] with fault injection.

use std::collections::{BTreeMap, BTreeSet};

use qrtransit::{FetchError, FragmentIndex, FragmentSource, SplitPayload};

/// Symbol texts keyed by ordinal, standing in for an artifact directory.
///
/// Tests can delete, overwrite or poison individual fragments and inspect
/// the order in which the reassembler requested them.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    symbols: BTreeMap<FragmentIndex, String>,
    unreadable: BTreeSet<FragmentIndex>,
    enumerable: bool,
    requests: Vec<FragmentIndex>,
}

impl MemorySource {
    /// Build a source holding every symbol of `split`.
    #[must_use]
    pub fn from_split(split: &SplitPayload) -> Self {
        Self {
            symbols: split.symbols().collect(),
            enumerable: true,
            ..Self::default()
        }
    }

    /// Stop reporting an inventory, so only lazy fetch failures surface.
    #[must_use]
    pub fn without_inventory(mut self) -> Self {
        self.enumerable = false;
        self
    }

    /// Delete the symbol at `index`.
    pub fn remove(&mut self, index: u32) -> Option<String> {
        self.symbols.remove(&FragmentIndex::new(index))
    }

    /// Replace or add the symbol at `index`.
    pub fn insert(&mut self, index: u32, text: impl Into<String>) {
        self.symbols.insert(FragmentIndex::new(index), text.into());
    }

    /// Make the artifact at `index` present but undecodable.
    pub fn poison(&mut self, index: u32) { self.unreadable.insert(FragmentIndex::new(index)); }

    /// Ordinals requested so far, in request order.
    #[must_use]
    pub fn requests(&self) -> &[FragmentIndex] { &self.requests }

    /// Symbol texts in ascending ordinal order.
    #[must_use]
    pub fn texts(&self) -> Vec<String> { self.symbols.values().cloned().collect() }
}

impl FragmentSource for MemorySource {
    fn fetch(&mut self, index: FragmentIndex) -> Result<String, FetchError> {
        self.requests.push(index);
        if self.unreadable.contains(&index) {
            return Err(FetchError::Unreadable("no symbol recognised".into()));
        }
        self.symbols.get(&index).cloned().ok_or(FetchError::Absent)
    }

    fn inventory(&self) -> Option<BTreeSet<FragmentIndex>> {
        self.enumerable
            .then(|| self.symbols.keys().chain(&self.unreadable).copied().collect())
    }
}
