//! Inbound helper that stitches fragments back into the original payload.
//!
//! [`Reassembler`] mirrors the outbound [`ChunkSplitter`](crate::fragment::ChunkSplitter).
//! It is driven entirely by a [`Manifest`]: the manifest decides how many
//! fragments to request, how they are framed and which transform to invert.
//! Reassembly is all-or-nothing; the first unresolved fragment aborts the
//! whole operation and no partial payload is returned.

use std::collections::{BTreeMap, BTreeSet, btree_map::Entry};

use sha2::{Digest, Sha256};

use super::{
    FetchError,
    FragmentIndex,
    FragmentSeries,
    FragmentSource,
    Framing,
    ReassemblyError,
    decode_frame,
};
use crate::manifest::Manifest;

/// Rebuilds payloads described by a [`Manifest`].
#[derive(Clone, Copy, Debug)]
pub struct Reassembler<'m> {
    manifest: &'m Manifest,
}

impl<'m> Reassembler<'m> {
    /// Create a reassembler for the payload `manifest` describes.
    #[must_use]
    pub const fn new(manifest: &'m Manifest) -> Self { Self { manifest } }

    /// Return the manifest driving this reassembler.
    #[must_use]
    pub const fn manifest(&self) -> &'m Manifest { self.manifest }

    /// Request every fragment from `source` in ascending index order and
    /// invert the transform over their concatenated text.
    ///
    /// When the source can enumerate its artifacts, completeness is checked
    /// before any fragment is read.
    ///
    /// # Errors
    ///
    /// Returns [`ReassemblyError::ManifestMismatch`] when the source holds
    /// artifacts beyond the declared count, [`ReassemblyError::MissingFragment`]
    /// for the first absent ordinal, [`ReassemblyError::UnreadableFragment`]
    /// when an artifact decodes to nothing, framing errors for tagged
    /// fragments, and [`ReassemblyError::Transform`] or
    /// [`ReassemblyError::Integrity`] when the recovered text or bytes are
    /// wrong.
    pub fn reassemble<S>(&self, source: &mut S) -> Result<Vec<u8>, ReassemblyError>
    where
        S: FragmentSource + ?Sized,
    {
        if let Some(found) = source.inventory() {
            self.check_inventory(&found)?;
        }

        let count = self.manifest.fragment_count().get();
        let mut series = FragmentSeries::new(count);
        // Grown from fetched bodies; the manifest's totals are not trusted for sizing.
        let mut text = String::new();

        for index in FragmentIndex::range(count) {
            let symbol = source.fetch(index).map_err(|err| match err {
                FetchError::Absent => ReassemblyError::MissingFragment(index),
                FetchError::Unreadable(reason) => {
                    ReassemblyError::UnreadableFragment { index, reason }
                }
            })?;
            let body = match self.manifest.framing() {
                Framing::Raw => symbol.as_str(),
                Framing::Tagged => {
                    let (header, body) = decode_frame(&symbol, index.as_usize())?;
                    series.accept(header)?;
                    body
                }
            };
            self.check_body_len(index, body)?;
            log::debug!("fragment {index}: {} characters", body.len());
            text.push_str(body);
        }

        self.finish(&text)
    }

    /// Rebuild the payload from tagged symbol texts supplied in any order.
    ///
    /// Each record's embedded ordinal places it; discovery order is ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ReassemblyError::UntaggedFragments`] for raw manifests,
    /// [`ReassemblyError::DuplicateFragment`] when two records claim one
    /// ordinal, [`ReassemblyError::MissingFragment`] for the lowest ordinal
    /// never supplied, plus the framing, transform and integrity errors of
    /// [`reassemble`](Self::reassemble).
    pub fn reassemble_unordered<I>(&self, symbols: I) -> Result<Vec<u8>, ReassemblyError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        if self.manifest.framing() == Framing::Raw {
            return Err(ReassemblyError::UntaggedFragments);
        }

        let count = self.manifest.fragment_count().get();
        let mut bodies: BTreeMap<FragmentIndex, String> = BTreeMap::new();

        for (position, symbol) in symbols.into_iter().enumerate() {
            let (header, body) = decode_frame(symbol.as_ref(), position)?;
            if header.count() != count {
                return Err(ReassemblyError::ManifestMismatch {
                    declared: count,
                    discovered: header.count(),
                });
            }
            self.check_body_len(header.index(), body)?;
            match bodies.entry(header.index()) {
                Entry::Occupied(_) => {
                    return Err(ReassemblyError::DuplicateFragment(header.index()));
                }
                Entry::Vacant(slot) => {
                    slot.insert(body.to_owned());
                }
            }
        }

        // Keys are sorted, distinct and below `count`: the lowest gap is the
        // first key out of step, or the ordinal just past the last key.
        if let Some(missing) = FragmentIndex::range(count)
            .zip(bodies.keys())
            .find_map(|(expected, found)| (expected != *found).then_some(expected))
        {
            return Err(ReassemblyError::MissingFragment(missing));
        }
        if bodies.len() < self.manifest.fragment_count_usize() {
            let next = u32::try_from(bodies.len()).map_or(count, |len| len);
            return Err(ReassemblyError::MissingFragment(FragmentIndex::new(next)));
        }

        let text: String = bodies.into_values().collect();
        self.finish(&text)
    }

    fn check_inventory(&self, found: &BTreeSet<FragmentIndex>) -> Result<(), ReassemblyError> {
        let declared = self.manifest.fragment_count().get();
        if found.iter().any(|index| index.get() >= declared) {
            return Err(ReassemblyError::ManifestMismatch {
                declared,
                discovered: u32::try_from(found.len()).unwrap_or(u32::MAX),
            });
        }
        match FragmentIndex::range(declared).find(|index| !found.contains(index)) {
            Some(missing) => Err(ReassemblyError::MissingFragment(missing)),
            None => Ok(()),
        }
    }

    fn check_body_len(&self, index: FragmentIndex, body: &str) -> Result<(), ReassemblyError> {
        if body.len() > self.manifest.fragment_size_bound().get() {
            return Err(ReassemblyError::MalformedFrame {
                position: index.as_usize(),
                reason: "fragment longer than declared bound",
            });
        }
        Ok(())
    }

    fn finish(&self, text: &str) -> Result<Vec<u8>, ReassemblyError> {
        let payload = self.manifest.transform().decode(text)?;

        if let Some(expected) = self.manifest.payload_len() {
            let recovered = payload.len() as u64;
            if recovered != expected {
                return Err(ReassemblyError::Integrity(format!(
                    "expected {expected} bytes, recovered {recovered}"
                )));
            }
        }
        if let Some(expected) = self.manifest.payload_sha256() {
            let recovered = hex::encode(Sha256::digest(&payload));
            if !recovered.eq_ignore_ascii_case(expected) {
                return Err(ReassemblyError::Integrity(format!(
                    "expected sha256 {expected}, recovered {recovered}"
                )));
            }
        }

        log::info!(
            "reassembled {} bytes of {} from {} fragments",
            payload.len(),
            self.manifest.logical_name(),
            self.manifest.fragment_count()
        );
        Ok(payload)
    }
}
