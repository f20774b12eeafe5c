//! Outbound helper that splits payloads into symbol-sized fragments.
//!
//! [`ChunkSplitter`] applies a [`TextTransform`] to the raw bytes and cuts the
//! resulting text into consecutive slices of at most `fragment_size_bound`
//! characters. The bound is checked against the symbol capacity up front, so
//! an oversized fragment is never produced.

use std::num::{NonZeroU32, NonZeroUsize};

use sha2::{Digest, Sha256};

use super::{FragmentIndex, Framing, SplitError, encode_frame};
use crate::{
    config::{CodecConfig, MAX_FRAGMENT_SIZE_BOUND},
    manifest::Manifest,
    transform::TextTransform,
};

/// Splits payloads into bounded text fragments.
#[derive(Clone, Copy, Debug)]
pub struct ChunkSplitter {
    bound: NonZeroUsize,
    transform: TextTransform,
    framing: Framing,
}

impl ChunkSplitter {
    /// Create a splitter producing fragments of at most `bound` characters
    /// that must fit, framing included, inside `capacity` characters.
    ///
    /// # Errors
    ///
    /// Returns [`SplitError::InvalidBound`] when `bound` is zero,
    /// [`SplitError::BoundTooLarge`] above [`MAX_FRAGMENT_SIZE_BOUND`], and
    /// [`SplitError::ExceedsCapacity`] when a full fragment plus framing
    /// would exceed `capacity`.
    pub fn new(
        bound: usize,
        capacity: usize,
        transform: TextTransform,
        framing: Framing,
    ) -> Result<Self, SplitError> {
        let bound = NonZeroUsize::new(bound).ok_or(SplitError::InvalidBound)?;
        if bound.get() > MAX_FRAGMENT_SIZE_BOUND {
            return Err(SplitError::BoundTooLarge {
                bound: bound.get(),
                max: MAX_FRAGMENT_SIZE_BOUND,
            });
        }
        let overhead = framing.overhead();
        if bound.get().saturating_add(overhead) > capacity {
            return Err(SplitError::ExceedsCapacity {
                bound: bound.get(),
                overhead,
                capacity,
            });
        }
        Ok(Self {
            bound,
            transform,
            framing,
        })
    }

    /// Create a splitter from a [`CodecConfig`].
    ///
    /// # Errors
    ///
    /// See [`ChunkSplitter::new`].
    pub fn from_config(config: &CodecConfig) -> Result<Self, SplitError> {
        Self::new(
            config.fragment_size_bound,
            config.symbol_capacity,
            config.transform,
            config.framing,
        )
    }

    /// Maximum characters of transformed text carried by one fragment.
    #[must_use]
    pub const fn bound(&self) -> NonZeroUsize { self.bound }

    /// Transform applied before slicing.
    #[must_use]
    pub const fn transform(&self) -> TextTransform { self.transform }

    /// Framing applied when fragments are rendered to symbols.
    #[must_use]
    pub const fn framing(&self) -> Framing { self.framing }

    /// Transform `payload` and slice it into fragments.
    ///
    /// An empty payload yields exactly one fragment with empty text.
    ///
    /// # Errors
    ///
    /// Returns [`SplitError::IndexOverflow`] if the payload needs more than
    /// `u32::MAX` fragments.
    pub fn split(&self, payload: impl AsRef<[u8]>) -> Result<SplitPayload, SplitError> {
        let payload = payload.as_ref();
        let text = self.transform.encode(payload);
        let fragments = self.build_fragments(&text)?;
        log::debug!(
            "split {} payload bytes into {} fragments of at most {} characters",
            payload.len(),
            fragments.len(),
            self.bound
        );
        Ok(SplitPayload {
            transform: self.transform,
            framing: self.framing,
            bound: self.bound,
            payload_len: payload.len() as u64,
            payload_sha256: hex::encode(Sha256::digest(payload)),
            fragments,
        })
    }

    fn build_fragments(&self, text: &str) -> Result<Vec<Fragment>, SplitError> {
        let max = self.bound.get();
        if text.is_empty() {
            return Ok(vec![Fragment::new(FragmentIndex::zero(), String::new())]);
        }

        let total = text.len();
        let count = total.div_ceil(max);
        if u32::try_from(count).is_err() {
            return Err(SplitError::IndexOverflow {
                last: FragmentIndex::new(u32::MAX),
            });
        }

        let mut fragments = Vec::with_capacity(count);
        let mut index = FragmentIndex::zero();
        let mut offset = 0usize;

        // Transformed text is ASCII, so byte offsets are character offsets.
        while offset < total {
            let end = (offset + max).min(total);
            fragments.push(Fragment::new(index, text[offset..end].to_owned()));
            if end == total {
                break;
            }
            offset = end;
            index = index
                .checked_increment()
                .ok_or(SplitError::IndexOverflow { last: index })?;
        }

        Ok(fragments)
    }
}

/// One ordinal-indexed slice of transformed text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fragment {
    index: FragmentIndex,
    text: String,
}

impl Fragment {
    /// Construct a fragment.
    #[must_use]
    pub fn new(index: FragmentIndex, text: String) -> Self { Self { index, text } }

    /// Ordinal of the fragment.
    #[must_use]
    pub const fn index(&self) -> FragmentIndex { self.index }

    /// Transformed text carried by the fragment.
    #[must_use]
    pub fn text(&self) -> &str { &self.text }
}

/// Fragments produced for one payload, plus what the manifest needs to know.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitPayload {
    transform: TextTransform,
    framing: Framing,
    bound: NonZeroUsize,
    payload_len: u64,
    payload_sha256: String,
    fragments: Vec<Fragment>,
}

impl SplitPayload {
    /// Transform identifier applied to the payload.
    #[must_use]
    pub const fn transform(&self) -> TextTransform { self.transform }

    /// Framing used when rendering fragments to symbols.
    #[must_use]
    pub const fn framing(&self) -> Framing { self.framing }

    /// Fragments in ascending index order.
    #[must_use]
    pub fn fragments(&self) -> &[Fragment] { &self.fragments }

    /// Number of fragments; always at least one.
    #[must_use]
    pub fn fragment_count(&self) -> NonZeroU32 {
        // `build_fragments` never returns an empty vector and caps the length at `u32::MAX`.
        u32::try_from(self.fragments.len())
            .ok()
            .and_then(NonZeroU32::new)
            .unwrap_or(NonZeroU32::MIN)
    }

    /// Text to place in the symbol for `fragment`, framing applied.
    #[must_use]
    pub fn symbol_text(&self, fragment: &Fragment) -> String {
        match self.framing {
            Framing::Raw => fragment.text.clone(),
            Framing::Tagged => {
                encode_frame(fragment.index, self.fragment_count().get(), &fragment.text)
            }
        }
    }

    /// Iterate over `(index, symbol text)` pairs in ascending index order.
    pub fn symbols(&self) -> impl Iterator<Item = (FragmentIndex, String)> + '_ {
        self.fragments
            .iter()
            .map(|fragment| (fragment.index, self.symbol_text(fragment)))
    }

    /// Build the manifest describing these fragments.
    #[must_use]
    pub fn manifest(&self, logical_name: impl Into<String>) -> Manifest {
        Manifest::build(
            logical_name,
            self.fragment_count(),
            self.bound,
            self.transform,
        )
        .with_framing(self.framing)
        .with_integrity(self.payload_len, self.payload_sha256.clone())
    }
}
