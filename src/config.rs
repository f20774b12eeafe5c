//! Codec configuration.
//!
//! Everything the splitter needs to know is passed in explicitly through
//! [`CodecConfig`]; nothing is read from ambient process state.

use crate::{
    fragment::{ChunkSplitter, Framing, SplitError},
    transform::TextTransform,
};

/// Characters a version-40 QR code holds in byte mode at error-correction
/// level M.
pub const QR_V40_M_CAPACITY: usize = 2331;

/// Default fragment size bound in transformed-text characters.
pub const DEFAULT_FRAGMENT_SIZE_BOUND: usize = 2000;

/// Largest fragment size bound a splitter accepts or a manifest may declare.
///
/// Far above any real symbol capacity. Manifests declaring a larger bound are
/// rejected on load.
pub const MAX_FRAGMENT_SIZE_BOUND: usize = 1 << 20;

/// Settings for splitting payloads into symbols.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CodecConfig {
    /// Maximum transformed-text characters carried by one fragment.
    pub fragment_size_bound: usize,
    /// Maximum text one symbol can hold, framing included.
    pub symbol_capacity: usize,
    /// Transform from raw bytes to printable text.
    pub transform: TextTransform,
    /// Layout of fragment text inside each symbol.
    pub framing: Framing,
}

impl CodecConfig {
    /// The library default: 2000-character base64 fragments in tagged
    /// records, sized for a version-40 QR code.
    pub const DEFAULT: CodecConfig = CodecConfig {
        fragment_size_bound: DEFAULT_FRAGMENT_SIZE_BOUND,
        symbol_capacity: QR_V40_M_CAPACITY,
        transform: TextTransform::Base64,
        framing: Framing::Tagged,
    };

    /// Override the fragment size bound.
    #[must_use]
    pub const fn with_fragment_size_bound(mut self, bound: usize) -> Self {
        self.fragment_size_bound = bound;
        self
    }

    /// Override the symbol capacity.
    #[must_use]
    pub const fn with_symbol_capacity(mut self, capacity: usize) -> Self {
        self.symbol_capacity = capacity;
        self
    }

    /// Override the text transform.
    #[must_use]
    pub const fn with_transform(mut self, transform: TextTransform) -> Self {
        self.transform = transform;
        self
    }

    /// Override the framing.
    #[must_use]
    pub const fn with_framing(mut self, framing: Framing) -> Self {
        self.framing = framing;
        self
    }

    /// Largest bound that still fits the configured capacity and framing.
    #[must_use]
    pub const fn max_fragment_size_bound(&self) -> usize {
        let fits = self.symbol_capacity.saturating_sub(self.framing.overhead());
        if fits < MAX_FRAGMENT_SIZE_BOUND { fits } else { MAX_FRAGMENT_SIZE_BOUND }
    }

    /// Check that a splitter can be built from this configuration.
    ///
    /// # Errors
    ///
    /// Returns the [`SplitError`] [`ChunkSplitter::from_config`] would.
    pub fn validate(&self) -> Result<(), SplitError> {
        ChunkSplitter::from_config(self).map(|_| ())
    }
}

impl Default for CodecConfig {
    fn default() -> Self { CodecConfig::DEFAULT }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn default_fits_a_version_40_symbol() {
        assert_eq!(CodecConfig::default().validate(), Ok(()));
        assert_eq!(CodecConfig::DEFAULT.max_fragment_size_bound(), 2299);
    }

    #[rstest]
    #[case(Framing::Raw, 2331)]
    #[case(Framing::Tagged, 2299)]
    fn max_bound_is_accepted_and_one_more_is_rejected(
        #[case] framing: Framing,
        #[case] max: usize,
    ) {
        let config = CodecConfig::DEFAULT.with_framing(framing);
        assert_eq!(config.max_fragment_size_bound(), max);
        assert_eq!(config.with_fragment_size_bound(max).validate(), Ok(()));
        assert!(matches!(
            config.with_fragment_size_bound(max + 1).validate(),
            Err(SplitError::ExceedsCapacity { .. })
        ));
    }

    #[test]
    fn zero_bound_is_invalid() {
        let config = CodecConfig::DEFAULT.with_fragment_size_bound(0);
        assert_eq!(config.validate(), Err(SplitError::InvalidBound));
    }

    #[test]
    fn bound_is_capped_even_for_unbounded_symbols() {
        let config = CodecConfig::DEFAULT
            .with_symbol_capacity(usize::MAX)
            .with_fragment_size_bound(MAX_FRAGMENT_SIZE_BOUND + 1);
        assert_eq!(config.max_fragment_size_bound(), MAX_FRAGMENT_SIZE_BOUND);
        assert_eq!(
            config.validate(),
            Err(SplitError::BoundTooLarge {
                bound: MAX_FRAGMENT_SIZE_BOUND + 1,
                max: MAX_FRAGMENT_SIZE_BOUND,
            })
        );
    }
}
