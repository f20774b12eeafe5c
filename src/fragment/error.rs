//! Error and status types emitted by the fragmentation layer.
//!
//! Splitting and reassembly fail for disjoint reasons, so each direction has
//! its own enum. Every variant is terminal for the operation in progress;
//! nothing in this layer retries.

use thiserror::Error;

use super::FragmentIndex;
use crate::transform::TransformError;

/// Result of feeding a fragment header into a [`FragmentSeries`](crate::fragment::FragmentSeries).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FragmentStatus {
    /// The payload still expects more fragments.
    Incomplete,
    /// The fragment completed the payload.
    Complete,
}

/// Errors produced by [`FragmentSeries`](crate::fragment::FragmentSeries).
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum FragmentError {
    /// The fragment declares a different total than the series expects.
    #[error("fragment count mismatch: expected {expected}, found {found}")]
    CountMismatch { expected: u32, found: u32 },
    /// A fragment arrived out of order.
    #[error("fragment index mismatch: expected {expected}, found {found}")]
    IndexMismatch {
        expected: FragmentIndex,
        found: FragmentIndex,
    },
    /// The series already consumed its last fragment.
    #[error("fragment series already complete")]
    SeriesComplete,
}

/// Errors produced while splitting a payload into fragments.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum SplitError {
    /// The fragment size bound must be positive.
    #[error("fragment size bound must be greater than zero")]
    InvalidBound,
    /// The bound is above the largest fragment any manifest may declare.
    #[error("fragment size bound {bound} exceeds the maximum of {max}")]
    BoundTooLarge { bound: usize, max: usize },
    /// A full fragment plus its framing would not fit inside one symbol.
    #[error(
        "fragment size bound {bound} plus {overhead} framing characters exceeds symbol \
         capacity {capacity}"
    )]
    ExceedsCapacity {
        bound: usize,
        overhead: usize,
        capacity: usize,
    },
    /// The payload needs more fragments than a `u32` index can address.
    #[error("fragment index overflow after {last}")]
    IndexOverflow { last: FragmentIndex },
}

/// Failure reported by a [`FragmentSource`](crate::fragment::FragmentSource).
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FetchError {
    /// No artifact exists at the requested ordinal.
    #[error("fragment artifact is absent")]
    Absent,
    /// The artifact exists but no symbol could be recognised in it.
    #[error("fragment artifact is unreadable: {0}")]
    Unreadable(String),
}

/// Errors produced while reassembling a payload from its fragments.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReassemblyError {
    /// The artifact for this ordinal is absent.
    #[error("fragment {0} is missing")]
    MissingFragment(FragmentIndex),
    /// The artifact exists but decodes to nothing.
    #[error("fragment {index} is unreadable: {reason}")]
    UnreadableFragment {
        index: FragmentIndex,
        reason: String,
    },
    /// The manifest's fragment count disagrees with what was discovered.
    #[error("manifest declares {declared} fragments but {discovered} were discovered")]
    ManifestMismatch { declared: u32, discovered: u32 },
    /// A tagged fragment claims a different ordinal than the one requested.
    #[error("fragment index mismatch: expected {expected}, found {found}")]
    IndexMismatch {
        expected: FragmentIndex,
        found: FragmentIndex,
    },
    /// Two tagged fragments claim the same ordinal.
    #[error("fragment {0} was supplied more than once")]
    DuplicateFragment(FragmentIndex),
    /// A fragment's text is not a well-formed tagged record.
    #[error("fragment at position {position} is malformed: {reason}")]
    MalformedFrame {
        position: usize,
        reason: &'static str,
    },
    /// Raw fragments carry no ordinal, so they cannot be placed by content.
    #[error("raw fragments carry no ordinal and cannot be ordered by content")]
    UntaggedFragments,
    /// A tagged fragment's body does not match its embedded digest.
    #[error("fragment {0} failed its digest check")]
    CorruptFragment(FragmentIndex),
    /// The concatenated text could not be inverted.
    #[error("failed to invert text transform: {0}")]
    Transform(#[from] TransformError),
    /// A fragment arrived after the series had already completed.
    #[error("fragment sequence violated: {0}")]
    Sequence(FragmentError),
    /// The recovered payload does not match the manifest's length or digest.
    #[error("reassembled payload failed integrity check: {0}")]
    Integrity(String),
}

impl From<FragmentError> for ReassemblyError {
    fn from(err: FragmentError) -> Self {
        match err {
            FragmentError::CountMismatch { expected, found } => Self::ManifestMismatch {
                declared: expected,
                discovered: found,
            },
            FragmentError::IndexMismatch { expected, found } => {
                Self::IndexMismatch { expected, found }
            }
            FragmentError::SeriesComplete => Self::Sequence(err),
        }
    }
}
