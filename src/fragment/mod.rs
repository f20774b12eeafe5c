//! Fragment primitives for splitting payloads across symbols.
//!
//! This module collects the domain types used by the splitting and
//! reassembly layer. Each sub-module focuses on a single concept to keep the
//! code small and easy to audit while still providing a cohesive API at the
//! crate root.

pub mod error;
pub mod frame;
pub mod index;
pub mod reassembler;
pub mod series;
pub mod source;
pub mod splitter;

pub use error::{FetchError, FragmentError, FragmentStatus, ReassemblyError, SplitError};
pub use frame::{FRAME_MAGIC, FRAME_OVERHEAD, Framing, FrameHeader, decode_frame, encode_frame};
pub use index::FragmentIndex;
pub use reassembler::Reassembler;
pub use series::FragmentSeries;
pub use source::FragmentSource;
pub use splitter::{ChunkSplitter, Fragment, SplitPayload};

#[cfg(test)]
mod tests;
