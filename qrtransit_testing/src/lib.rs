//! Test helpers for exercising `qrtransit` without symbol tooling.
//!
//! ```rust
//! use qrtransit::{CodecConfig, ChunkSplitter, Reassembler};
//! use qrtransit_testing::{MemorySource, deterministic_payload};
//!
//! let payload = deterministic_payload(4500);
//! let split = ChunkSplitter::from_config(&CodecConfig::DEFAULT)
//!     .expect("default config")
//!     .split(&payload)
//!     .expect("split");
//! let manifest = split.manifest("clip.bin");
//! let mut source = MemorySource::from_split(&split);
//! let recovered = Reassembler::new(&manifest)
//!     .reassemble(&mut source)
//!     .expect("reassemble");
//! assert_eq!(recovered, payload);
//! ```

pub mod logging;
pub mod payload;
pub mod source;

pub use logging::{LoggerHandle, logger};
pub use payload::deterministic_payload;
pub use source::MemorySource;
