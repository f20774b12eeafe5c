#![doc(html_root_url = "https://docs.rs/qrtransit/latest")]
//! Public API for the `qrtransit` library.
//!
//! This crate carries arbitrary byte streams across channels that only move
//! small, printable-text symbols, such as QR codes on screen or paper. It
//! splits a payload into ordered, bounded text fragments plus a manifest,
//! and rebuilds the exact bytes from the fragments later.

pub mod config;
pub mod error;
pub mod fragment;
pub mod manifest;
pub mod pipeline;
pub mod store;
pub mod symbol;
pub mod transform;

pub use config::CodecConfig;
pub use error::{Error, Result};
pub use fragment::{
    ChunkSplitter,
    FetchError,
    Fragment,
    FragmentIndex,
    FragmentSource,
    Framing,
    Reassembler,
    ReassemblyError,
    SplitError,
    SplitPayload,
};
pub use manifest::{Manifest, ManifestError};
pub use pipeline::{DecodeReport, EncodeReport, Inspection, decode_dir, encode_file, inspect_dir};
pub use store::{ArtifactStore, StoreError};
#[cfg(feature = "qr")]
pub use symbol::QrSymbolCodec;
pub use symbol::{SymbolError, SymbolReader, SymbolWriter, TextSymbolCodec};
pub use transform::{TextTransform, TransformError};
