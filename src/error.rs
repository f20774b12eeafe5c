//! Canonical error and result types for the crate.
//!
//! Each layer owns a focused error enum; [`Error`] gathers them for callers
//! driving the end-to-end pipeline.

use std::{io, path::PathBuf};

use thiserror::Error;

use crate::{
    fragment::{ReassemblyError, SplitError},
    manifest::ManifestError,
    store::StoreError,
};

/// Top-level error type exposed by `qrtransit`.
#[derive(Debug, Error)]
pub enum Error {
    /// The codec configuration cannot split payloads.
    #[error(transparent)]
    Split(#[from] SplitError),
    /// The fragments could not be reassembled into the payload.
    #[error(transparent)]
    Reassembly(#[from] ReassemblyError),
    /// The manifest is malformed.
    #[error(transparent)]
    Manifest(#[from] ManifestError),
    /// The artifact directory could not be read or written.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// A payload or output file could not be accessed.
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The input path does not name a file with a UTF-8 name.
    #[error("input {} has no usable file name", .0.display())]
    InvalidInput(PathBuf),
}

impl Error {
    /// Wrap an I/O failure on `path`.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Canonical result alias used by `qrtransit` public APIs.
pub type Result<T> = std::result::Result<T, Error>;
