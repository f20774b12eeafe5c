//! Manifest describing one encoded payload.
//!
//! The manifest is the single source of truth for how many fragment
//! artifacts a decoder must expect and how to invert their text. It is built
//! once, after every fragment is known, and persisted as JSON next to the
//! artifacts.
//!
//! Manifests written in the legacy `header.json` layout (`video_name`,
//! `num_chunks`, `chunk_size`, `encoding`) still load; they predate framing
//! and integrity fields, so those default to raw framing and no checks.

use std::{
    num::{NonZeroU32, NonZeroUsize},
    path::Path,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{config::MAX_FRAGMENT_SIZE_BOUND, fragment::Framing, transform::TextTransform};

/// File name of the manifest inside an artifact directory.
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

/// File name used by the legacy layout; read when no manifest exists.
pub const LEGACY_MANIFEST_FILE_NAME: &str = "header.json";

/// Errors raised while loading or validating a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    /// The JSON did not match the manifest schema.
    #[error("failed to parse manifest: {0}")]
    Parse(#[from] serde_json::Error),
    /// The manifest parsed but describes an impossible payload.
    #[error("invalid manifest: {0}")]
    Invalid(&'static str),
}

/// Durable record describing an encoded payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(alias = "video_name")]
    logical_name: String,
    #[serde(alias = "num_chunks")]
    fragment_count: NonZeroU32,
    #[serde(alias = "chunk_size")]
    fragment_size_bound: NonZeroUsize,
    #[serde(alias = "encoding")]
    transform_id: TextTransform,
    #[serde(default = "legacy_framing")]
    framing: Framing,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    payload_len: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    payload_sha256: Option<String>,
}

const fn legacy_framing() -> Framing { Framing::Raw }

impl Manifest {
    /// Construct a manifest for a fully split payload.
    ///
    /// The result uses raw framing and carries no integrity fields; see
    /// [`with_framing`](Self::with_framing) and
    /// [`with_integrity`](Self::with_integrity).
    ///
    /// # Examples
    ///
    /// ```
    /// use std::num::{NonZeroU32, NonZeroUsize};
    ///
    /// use qrtransit::{manifest::Manifest, transform::TextTransform};
    /// let manifest = Manifest::build(
    ///     "clip.mp4",
    ///     NonZeroU32::new(3).expect("non-zero"),
    ///     NonZeroUsize::new(2000).expect("non-zero"),
    ///     TextTransform::Base64,
    /// );
    /// assert_eq!(manifest.fragment_count().get(), 3);
    /// ```
    #[must_use]
    pub fn build(
        logical_name: impl Into<String>,
        fragment_count: NonZeroU32,
        fragment_size_bound: NonZeroUsize,
        transform: TextTransform,
    ) -> Self {
        Self {
            logical_name: logical_name.into(),
            fragment_count,
            fragment_size_bound,
            transform_id: transform,
            framing: Framing::Raw,
            payload_len: None,
            payload_sha256: None,
        }
    }

    /// Record how fragment text is framed inside each symbol.
    #[must_use]
    pub fn with_framing(mut self, framing: Framing) -> Self {
        self.framing = framing;
        self
    }

    /// Record the payload length and hex SHA-256 checked after reassembly.
    #[must_use]
    pub fn with_integrity(mut self, payload_len: u64, payload_sha256: String) -> Self {
        self.payload_len = Some(payload_len);
        self.payload_sha256 = Some(payload_sha256);
        self
    }

    /// Logical name of the payload, usually its original file name.
    #[must_use]
    pub fn logical_name(&self) -> &str { &self.logical_name }

    /// Number of fragment artifacts the decoder must find.
    #[must_use]
    pub const fn fragment_count(&self) -> NonZeroU32 { self.fragment_count }

    /// Fragment count as a `usize` for allocation sizing.
    #[must_use]
    pub const fn fragment_count_usize(&self) -> usize { self.fragment_count.get() as usize }

    /// Maximum transformed-text characters per fragment.
    #[must_use]
    pub const fn fragment_size_bound(&self) -> NonZeroUsize { self.fragment_size_bound }

    /// Transform to invert after concatenation.
    #[must_use]
    pub const fn transform(&self) -> TextTransform { self.transform_id }

    /// Framing of the symbol text.
    #[must_use]
    pub const fn framing(&self) -> Framing { self.framing }

    /// Expected payload length, when recorded.
    #[must_use]
    pub const fn payload_len(&self) -> Option<u64> { self.payload_len }

    /// Expected payload SHA-256 in hex, when recorded.
    #[must_use]
    pub fn payload_sha256(&self) -> Option<&str> { self.payload_sha256.as_deref() }

    /// Check invariants serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Invalid`] when the logical name is empty or
    /// is not a bare file name, when the fragment size bound is above
    /// [`MAX_FRAGMENT_SIZE_BOUND`], or when the digest is not 64 hex digits.
    pub fn validate(&self) -> Result<(), ManifestError> {
        let name = Path::new(&self.logical_name);
        if self.logical_name.is_empty() {
            return Err(ManifestError::Invalid("logical name is empty"));
        }
        if name.file_name().and_then(|f| f.to_str()) != Some(self.logical_name.as_str()) {
            return Err(ManifestError::Invalid("logical name must be a bare file name"));
        }
        if self.fragment_size_bound.get() > MAX_FRAGMENT_SIZE_BOUND {
            return Err(ManifestError::Invalid("fragment size bound exceeds the maximum"));
        }
        if let Some(digest) = &self.payload_sha256 {
            if digest.len() != 64 || !digest.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(ManifestError::Invalid("payload_sha256 must be 64 hex digits"));
            }
        }
        Ok(())
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Parse`] if serialization fails.
    pub fn to_json(&self) -> Result<String, ManifestError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse and validate a manifest from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Parse`] for schema violations, including a
    /// zero fragment count or bound and an unknown transform, and
    /// [`ManifestError::Invalid`] when [`validate`](Self::validate) fails.
    pub fn from_json(json: &str) -> Result<Self, ManifestError> {
        let manifest: Self = serde_json::from_str(json)?;
        manifest.validate()?;
        Ok(manifest)
    }
}
