//! Text-safe reversible transforms.
//!
//! Symbols can only carry legible text, so raw payload bytes are mapped onto a
//! printable ASCII alphabet before chunking. The transform identifier travels
//! in the manifest so a decoder never has to guess.

use std::{fmt, str::FromStr};

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while applying or naming a transform.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransformError {
    /// The identifier does not name a supported transform.
    #[error("unknown text transform: {0}")]
    Unknown(String),
    /// The text is not valid output of the named transform.
    #[error("invalid {transform} text: {reason}")]
    Invalid {
        transform: TextTransform,
        reason: String,
    },
}

/// Reversible mapping from arbitrary bytes to printable ASCII.
///
/// # Examples
///
/// ```
/// use qrtransit::transform::TextTransform;
/// let text = TextTransform::Base64.encode(b"hi");
/// assert_eq!(text, "aGk=");
/// assert_eq!(TextTransform::Base64.decode(&text).unwrap(), b"hi");
/// ```
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextTransform {
    /// Standard base64 alphabet with padding.
    #[default]
    Base64,
    /// Lowercase hexadecimal.
    Hex,
}

impl TextTransform {
    /// Identifier recorded in manifests.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Base64 => "base64",
            Self::Hex => "hex",
        }
    }

    /// Map `bytes` onto the transform's alphabet.
    #[must_use]
    pub fn encode(self, bytes: &[u8]) -> String {
        match self {
            Self::Base64 => STANDARD.encode(bytes),
            Self::Hex => hex::encode(bytes),
        }
    }

    /// Invert [`encode`](Self::encode).
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::Invalid`] when `text` contains characters
    /// outside the alphabet or has an impossible length.
    pub fn decode(self, text: &str) -> Result<Vec<u8>, TransformError> {
        let decoded = match self {
            Self::Base64 => STANDARD.decode(text).map_err(|e| e.to_string()),
            Self::Hex => hex::decode(text).map_err(|e| e.to_string()),
        };
        decoded.map_err(|reason| TransformError::Invalid {
            transform: self,
            reason,
        })
    }

    /// Length of the transformed text for a payload of `len` bytes.
    #[must_use]
    pub const fn encoded_len(self, len: usize) -> usize {
        match self {
            Self::Base64 => len.div_ceil(3) * 4,
            Self::Hex => len * 2,
        }
    }
}

impl fmt::Display for TextTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.id()) }
}

impl FromStr for TextTransform {
    type Err = TransformError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "base64" => Ok(Self::Base64),
            "hex" => Ok(Self::Hex),
            _ => Err(TransformError::Unknown(s.to_owned())),
        }
    }
}
