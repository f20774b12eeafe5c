//! Tagged-record framing for fragment text.
//!
//! A tagged fragment carries its own ordinal, the total fragment count and a
//! digest of its body, so a reader can verify each symbol and restore order
//! without trusting artifact names. The record layout is:
//!
//! `QRT1:<index:08x>:<count:08x>:<digest:08x>:<body>`
//!
//! where `digest` is the first four bytes of SHA-256 over `body`. Every field
//! is fixed width, so the framing overhead is constant.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::{FragmentIndex, ReassemblyError};

/// Magic prefix that marks a tagged fragment record.
pub const FRAME_MAGIC: &str = "QRT1";

const FIELD_WIDTH: usize = 8;
const SEPARATOR: char = ':';

/// Characters added to a fragment body by tagged framing.
pub const FRAME_OVERHEAD: usize = FRAME_MAGIC.len() + 4 * SEPARATOR.len_utf8() + 3 * FIELD_WIDTH;

/// How fragment text is laid out inside a symbol.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framing {
    /// The symbol carries the bare transformed slice; order comes from the
    /// artifact name alone.
    Raw,
    /// The symbol carries a self-describing record (see module docs).
    #[default]
    Tagged,
}

impl Framing {
    /// Characters this framing adds on top of the fragment body.
    #[must_use]
    pub const fn overhead(self) -> usize {
        match self {
            Self::Raw => 0,
            Self::Tagged => FRAME_OVERHEAD,
        }
    }
}

impl fmt::Display for Framing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Raw => "raw",
            Self::Tagged => "tagged",
        })
    }
}

/// Header decoded from a tagged fragment record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHeader {
    index: FragmentIndex,
    count: u32,
    digest: u32,
}

impl FrameHeader {
    /// Create a header for `body` at `index` of `count`.
    #[must_use]
    pub fn for_body(index: FragmentIndex, count: u32, body: &str) -> Self {
        Self {
            index,
            count,
            digest: body_digest(body),
        }
    }

    /// Ordinal of the fragment.
    #[must_use]
    pub const fn index(&self) -> FragmentIndex { self.index }

    /// Total number of fragments in the payload.
    #[must_use]
    pub const fn count(&self) -> u32 { self.count }

    /// Truncated SHA-256 of the fragment body.
    #[must_use]
    pub const fn digest(&self) -> u32 { self.digest }

    /// Report whether this header describes the final fragment.
    #[must_use]
    pub const fn is_last_fragment(&self) -> bool { self.index.get().saturating_add(1) == self.count }
}

fn body_digest(body: &str) -> u32 {
    let hash = Sha256::digest(body.as_bytes());
    u32::from_be_bytes([hash[0], hash[1], hash[2], hash[3]])
}

/// Wrap `body` in a tagged record.
///
/// # Examples
///
/// ```
/// use qrtransit::fragment::{FRAME_OVERHEAD, FragmentIndex, decode_frame, encode_frame};
/// let text = encode_frame(FragmentIndex::new(1), 3, "abcd");
/// assert_eq!(text.len(), FRAME_OVERHEAD + 4);
/// let (header, body) = decode_frame(&text, 1).expect("well-formed frame");
/// assert_eq!(header.index(), FragmentIndex::new(1));
/// assert_eq!(body, "abcd");
/// ```
#[must_use]
pub fn encode_frame(index: FragmentIndex, count: u32, body: &str) -> String {
    let header = FrameHeader::for_body(index, count, body);
    format!(
        "{FRAME_MAGIC}{SEPARATOR}{:08x}{SEPARATOR}{:08x}{SEPARATOR}{:08x}{SEPARATOR}{body}",
        header.index.get(),
        header.count,
        header.digest,
    )
}

/// Parse a tagged record and verify its digest.
///
/// `position` identifies the record in error reports; it is the requested
/// ordinal when reading by index, or the discovery position otherwise.
///
/// # Errors
///
/// Returns [`ReassemblyError::MalformedFrame`] when the magic or any header
/// field is missing or not hexadecimal, and
/// [`ReassemblyError::CorruptFragment`] when the body does not match the
/// embedded digest.
pub fn decode_frame(text: &str, position: usize) -> Result<(FrameHeader, &str), ReassemblyError> {
    let malformed = |reason| ReassemblyError::MalformedFrame { position, reason };

    let Some(head) = text.get(..FRAME_OVERHEAD) else {
        return Err(malformed("record shorter than frame header"));
    };
    let body = &text[FRAME_OVERHEAD..];

    let mut fields = head.split(SEPARATOR);
    if fields.next() != Some(FRAME_MAGIC) {
        return Err(malformed("missing frame magic"));
    }
    let mut next_field = |name| {
        fields
            .next()
            .filter(|field| {
                field.len() == FIELD_WIDTH && field.bytes().all(|b| b.is_ascii_hexdigit())
            })
            .and_then(|field| u32::from_str_radix(field, 16).ok())
            .ok_or_else(|| malformed(name))
    };
    let index = FragmentIndex::new(next_field("invalid index field")?);
    let count = next_field("invalid count field")?;
    let digest = next_field("invalid digest field")?;

    if index.get() >= count {
        return Err(malformed("index outside declared count"));
    }
    if body_digest(body) != digest {
        return Err(ReassemblyError::CorruptFragment(index));
    }

    Ok((
        FrameHeader {
            index,
            count,
            digest,
        },
        body,
    ))
}
