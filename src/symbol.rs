//! Adapters for the symbol-image codec.
//!
//! The fragment layer only needs two things from a symbol format: render a
//! bounded text payload into one artifact file, and read that text back.
//! [`TextSymbolCodec`] stores the text directly, which keeps tests and
//! dry runs independent of image tooling. With the `qr` feature,
//! [`QrSymbolCodec`] renders real version-40 QR codes as PNG files.

use std::{
    fs,
    io,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::config::QR_V40_M_CAPACITY;

/// Errors raised by symbol writers and readers.
#[derive(Debug, Error)]
pub enum SymbolError {
    /// The text does not fit in one symbol.
    #[error("symbol text of {len} characters exceeds capacity {capacity}")]
    TooLarge { len: usize, capacity: usize },
    /// The artifact exists but no symbol could be recognised in it.
    #[error("no symbol recognised in {}: {reason}", path.display())]
    NoSymbol { path: PathBuf, reason: String },
    /// The symbol could not be rendered.
    #[error("failed to render symbol to {}: {reason}", path.display())]
    Render { path: PathBuf, reason: String },
    /// Reading or writing the artifact failed.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl SymbolError {
    /// Report whether the artifact file does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io(err) if err.kind() == io::ErrorKind::NotFound)
    }
}

/// Renders text payloads into symbol artifacts.
pub trait SymbolWriter {
    /// Maximum text length one symbol can hold.
    fn capacity(&self) -> usize;

    /// File extension of the artifacts this writer produces.
    fn extension(&self) -> &'static str;

    /// Render `text` into a new artifact at `path`.
    ///
    /// Text longer than [`capacity`](Self::capacity) is rejected rather
    /// than truncated.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolError::TooLarge`] for oversized text, or a render or
    /// I/O error.
    fn render(&self, text: &str, path: &Path) -> Result<(), SymbolError>;
}

/// Reads text payloads back out of symbol artifacts.
pub trait SymbolReader {
    /// File extension of the artifacts this reader understands.
    fn extension(&self) -> &'static str;

    /// Decode the text held by the artifact at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SymbolError::NoSymbol`] when the artifact holds no
    /// recognisable symbol, or [`SymbolError::Io`] when it cannot be read.
    fn read(&self, path: &Path) -> Result<String, SymbolError>;
}

fn check_capacity(text: &str, capacity: usize) -> Result<(), SymbolError> {
    if text.len() > capacity {
        return Err(SymbolError::TooLarge {
            len: text.len(),
            capacity,
        });
    }
    Ok(())
}

/// Plain-text symbol format: the payload followed by a single newline.
///
/// A file missing the trailing newline was cut short and counts as holding
/// no symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextSymbolCodec {
    capacity: usize,
}

impl TextSymbolCodec {
    /// Create a codec with the given per-symbol capacity.
    #[must_use]
    pub const fn new(capacity: usize) -> Self { Self { capacity } }
}

impl Default for TextSymbolCodec {
    fn default() -> Self { Self::new(QR_V40_M_CAPACITY) }
}

impl SymbolWriter for TextSymbolCodec {
    fn capacity(&self) -> usize { self.capacity }

    fn extension(&self) -> &'static str { "txt" }

    fn render(&self, text: &str, path: &Path) -> Result<(), SymbolError> {
        check_capacity(text, self.capacity)?;
        let mut contents = String::with_capacity(text.len() + 1);
        contents.push_str(text);
        contents.push('\n');
        fs::write(path, contents)?;
        Ok(())
    }
}

impl SymbolReader for TextSymbolCodec {
    fn extension(&self) -> &'static str { "txt" }

    fn read(&self, path: &Path) -> Result<String, SymbolError> {
        let no_symbol = |reason: &str| SymbolError::NoSymbol {
            path: path.to_path_buf(),
            reason: reason.to_owned(),
        };
        let bytes = fs::read(path)?;
        let mut text = String::from_utf8(bytes).map_err(|_| no_symbol("not valid UTF-8"))?;
        if text.pop() != Some('\n') {
            return Err(no_symbol("missing symbol terminator"));
        }
        Ok(text)
    }
}

#[cfg(feature = "qr")]
pub use qr::QrSymbolCodec;

#[cfg(feature = "qr")]
mod qr {
    use std::path::Path;

    use image::Luma;
    use qrcode::{EcLevel, QrCode, Version};

    use super::{SymbolError, SymbolReader, SymbolWriter, check_capacity};
    use crate::config::QR_V40_M_CAPACITY;

    const QR_VERSION: i16 = 40;

    /// Version-40, level-M QR codes stored as PNG images.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct QrSymbolCodec {
        module_size: u32,
    }

    impl QrSymbolCodec {
        /// Create a codec drawing each QR module as a `module_size` pixel square.
        #[must_use]
        pub const fn new(module_size: u32) -> Self { Self { module_size } }
    }

    impl Default for QrSymbolCodec {
        fn default() -> Self { Self::new(10) }
    }

    impl SymbolWriter for QrSymbolCodec {
        fn capacity(&self) -> usize { QR_V40_M_CAPACITY }

        fn extension(&self) -> &'static str { "png" }

        fn render(&self, text: &str, path: &Path) -> Result<(), SymbolError> {
            check_capacity(text, QR_V40_M_CAPACITY)?;
            let render_error = |reason: String| SymbolError::Render {
                path: path.to_path_buf(),
                reason,
            };
            let code =
                QrCode::with_version(text.as_bytes(), Version::Normal(QR_VERSION), EcLevel::M)
                    .map_err(|err| render_error(format!("{err:?}")))?;
            let image = code
                .render::<Luma<u8>>()
                .module_dimensions(self.module_size, self.module_size)
                .build();
            image
                .save(path)
                .map_err(|err| render_error(err.to_string()))
        }
    }

    impl SymbolReader for QrSymbolCodec {
        fn extension(&self) -> &'static str { "png" }

        fn read(&self, path: &Path) -> Result<String, SymbolError> {
            let no_symbol = |reason: String| SymbolError::NoSymbol {
                path: path.to_path_buf(),
                reason,
            };
            let image = image::open(path)
                .map_err(|err| match err {
                    image::ImageError::IoError(io) => SymbolError::Io(io),
                    other => no_symbol(other.to_string()),
                })?
                .to_luma8();
            let mut prepared = rqrr::PreparedImage::prepare(image);
            let grids = prepared.detect_grids();
            let Some(grid) = grids.first() else {
                return Err(no_symbol("no QR code found in image".to_owned()));
            };
            let (_, content) = grid.decode().map_err(|err| no_symbol(format!("{err:?}")))?;
            Ok(content)
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;

    #[rstest]
    #[case::empty("")]
    #[case::text("QRT1:aGVsbG8=")]
    fn text_codec_round_trips(#[case] text: &str) {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("chunk_00000.txt");
        let codec = TextSymbolCodec::default();

        codec.render(text, &path).expect("render");
        assert_eq!(codec.read(&path).expect("read"), text);
    }

    #[test]
    fn text_codec_rejects_oversized_text() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("chunk_00000.txt");
        let codec = TextSymbolCodec::new(4);

        codec.render("abcd", &path).expect("text at capacity renders");
        let err = codec.render("abcde", &path).expect_err("over capacity");
        assert!(matches!(
            err,
            SymbolError::TooLarge {
                len: 5,
                capacity: 4
            }
        ));
    }

    #[test]
    fn text_codec_reports_truncated_artifact() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("chunk_00000.txt");
        fs::write(&path, "abc").expect("write");

        let err = TextSymbolCodec::default().read(&path).expect_err("no terminator");
        assert!(matches!(err, SymbolError::NoSymbol { .. }));
    }

    #[test]
    fn text_codec_reports_missing_artifact() {
        let dir = TempDir::new().expect("temp dir");
        let err = TextSymbolCodec::default()
            .read(&dir.path().join("absent.txt"))
            .expect_err("missing");
        assert!(err.is_not_found());
    }
}
