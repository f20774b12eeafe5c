//! Directory-backed storage for fragment artifacts and their manifest.
//!
//! One payload maps to one directory. Inside it, fragment `i` lives in
//! `chunk_{i:05}.{ext}` and the manifest in `manifest.json`. The zero-padded
//! ordinal in the file name is the ordering key used for raw fragments, so
//! [`artifact_name`] and [`parse_artifact_name`] are the only places that
//! know the pattern.

use std::{
    collections::BTreeSet,
    fs,
    io,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::{
    fragment::{FetchError, FragmentIndex, FragmentSource},
    manifest::{LEGACY_MANIFEST_FILE_NAME, MANIFEST_FILE_NAME, Manifest, ManifestError},
    symbol::{SymbolError, SymbolReader, SymbolWriter},
};

const ARTIFACT_PREFIX: &str = "chunk_";

/// Errors raised while reading or writing an artifact directory.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A filesystem operation failed.
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Neither `manifest.json` nor the legacy `header.json` exists.
    #[error("no manifest found in {}", dir.display())]
    ManifestNotFound { dir: PathBuf },
    /// The manifest could not be loaded.
    #[error("{}: {source}", path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: ManifestError,
    },
    /// A fragment could not be rendered.
    #[error("failed to render fragment {index}: {source}")]
    Render {
        index: FragmentIndex,
        #[source]
        source: SymbolError,
    },
    /// The logical name has no usable file stem for a directory.
    #[error("cannot derive an artifact directory from {0:?}")]
    InvalidName(String),
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> StoreError + use<> {
    let path = path.to_path_buf();
    move |source| StoreError::Io { path, source }
}

/// File name of the artifact holding fragment `index`.
///
/// # Examples
///
/// ```
/// use qrtransit::{fragment::FragmentIndex, store::artifact_name};
/// assert_eq!(artifact_name(FragmentIndex::new(7), "png"), "chunk_00007.png");
/// ```
#[must_use]
pub fn artifact_name(index: FragmentIndex, extension: &str) -> String {
    format!("{ARTIFACT_PREFIX}{:05}.{extension}", index.get())
}

/// Recover the ordinal from an artifact file name.
///
/// Only canonical names round-trip; `chunk_000007.png` is not fragment 7.
#[must_use]
pub fn parse_artifact_name(name: &str, extension: &str) -> Option<FragmentIndex> {
    let digits = name
        .strip_prefix(ARTIFACT_PREFIX)?
        .strip_suffix(extension)?
        .strip_suffix('.')?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let index = FragmentIndex::new(digits.parse().ok()?);
    (artifact_name(index, extension) == name).then_some(index)
}

/// Artifact directory for one payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactStore {
    dir: PathBuf,
}

impl ArtifactStore {
    /// Use an existing directory.
    #[must_use]
    pub fn open(dir: impl Into<PathBuf>) -> Self { Self { dir: dir.into() } }

    /// Create `root/<stem of logical_name>` and use it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidName`] when `logical_name` has no file
    /// stem and [`StoreError::Io`] when the directory cannot be created.
    pub fn create(root: &Path, logical_name: &str) -> Result<Self, StoreError> {
        let stem = Path::new(logical_name)
            .file_stem()
            .ok_or_else(|| StoreError::InvalidName(logical_name.to_owned()))?;
        let dir = root.join(stem);
        fs::create_dir_all(&dir).map_err(io_error(&dir))?;
        Ok(Self { dir })
    }

    /// Directory holding the artifacts.
    #[must_use]
    pub fn dir(&self) -> &Path { &self.dir }

    /// Path of the artifact holding fragment `index`.
    #[must_use]
    pub fn artifact_path(&self, index: FragmentIndex, extension: &str) -> PathBuf {
        self.dir.join(artifact_name(index, extension))
    }

    /// Render `text` as the artifact for fragment `index`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Render`] when the writer rejects the text or
    /// cannot produce the artifact.
    pub fn write_fragment(
        &self,
        writer: &dyn SymbolWriter,
        index: FragmentIndex,
        text: &str,
    ) -> Result<PathBuf, StoreError> {
        let path = self.artifact_path(index, writer.extension());
        writer
            .render(text, &path)
            .map_err(|source| StoreError::Render { index, source })?;
        log::debug!("wrote fragment {index} to {}", path.display());
        Ok(path)
    }

    /// Persist `manifest`, replacing any previous one.
    ///
    /// The JSON is written to a temporary file and renamed into place, so a
    /// reader never sees a half-written manifest.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Manifest`] if serialization fails and
    /// [`StoreError::Io`] if the file cannot be written.
    pub fn write_manifest(&self, manifest: &Manifest) -> Result<PathBuf, StoreError> {
        let path = self.dir.join(MANIFEST_FILE_NAME);
        let json = manifest.to_json().map_err(|source| StoreError::Manifest {
            path: path.clone(),
            source,
        })?;
        let staging = self.dir.join(format!(".{MANIFEST_FILE_NAME}.partial"));
        fs::write(&staging, json).map_err(io_error(&staging))?;
        fs::rename(&staging, &path).map_err(io_error(&path))?;
        Ok(path)
    }

    /// Load the manifest, falling back to the legacy `header.json`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ManifestNotFound`] when neither file exists,
    /// [`StoreError::Manifest`] when the file is invalid, and
    /// [`StoreError::Io`] for other read failures.
    pub fn read_manifest(&self) -> Result<Manifest, StoreError> {
        for name in [MANIFEST_FILE_NAME, LEGACY_MANIFEST_FILE_NAME] {
            let path = self.dir.join(name);
            let json = match fs::read_to_string(&path) {
                Ok(json) => json,
                Err(err) if err.kind() == io::ErrorKind::NotFound => continue,
                Err(err) => return Err(io_error(&path)(err)),
            };
            return Manifest::from_json(&json)
                .map_err(|source| StoreError::Manifest { path, source });
        }
        Err(StoreError::ManifestNotFound {
            dir: self.dir.clone(),
        })
    }

    /// Remove the manifest so the directory no longer describes a payload.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if an existing manifest cannot be removed.
    pub fn remove_manifest(&self) -> Result<(), StoreError> {
        for name in [MANIFEST_FILE_NAME, LEGACY_MANIFEST_FILE_NAME] {
            let path = self.dir.join(name);
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(io_error(&path)(err)),
            }
        }
        Ok(())
    }

    /// Ordinals of every artifact with `extension` present in the directory.
    ///
    /// Files that do not follow the artifact naming pattern are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be listed.
    pub fn inventory(&self, extension: &str) -> Result<BTreeSet<FragmentIndex>, StoreError> {
        let entries = fs::read_dir(&self.dir).map_err(io_error(&self.dir))?;
        let mut found = BTreeSet::new();
        for entry in entries {
            let entry = entry.map_err(io_error(&self.dir))?;
            if let Some(index) = entry
                .file_name()
                .to_str()
                .and_then(|name| parse_artifact_name(name, extension))
            {
                found.insert(index);
            }
        }
        Ok(found)
    }

    /// Delete every artifact with `extension`, returning how many were removed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if listing or removal fails.
    pub fn clear_artifacts(&self, extension: &str) -> Result<usize, StoreError> {
        let found = self.inventory(extension)?;
        for index in &found {
            let path = self.artifact_path(*index, extension);
            fs::remove_file(&path).map_err(io_error(&path))?;
        }
        Ok(found.len())
    }

    /// Expose the directory as a [`FragmentSource`] decoded by `reader`.
    ///
    /// The inventory is captured now, so the eager completeness check sees
    /// the directory as it was when reassembly began.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be listed.
    pub fn source<'a>(&'a self, reader: &'a dyn SymbolReader) -> Result<StoreSource<'a>, StoreError> {
        Ok(StoreSource {
            inventory: self.inventory(reader.extension())?,
            store: self,
            reader,
        })
    }
}

/// [`FragmentSource`] reading artifacts from an [`ArtifactStore`].
pub struct StoreSource<'a> {
    store: &'a ArtifactStore,
    reader: &'a dyn SymbolReader,
    inventory: BTreeSet<FragmentIndex>,
}

impl FragmentSource for StoreSource<'_> {
    fn fetch(&mut self, index: FragmentIndex) -> Result<String, FetchError> {
        let path = self.store.artifact_path(index, self.reader.extension());
        self.reader.read(&path).map_err(|err| {
            if err.is_not_found() {
                FetchError::Absent
            } else {
                FetchError::Unreadable(err.to_string())
            }
        })
    }

    fn inventory(&self) -> Option<BTreeSet<FragmentIndex>> { Some(self.inventory.clone()) }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;

    #[rstest]
    #[case("chunk_00000.txt", Some(0))]
    #[case("chunk_00042.txt", Some(42))]
    #[case("chunk_123456.txt", Some(123_456))]
    #[case("chunk_000042.txt", None)]
    #[case("chunk_00042.png", None)]
    #[case("chunk_+0042.txt", None)]
    #[case("manifest.json", None)]
    fn parses_only_canonical_names(#[case] name: &str, #[case] expected: Option<u32>) {
        assert_eq!(
            parse_artifact_name(name, "txt"),
            expected.map(FragmentIndex::new)
        );
    }

    #[test]
    fn create_uses_file_stem() {
        let root = TempDir::new().expect("temp dir");
        let store = ArtifactStore::create(root.path(), "holiday.mp4").expect("create");
        assert_eq!(store.dir(), root.path().join("holiday"));
        assert!(store.dir().is_dir());
    }

    #[test]
    fn read_manifest_reports_absence() {
        let root = TempDir::new().expect("temp dir");
        let err = ArtifactStore::open(root.path())
            .read_manifest()
            .expect_err("empty directory");
        assert!(matches!(err, StoreError::ManifestNotFound { .. }));
    }

    #[test]
    fn inventory_ignores_foreign_files() {
        let root = TempDir::new().expect("temp dir");
        let store = ArtifactStore::open(root.path());
        for name in ["chunk_00000.txt", "chunk_00002.txt", "notes.txt", "chunk_00001.png"] {
            fs::write(root.path().join(name), "x\n").expect("write");
        }

        let found = store.inventory("txt").expect("inventory");
        assert_eq!(
            found.into_iter().collect::<Vec<_>>(),
            vec![FragmentIndex::new(0), FragmentIndex::new(2)]
        );
        assert_eq!(store.clear_artifacts("txt").expect("clear"), 2);
        assert!(root.path().join("notes.txt").exists());
    }
}
