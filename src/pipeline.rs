//! End-to-end encode and decode of files through an artifact directory.
//!
//! These functions tie the pure fragment layer to the filesystem: read a
//! file, split it, render one symbol per fragment and write the manifest
//! last; or load a manifest, reassemble, and publish the recovered file in a
//! single rename so no partial output is ever visible.

use std::{
    fs,
    iter,
    path::{Path, PathBuf},
};

use crate::{
    config::CodecConfig,
    error::{Error, Result},
    fragment::{ChunkSplitter, FragmentIndex, Reassembler},
    manifest::Manifest,
    store::ArtifactStore,
    symbol::{SymbolReader, SymbolWriter},
};

/// Prefix of reconstructed file names, as in `output_<logical name>`.
pub const OUTPUT_PREFIX: &str = "output_";

/// Most missing ordinals an [`Inspection`] lists individually.
pub const MISSING_LISTING_LIMIT: usize = 256;

/// Summary of a completed encode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodeReport {
    /// Manifest written alongside the artifacts.
    pub manifest: Manifest,
    /// Directory holding the artifacts.
    pub dir: PathBuf,
    /// Artifact paths in ascending fragment order.
    pub artifacts: Vec<PathBuf>,
}

/// Summary of a completed decode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodeReport {
    /// Manifest that drove reassembly.
    pub manifest: Manifest,
    /// Path of the reconstructed file.
    pub output: PathBuf,
    /// Number of bytes written.
    pub bytes: usize,
}

/// Manifest and on-disk state of an artifact directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Inspection {
    /// Manifest found in the directory.
    pub manifest: Manifest,
    /// Lowest declared ordinals with no artifact, at most
    /// [`MISSING_LISTING_LIMIT`] of them.
    pub missing: Vec<FragmentIndex>,
    /// Number of declared ordinals with no artifact.
    pub missing_count: u32,
    /// Artifacts beyond the declared count.
    pub unexpected: Vec<FragmentIndex>,
}

impl Inspection {
    /// Report whether every declared artifact, and nothing else, is present.
    #[must_use]
    pub fn is_complete(&self) -> bool { self.missing_count == 0 && self.unexpected.is_empty() }
}

/// Encode `input` into symbol artifacts under `out_root/<file stem>`.
///
/// The effective symbol capacity is the smaller of the configured capacity
/// and the writer's, and it is checked before anything touches the disk.
/// Stale artifacts and any previous manifest in the target directory are
/// removed first; the new manifest is written only after every artifact.
/// With `remove_source`, `input` is deleted once the manifest is written.
///
/// # Errors
///
/// Returns [`Error::Split`] for an unusable configuration,
/// [`Error::InvalidInput`] when `input` has no UTF-8 file name, and I/O or
/// store errors otherwise.
pub fn encode_file(
    input: &Path,
    out_root: &Path,
    config: &CodecConfig,
    writer: &dyn SymbolWriter,
    remove_source: bool,
) -> Result<EncodeReport> {
    let span = tracing::info_span!("encode", input = %input.display());
    let _entered = span.enter();

    let capacity = config.symbol_capacity.min(writer.capacity());
    let splitter = ChunkSplitter::from_config(&config.with_symbol_capacity(capacity))?;
    let logical_name = input
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| Error::InvalidInput(input.to_path_buf()))?;

    let payload = fs::read(input).map_err(|err| Error::io(input, err))?;
    let split = splitter.split(&payload)?;

    let store = ArtifactStore::create(out_root, logical_name)?;
    store.remove_manifest()?;
    let stale = store.clear_artifacts(writer.extension())?;
    if stale > 0 {
        log::warn!("removed {stale} stale artifacts from {}", store.dir().display());
    }

    let artifacts = split
        .symbols()
        .map(|(index, text)| store.write_fragment(writer, index, &text))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let manifest = split.manifest(logical_name);
    store.write_manifest(&manifest)?;
    tracing::info!(
        fragments = artifacts.len(),
        bytes = payload.len(),
        dir = %store.dir().display(),
        "encode complete"
    );

    if remove_source {
        fs::remove_file(input).map_err(|err| Error::io(input, err))?;
        log::warn!("removed source file {}", input.display());
    }

    Ok(EncodeReport {
        manifest,
        dir: store.dir().to_path_buf(),
        artifacts,
    })
}

/// Rebuild the payload stored in `dir` as `output_dir/output_<logical name>`.
///
/// The payload is written to a hidden staging file and renamed into place
/// only after reassembly and integrity checks succeed. With
/// `remove_artifacts`, `dir` is deleted once the output is published.
///
/// # Errors
///
/// Returns store errors for a missing or invalid manifest,
/// [`Error::Reassembly`] for missing, unreadable or corrupt fragments, and
/// [`Error::Io`] when the output cannot be written.
pub fn decode_dir(
    dir: &Path,
    output_dir: &Path,
    reader: &dyn SymbolReader,
    remove_artifacts: bool,
) -> Result<DecodeReport> {
    let span = tracing::info_span!("decode", dir = %dir.display());
    let _entered = span.enter();

    let store = ArtifactStore::open(dir);
    let manifest = store.read_manifest()?;
    let mut source = store.source(reader)?;
    let payload = Reassembler::new(&manifest).reassemble(&mut source)?;

    fs::create_dir_all(output_dir).map_err(|err| Error::io(output_dir, err))?;
    let file_name = format!("{OUTPUT_PREFIX}{}", manifest.logical_name());
    let output = output_dir.join(&file_name);
    let staging = output_dir.join(format!(".{file_name}.partial"));
    if let Err(err) = publish(&staging, &output, &payload) {
        if let Err(cleanup) = fs::remove_file(&staging) {
            log::debug!("staging file {} not removed: {cleanup}", staging.display());
        }
        return Err(err);
    }
    tracing::info!(bytes = payload.len(), output = %output.display(), "decode complete");

    if remove_artifacts {
        fs::remove_dir_all(dir).map_err(|err| Error::io(dir, err))?;
        log::warn!("removed artifact directory {}", dir.display());
    }

    Ok(DecodeReport {
        manifest,
        output,
        bytes: payload.len(),
    })
}

/// Compare the manifest in `dir` against the artifacts with `extension`.
///
/// # Errors
///
/// Returns store errors when the manifest or directory cannot be read.
pub fn inspect_dir(dir: &Path, extension: &str) -> Result<Inspection> {
    let store = ArtifactStore::open(dir);
    let manifest = store.read_manifest()?;
    let found = store.inventory(extension)?;
    let declared = manifest.fragment_count().get();

    let (present, unexpected): (Vec<FragmentIndex>, Vec<FragmentIndex>) =
        found.iter().copied().partition(|index| index.get() < declared);
    let present_count = u32::try_from(present.len()).unwrap_or(declared);

    Ok(Inspection {
        missing: missing_ordinals(&present, declared, MISSING_LISTING_LIMIT),
        missing_count: declared - present_count,
        unexpected,
        manifest,
    })
}

fn publish(staging: &Path, output: &Path, payload: &[u8]) -> Result<()> {
    fs::write(staging, payload).map_err(|err| Error::io(staging, err))?;
    fs::rename(staging, output).map_err(|err| Error::io(output, err))
}

/// Walk the gaps between sorted `present` ordinals, so the cost follows
/// what is on disk and `limit` rather than the declared count.
fn missing_ordinals(present: &[FragmentIndex], declared: u32, limit: usize) -> Vec<FragmentIndex> {
    let mut missing = Vec::new();
    let mut next = 0u32;
    for bound in present.iter().map(|index| index.get()).chain(iter::once(declared)) {
        let room = limit - missing.len();
        missing.extend((next..bound).take(room).map(FragmentIndex::new));
        if missing.len() == limit {
            break;
        }
        next = bound.saturating_add(1);
    }
    missing
}
