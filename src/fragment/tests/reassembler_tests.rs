//! Tests for inbound reassembly ordering, completeness and integrity.

use std::collections::{BTreeMap, BTreeSet};

use rstest::rstest;

use crate::{
    fragment::{
        ChunkSplitter,
        FetchError,
        FragmentIndex,
        FragmentSource,
        Framing,
        Reassembler,
        ReassemblyError,
        SplitPayload,
        encode_frame,
    },
    manifest::Manifest,
    transform::TextTransform,
};

const PAYLOAD: &[u8] = b"The quick brown fox jumps over the lazy dog";

fn split(framing: Framing) -> SplitPayload {
    ChunkSplitter::new(8, 64, TextTransform::Base64, framing)
        .expect("valid splitter")
        .split(PAYLOAD)
        .expect("split payload")
}

/// Map-backed source that can enumerate its contents.
struct MapSource(BTreeMap<FragmentIndex, String>);

impl MapSource {
    fn new(split: &SplitPayload) -> Self { Self(split.symbols().collect()) }
}

impl FragmentSource for MapSource {
    fn fetch(&mut self, index: FragmentIndex) -> Result<String, FetchError> {
        self.0.get(&index).cloned().ok_or(FetchError::Absent)
    }

    fn inventory(&self) -> Option<BTreeSet<FragmentIndex>> { Some(self.0.keys().copied().collect()) }
}

#[rstest]
#[case(Framing::Raw)]
#[case(Framing::Tagged)]
fn reassembles_complete_fragment_set(#[case] framing: Framing) {
    let split = split(framing);
    let manifest = split.manifest("fox.txt");
    let mut source = MapSource::new(&split);

    let payload = Reassembler::new(&manifest)
        .reassemble(&mut source)
        .expect("complete set reassembles");
    assert_eq!(payload, PAYLOAD);
}

#[test]
fn requests_fragments_in_ascending_order() {
    let split = split(Framing::Raw);
    let manifest = split.manifest("fox.txt");
    let symbols: Vec<String> = split.symbols().map(|(_, text)| text).collect();
    let mut requested = Vec::new();
    let mut source = |index: FragmentIndex| {
        requested.push(index.get());
        symbols
            .get(index.as_usize())
            .cloned()
            .ok_or(FetchError::Absent)
    };

    Reassembler::new(&manifest)
        .reassemble(&mut source)
        .expect("reassemble");
    let expected: Vec<u32> = (0..manifest.fragment_count().get()).collect();
    assert_eq!(requested, expected);
}

#[test]
fn eager_check_reports_lowest_missing_fragment_before_reading() {
    let split = split(Framing::Raw);
    let manifest = split.manifest("fox.txt");
    let mut source = MapSource::new(&split);
    source.0.remove(&FragmentIndex::new(4));
    source.0.remove(&FragmentIndex::new(2));

    let err = Reassembler::new(&manifest)
        .reassemble(&mut source)
        .expect_err("incomplete set");
    assert_eq!(err, ReassemblyError::MissingFragment(FragmentIndex::new(2)));
}

#[test]
fn lazy_sources_report_missing_fragment_on_fetch() {
    let split = split(Framing::Raw);
    let manifest = split.manifest("fox.txt");
    let symbols: Vec<String> = split.symbols().map(|(_, text)| text).collect();
    let mut fetched = 0;
    let mut source = |index: FragmentIndex| {
        fetched += 1;
        if index.get() == 1 {
            return Err(FetchError::Absent);
        }
        Ok(symbols[index.as_usize()].clone())
    };

    let err = Reassembler::new(&manifest)
        .reassemble(&mut source)
        .expect_err("fragment 1 absent");
    assert_eq!(err, ReassemblyError::MissingFragment(FragmentIndex::new(1)));
    assert_eq!(fetched, 2, "reassembly stops at the first failure");
}

#[test]
fn unreadable_artifact_aborts_reassembly() {
    let split = split(Framing::Tagged);
    let manifest = split.manifest("fox.txt");
    let mut source =
        |_: FragmentIndex| -> Result<String, FetchError> { Err(FetchError::Unreadable("blank".into())) };

    let err = Reassembler::new(&manifest)
        .reassemble(&mut source)
        .expect_err("unreadable");
    assert_eq!(
        err,
        ReassemblyError::UnreadableFragment {
            index: FragmentIndex::zero(),
            reason: "blank".into(),
        }
    );
}

#[test]
fn extra_artifacts_are_a_manifest_mismatch() {
    let split = split(Framing::Raw);
    let manifest = split.manifest("fox.txt");
    let declared = manifest.fragment_count().get();
    let mut source = MapSource::new(&split);
    source.0.insert(FragmentIndex::new(declared), "c3RyYXk=".into());

    let err = Reassembler::new(&manifest)
        .reassemble(&mut source)
        .expect_err("stray artifact");
    assert_eq!(
        err,
        ReassemblyError::ManifestMismatch {
            declared,
            discovered: declared + 1,
        }
    );
}

#[test]
fn swapped_tagged_artifacts_are_detected() {
    let split = split(Framing::Tagged);
    let manifest = split.manifest("fox.txt");
    let mut source = MapSource::new(&split);
    let first = source.0[&FragmentIndex::zero()].clone();
    let second = source.0[&FragmentIndex::new(1)].clone();
    source.0.insert(FragmentIndex::zero(), second);
    source.0.insert(FragmentIndex::new(1), first);

    let err = Reassembler::new(&manifest)
        .reassemble(&mut source)
        .expect_err("renamed artifacts");
    assert_eq!(
        err,
        ReassemblyError::IndexMismatch {
            expected: FragmentIndex::zero(),
            found: FragmentIndex::new(1),
        }
    );
}

#[test]
fn raw_corruption_is_caught_by_payload_digest() {
    let split = split(Framing::Raw);
    let manifest = split.manifest("fox.txt");
    let mut source = MapSource::new(&split);
    // Same length, still valid base64, different bytes.
    source.0.insert(FragmentIndex::zero(), "AAAAAAAA".into());

    let err = Reassembler::new(&manifest)
        .reassemble(&mut source)
        .expect_err("digest mismatch");
    assert!(matches!(err, ReassemblyError::Integrity(_)), "got {err:?}");
}

#[test]
fn oversized_fragment_is_rejected() {
    let split = split(Framing::Raw);
    let manifest = split.manifest("fox.txt");
    let mut source = MapSource::new(&split);
    source.0.insert(FragmentIndex::zero(), "AAAAAAAAAAAA".into());

    let err = Reassembler::new(&manifest)
        .reassemble(&mut source)
        .expect_err("fragment longer than bound");
    assert!(matches!(
        err,
        ReassemblyError::MalformedFrame { position: 0, .. }
    ));
}

#[test]
fn invalid_transform_text_is_reported() {
    let manifest = Manifest::build(
        "x",
        std::num::NonZeroU32::MIN,
        std::num::NonZeroUsize::new(8).expect("non-zero"),
        TextTransform::Base64,
    );
    let mut source = |_: FragmentIndex| -> Result<String, FetchError> { Ok("!!!!".into()) };

    let err = Reassembler::new(&manifest)
        .reassemble(&mut source)
        .expect_err("not base64");
    assert!(matches!(err, ReassemblyError::Transform(_)));
}

#[test]
fn legacy_manifest_without_integrity_still_reassembles() {
    let split = split(Framing::Raw);
    let manifest = Manifest::build(
        "fox.txt",
        split.fragment_count(),
        std::num::NonZeroUsize::new(8).expect("non-zero"),
        TextTransform::Base64,
    );
    let mut source = MapSource::new(&split);

    let payload = Reassembler::new(&manifest)
        .reassemble(&mut source)
        .expect("reassemble");
    assert_eq!(payload, PAYLOAD);
}

#[test]
fn unordered_tagged_symbols_are_placed_by_embedded_index() {
    let split = split(Framing::Tagged);
    let manifest = split.manifest("fox.txt");
    let mut symbols: Vec<String> = split.symbols().map(|(_, text)| text).collect();
    symbols.reverse();
    symbols.swap(1, 3);

    let payload = Reassembler::new(&manifest)
        .reassemble_unordered(&symbols)
        .expect("reorder by tag");
    assert_eq!(payload, PAYLOAD);
}

#[test]
fn unordered_reassembly_reports_duplicates_and_gaps() {
    let split = split(Framing::Tagged);
    let manifest = split.manifest("fox.txt");
    let symbols: Vec<String> = split.symbols().map(|(_, text)| text).collect();

    let mut duplicated = symbols.clone();
    duplicated.push(symbols[3].clone());
    assert_eq!(
        Reassembler::new(&manifest).reassemble_unordered(&duplicated),
        Err(ReassemblyError::DuplicateFragment(FragmentIndex::new(3)))
    );

    let gapped: Vec<&String> = symbols.iter().filter(|text| *text != &symbols[2]).collect();
    assert_eq!(
        Reassembler::new(&manifest).reassemble_unordered(gapped),
        Err(ReassemblyError::MissingFragment(FragmentIndex::new(2)))
    );
}

#[test]
fn unordered_reassembly_rejects_foreign_fragments() {
    let split = split(Framing::Tagged);
    let manifest = split.manifest("fox.txt");
    let mut symbols: Vec<String> = split.symbols().map(|(_, text)| text).collect();
    symbols.push(encode_frame(FragmentIndex::zero(), 99, "AAAA"));

    assert_eq!(
        Reassembler::new(&manifest).reassemble_unordered(&symbols),
        Err(ReassemblyError::ManifestMismatch {
            declared: manifest.fragment_count().get(),
            discovered: 99,
        })
    );
}

#[test]
fn unordered_reassembly_needs_tagged_framing() {
    let split = split(Framing::Raw);
    let manifest = split.manifest("fox.txt");
    let symbols: Vec<String> = split.symbols().map(|(_, text)| text).collect();

    assert_eq!(
        Reassembler::new(&manifest).reassemble_unordered(&symbols),
        Err(ReassemblyError::UntaggedFragments)
    );
}

#[test]
fn unordered_reassembly_reports_trailing_gap() {
    let split = split(Framing::Tagged);
    let manifest = split.manifest("fox.txt");
    let mut symbols: Vec<String> = split.symbols().map(|(_, text)| text).collect();
    let last = symbols.len() - 1;
    symbols.pop();

    assert_eq!(
        Reassembler::new(&manifest).reassemble_unordered(&symbols),
        Err(ReassemblyError::MissingFragment(FragmentIndex::new(
            u32::try_from(last).expect("small count")
        )))
    );
}

fn inflated_manifest(framing: Framing) -> Manifest {
    Manifest::build(
        "inflated.bin",
        std::num::NonZeroU32::MAX,
        std::num::NonZeroUsize::new(crate::config::MAX_FRAGMENT_SIZE_BOUND).expect("non-zero"),
        TextTransform::Base64,
    )
    .with_framing(framing)
}

#[test]
fn inflated_count_fails_fast_against_a_small_inventory() {
    let manifest = inflated_manifest(Framing::Raw);
    let mut source = MapSource(BTreeMap::from([(FragmentIndex::zero(), "QUJD".to_owned())]));

    assert_eq!(
        Reassembler::new(&manifest).reassemble(&mut source),
        Err(ReassemblyError::MissingFragment(FragmentIndex::new(1)))
    );
}

#[test]
fn inflated_count_fails_fast_against_a_lazy_source() {
    let manifest = inflated_manifest(Framing::Raw);
    let mut source = |index: FragmentIndex| {
        if index == FragmentIndex::zero() {
            Ok("QUJD".to_owned())
        } else {
            Err(FetchError::Absent)
        }
    };

    assert_eq!(
        Reassembler::new(&manifest).reassemble(&mut source),
        Err(ReassemblyError::MissingFragment(FragmentIndex::new(1)))
    );
}

#[test]
fn inflated_count_fails_fast_for_unordered_symbols() {
    let manifest = inflated_manifest(Framing::Tagged);
    let symbols = [encode_frame(FragmentIndex::zero(), u32::MAX, "QUJD")];

    assert_eq!(
        Reassembler::new(&manifest).reassemble_unordered(&symbols),
        Err(ReassemblyError::MissingFragment(FragmentIndex::new(1)))
    );
}
