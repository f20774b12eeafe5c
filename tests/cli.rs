//! Tests running the `qrtransit` binary end to end.

use std::{fs, process::Command};

use qrtransit_testing::deterministic_payload;
use rstest::rstest;
use tempfile::TempDir;

fn qrtransit(args: &[&str], cwd: &std::path::Path) -> String {
    let output = Command::new(env!("CARGO_BIN_EXE_qrtransit"))
        .args(args)
        .current_dir(cwd)
        .env_remove("RUST_LOG")
        .output()
        .expect("run qrtransit");
    assert!(output.status.success(), "qrtransit {args:?} failed: {output:?}");
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text
}

#[rstest]
fn each_completion_event_prints_once() {
    let root = TempDir::new().expect("temp dir");
    let payload = deterministic_payload(7000);
    fs::write(root.path().join("clip.mp4"), &payload).expect("write input");

    let encoded = qrtransit(&["encode", "clip.mp4"], root.path());
    assert_eq!(encoded.matches("encode complete").count(), 1, "{encoded}");

    let decoded = qrtransit(&["decode", "clip"], root.path());
    assert_eq!(decoded.matches("decode complete").count(), 1, "{decoded}");
    assert_eq!(
        fs::read(root.path().join("output").join("output_clip.mp4")).expect("read output"),
        payload
    );
}

#[rstest]
fn inspect_summarises_a_complete_directory() {
    let root = TempDir::new().expect("temp dir");
    fs::write(root.path().join("notes.txt"), b"hello").expect("write input");
    qrtransit(&["encode", "notes.txt"], root.path());

    let report = qrtransit(&["inspect", "notes"], root.path());
    assert!(report.contains("name:      notes.txt"), "{report}");
    assert!(report.contains("fragments: 1"), "{report}");
    assert!(!report.contains("missing:"), "{report}");
}
