use std::fs;

use nbfp::{
    ArchiveStore, Artifact, AuditError, BatchConfig, CanonicalError, CanonicalizeConfig,
    FailureMode, FingerprintStore, InMemoryStore, PairFailure, PipelineError, ScoreConfig,
    ScoreError, StoreError, SubmissionIdentity, audit_assignment, canonicalize_json,
    compare_submissions, submit_notebook,
};

fn notebook(cells: &[&str]) -> String {
    let cells: Vec<serde_json::Value> = cells
        .iter()
        .map(|src| serde_json::json!({"cell_type": "code", "source": src}))
        .collect();
    serde_json::json!({ "cells": cells }).to_string()
}

fn identity(student: &str) -> SubmissionIdentity {
    SubmissionIdentity::new(student, "hw").expect("identity")
}

fn submit(store: &dyn FingerprintStore, student: &str, cells: &[&str]) {
    submit_notebook(
        store,
        &identity(student),
        Artifact::new("main.ipynb", notebook(cells)),
        &[],
        &CanonicalizeConfig::default(),
    )
    .expect("submit");
}

#[test]
fn notebook_without_cells_is_malformed() {
    let result = canonicalize_json(r#"{"nbformat": 4}"#, &CanonicalizeConfig::default());
    assert!(matches!(
        result,
        Err(CanonicalError::MalformedNotebook { ref field, .. }) if field == "cells"
    ));
}

#[test]
fn non_numeric_estimation_fails_whole_extraction() {
    let raw = notebook(&["def f():\n    pass\n", "x = 1\n# Estimation: depth: deep\n"]);
    let result = canonicalize_json(&raw, &CanonicalizeConfig::default());
    assert!(matches!(
        result,
        Err(CanonicalError::MalformedEstimation { cell: 1, line: 2, .. })
    ));
}

#[test]
fn estimation_without_separator_is_malformed() {
    let raw = notebook(&["# Estimation: 42\n"]);
    let result = canonicalize_json(&raw, &CanonicalizeConfig::default());
    assert!(matches!(
        result,
        Err(CanonicalError::MalformedEstimation { cell: 0, line: 1, .. })
    ));
}

#[test]
fn invalid_identity_rejected() {
    assert!(matches!(
        SubmissionIdentity::new("../etc", "hw"),
        Err(StoreError::InvalidIdentity(_))
    ));
    assert!(matches!(
        SubmissionIdentity::new("s1", ""),
        Err(StoreError::InvalidIdentity(_))
    ));
}

#[test]
fn garbage_archive_is_corrupt() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = ArchiveStore::open(dir.path()).expect("open");
    let id = identity("mallory");
    let path = store.archive_path(&id);
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(&path, b"definitely not a zip").expect("write garbage");

    assert!(matches!(
        store.load(&id),
        Err(StoreError::CorruptArchive { ref identity, .. }) if *identity == id
    ));
    // Listing still sees it; loading is where corruption surfaces.
    assert_eq!(store.list("hw").expect("list"), vec![id]);
}

#[test]
fn missing_submission_reported_with_identity() {
    let store = InMemoryStore::new();
    let err = compare_submissions(
        &store,
        &identity("a"),
        &identity("b"),
        &ScoreConfig::default(),
    )
    .expect_err("missing");
    assert_eq!(
        err,
        PipelineError::Store(StoreError::SubmissionNotFound {
            identity: identity("a")
        })
    );
}

#[test]
fn comparing_submissions_without_estimations_is_undefined() {
    let store = InMemoryStore::new();
    submit(&store, "a", &["def f():\n    pass\n"]);
    submit(&store, "b", &["def f():\n    return 1\n"]);

    let err = compare_submissions(
        &store,
        &identity("a"),
        &identity("b"),
        &ScoreConfig::default(),
    )
    .expect_err("no estimations");
    assert!(matches!(
        err,
        PipelineError::Score(ScoreError::EmptySubmission { .. })
    ));
}

#[test]
fn corrupt_archive_aborts_or_is_skipped() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = ArchiveStore::open(dir.path()).expect("open");
    submit(&store, "a", &["# Estimation: k: 1\ndef f():\n    pass\n"]);
    submit(&store, "c", &["# Estimation: k: 1\ndef f():\n    pass\n"]);
    let broken = identity("b");
    fs::write(store.archive_path(&broken), b"PK\x03\x04 truncated").expect("write garbage");

    let err = audit_assignment(&store, "hw", &BatchConfig::default()).expect_err("fail fast");
    match err {
        PipelineError::Audit(AuditError::Pair {
            left,
            right,
            source: PairFailure::Load(StoreError::CorruptArchive { identity: corrupt, .. }),
        }) => {
            assert_eq!(left, identity("a"));
            assert_eq!(right, broken);
            assert_eq!(corrupt, broken);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    let cfg = BatchConfig {
        failure_mode: FailureMode::SkipFailed,
        ..Default::default()
    };
    let report = audit_assignment(&store, "hw", &cfg).expect("best effort");
    assert_eq!(report.total_pairs(), 1);
    assert_eq!(report.skipped.len(), 2);
    assert_eq!(report.cheating_fraction, 1.0);
}

#[test]
fn out_of_range_threshold_rejected() {
    let store = InMemoryStore::new();
    let cfg = BatchConfig {
        cheating_threshold: 1.2,
        ..Default::default()
    };
    assert!(matches!(
        audit_assignment(&store, "hw", &cfg),
        Err(PipelineError::Audit(AuditError::InvalidConfig(_)))
    ));
}

#[cfg(not(feature = "tfidf"))]
#[test]
fn vector_space_refused_without_capability() {
    let store = InMemoryStore::new();
    submit(&store, "a", &["# Estimation: k: 1\ndef f():\n    pass\n"]);
    let err = compare_submissions(
        &store,
        &identity("a"),
        &identity("a"),
        &ScoreConfig::vector_space(),
    )
    .expect_err("unavailable");
    assert!(matches!(
        err,
        PipelineError::Score(ScoreError::CapabilityUnavailable { .. })
    ));
}
