use std::fs;
use std::path::{Path, PathBuf};

use nbfp::{
    ArchiveStore, BatchConfig, CanonicalizeConfig, CheatingVerdict, FingerprintStore,
    PipelineError, ScoreConfig, SubmissionIdentity, audit_assignment, compare_submissions,
    submit_notebook_path, write_audit_reports,
};

const ASSIGNMENT: &str = "decision-tree";

fn write_notebook(dir: &Path, name: &str, cells: &[&str]) -> PathBuf {
    let cells: Vec<serde_json::Value> = cells
        .iter()
        .map(|src| serde_json::json!({"cell_type": "code", "source": src, "outputs": []}))
        .collect();
    let doc = serde_json::json!({
        "cells": cells,
        "metadata": {},
        "nbformat": 4,
        "nbformat_minor": 5
    });
    let path = dir.join(name);
    fs::write(&path, doc.to_string()).expect("write notebook");
    path
}

fn identity(student: &str) -> SubmissionIdentity {
    SubmissionIdentity::new(student, ASSIGNMENT).expect("identity")
}

#[test]
fn two_cell_example_scores_one_against_itself() -> Result<(), PipelineError> {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = ArchiveStore::open(dir.path().join("store"))?;
    let nb = write_notebook(
        dir.path(),
        "main.ipynb",
        &[
            "def f():\n    pass\n",
            "# Estimation: x: 2.5\ndef g():\n    return 1\n",
        ],
    );

    let (fp, handle) = submit_notebook_path(
        &store,
        &identity("40131"),
        &nb,
        &[],
        &CanonicalizeConfig::default(),
    )?;
    assert_eq!(fp.implemented_methods, vec!["def f():", "def g():"]);
    assert_eq!(fp.estimations["x"], 2.5);
    assert_eq!(
        handle.path.as_deref(),
        Some(store.archive_path(&identity("40131")).as_path())
    );
    assert_eq!(
        handle.entries,
        vec!["main.ipynb", "fingerprint.json", "submission.csv"]
    );

    let result = compare_submissions(
        &store,
        &identity("40131"),
        &identity("40131"),
        &ScoreConfig::positional(),
    )?;
    assert_eq!(result.components(), (1.0, 1.0, 1.0));
    assert_eq!(result.overall_similarity, 1.0);
    Ok(())
}

#[test]
fn submit_audit_and_write_reports() -> Result<(), PipelineError> {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = ArchiveStore::open(dir.path().join("store"))?;

    let shared = "# Estimation: max_depth: 4\ndef fit(self, X, y):\n    self.tree_ = build(X, y)\n";
    let notebooks = [
        ("alice", vec![shared, "def predict(self, X):\n    return walk(X)\n"]),
        ("bob", vec![shared, "def predict(self, X):\n    return walk(X)\n"]),
        ("carol", vec!["# Estimation: max_depth: 7\ndef train(data):\n    return data\n"]),
    ];
    for (student, cells) in &notebooks {
        let path = write_notebook(dir.path(), &format!("{student}.ipynb"), cells);
        submit_notebook_path(
            &store,
            &identity(student),
            &path,
            &[],
            &CanonicalizeConfig::default(),
        )?;
    }
    assert_eq!(store.list(ASSIGNMENT)?.len(), 3);

    let report = audit_assignment(&store, ASSIGNMENT, &BatchConfig::default())?;
    assert_eq!(report.total_pairs(), 3);
    assert_eq!(report.cheating_count, 1);
    assert!(!report.suppress);

    let csv_path = dir.path().join("comparison_report.csv");
    let detail = write_audit_reports(&report, &csv_path, true)?.expect("verbose report");
    assert_eq!(detail, dir.path().join("comparison_report_verbose.json"));

    let csv_text = fs::read_to_string(&csv_path).expect("read csv");
    let lines: Vec<&str> = csv_text.lines().collect();
    assert_eq!(lines[0], "Identity1,Identity2,Similarity,PotentialCheating");
    assert_eq!(lines.len(), 4);
    assert_eq!(
        lines[1],
        "decision-tree/alice,decision-tree/bob,1.0,Yes"
    );
    assert!(lines[2].ends_with(",No"));

    let detail_json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&detail).expect("read json")).expect("json");
    let alice_bob = &detail_json["decision-tree/alice <-> decision-tree/bob"];
    assert_eq!(alice_bob["overall_similarity"], 1.0);
    assert_eq!(alice_bob["common_estimations"]["max_depth"][0], 4.0);
    assert_eq!(detail_json.as_object().map(|o| o.len()), Some(3));

    let verdicts: Vec<CheatingVerdict> = report.rows().map(|r| r.potential_cheating).collect();
    assert_eq!(
        verdicts,
        vec![CheatingVerdict::Yes, CheatingVerdict::No, CheatingVerdict::No]
    );
    Ok(())
}

#[test]
fn resubmission_replaces_previous_archive() -> Result<(), PipelineError> {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = ArchiveStore::open(dir.path().join("store"))?;
    let first = write_notebook(dir.path(), "v1.ipynb", &["# Estimation: a: 1\ndef v1():\n    pass\n"]);
    let second = write_notebook(dir.path(), "v2.ipynb", &["# Estimation: a: 2\ndef v2():\n    pass\n"]);
    let cfg = CanonicalizeConfig::default();

    submit_notebook_path(&store, &identity("dave"), &first, &[], &cfg)?;
    let (latest, _) = submit_notebook_path(&store, &identity("dave"), &second, &[], &cfg)?;

    assert_eq!(store.load(&identity("dave"))?, latest);
    assert_eq!(store.list(ASSIGNMENT)?, vec![identity("dave")]);
    Ok(())
}

#[test]
fn extra_artifacts_are_packaged_after_notebook() -> Result<(), PipelineError> {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = ArchiveStore::open(dir.path().join("store"))?;
    let nb = write_notebook(dir.path(), "main.ipynb", &["# Estimation: a: 1\ndef f():\n    pass\n"]);
    let helper = dir.path().join("utils.py");
    fs::write(&helper, "def helper():\n    return 0\n").expect("write helper");

    let (_, handle) = submit_notebook_path(
        &store,
        &identity("erin"),
        &nb,
        &[helper],
        &CanonicalizeConfig::default(),
    )?;
    assert_eq!(
        handle.entries,
        vec!["main.ipynb", "utils.py", "fingerprint.json", "submission.csv"]
    );
    Ok(())
}
