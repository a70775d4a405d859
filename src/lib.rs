//! Workspace umbrella crate for NBFP (notebook fingerprinting).
//!
//! This crate stitches together canonicalization, archive storage, pairwise
//! scoring and batch auditing so callers can submit notebooks and audit an
//! assignment through a single API.

pub mod config;
pub mod report;

pub use audit::{
    AuditError, AuditMetrics, BatchAnalyzer, BatchConfig, BatchReport, CheatingVerdict,
    FailureMode, PairFailure, PairScore, ReportRow, SkippedPair, check_required_methods,
    set_audit_metrics, summarize,
};
pub use canonical::{
    CanonicalError, CanonicalizeConfig, Cell, CellKind, Fingerprint, Notebook, canonicalize,
    canonicalize_json, decode_cell, encode_cell,
};
pub use config::{ConfigLoadError, NbfpConfig};
pub use report::{
    ReportError, verbose_path, write_batch_csv, write_detail_json, write_predictions_csv,
};
pub use similarity::{CellPolicy, ComparisonResult, ScoreConfig, ScoreError, score};
pub use store::{
    ArchiveHandle, ArchiveStore, Artifact, FingerprintStore, InMemoryStore, StoreConfig,
    StoreError, SubmissionIdentity,
};

use std::error::Error;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{info, warn};

/// Errors that can occur while submitting or auditing notebooks.
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    Canonical(CanonicalError),
    Store(StoreError),
    Score(ScoreError),
    Audit(AuditError),
    Report(ReportError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Canonical(err) => write!(f, "canonicalization failure: {err}"),
            PipelineError::Store(err) => write!(f, "store failure: {err}"),
            PipelineError::Score(err) => write!(f, "scoring failure: {err}"),
            PipelineError::Audit(err) => write!(f, "audit failure: {err}"),
            PipelineError::Report(err) => write!(f, "report failure: {err}"),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PipelineError::Canonical(err) => Some(err),
            PipelineError::Store(err) => Some(err),
            PipelineError::Score(err) => Some(err),
            PipelineError::Audit(err) => Some(err),
            PipelineError::Report(err) => Some(err),
        }
    }
}

impl From<CanonicalError> for PipelineError {
    fn from(value: CanonicalError) -> Self {
        PipelineError::Canonical(value)
    }
}

impl From<StoreError> for PipelineError {
    fn from(value: StoreError) -> Self {
        PipelineError::Store(value)
    }
}

impl From<ScoreError> for PipelineError {
    fn from(value: ScoreError) -> Self {
        PipelineError::Score(value)
    }
}

impl From<AuditError> for PipelineError {
    fn from(value: AuditError) -> Self {
        PipelineError::Audit(value)
    }
}

impl From<ReportError> for PipelineError {
    fn from(value: ReportError) -> Self {
        PipelineError::Report(value)
    }
}

/// Whether the vector-space (TF-IDF) cell comparison is compiled in.
///
/// Callers pick [`CellPolicy::VectorSpace`] only when this returns `true`;
/// otherwise scoring fails with [`ScoreError::CapabilityUnavailable`].
pub fn is_advanced_comparison_available() -> bool {
    similarity::is_vector_space_available()
}

/// Canonicalize a notebook and store it, with `extras` packaged after the
/// notebook itself. The notebook artifact must hold the `.ipynb` JSON.
pub fn submit_notebook(
    store: &dyn FingerprintStore,
    identity: &SubmissionIdentity,
    notebook: Artifact,
    extras: &[Artifact],
    cfg: &CanonicalizeConfig,
) -> Result<(Fingerprint, ArchiveHandle), PipelineError> {
    let start = Instant::now();
    let raw = std::str::from_utf8(&notebook.bytes).map_err(|err| {
        CanonicalError::MalformedNotebook {
            field: "notebook".to_string(),
            cell: None,
            reason: format!("not valid UTF-8: {err}"),
        }
    });
    let fingerprint = match raw.and_then(|raw| canonicalize_json(raw, cfg)) {
        Ok(fp) => fp,
        Err(err) => {
            warn!(%identity, error = %err, "submission_rejected");
            return Err(err.into());
        }
    };

    let mut artifacts = Vec::with_capacity(extras.len() + 1);
    artifacts.push(notebook);
    artifacts.extend_from_slice(extras);
    let handle = store.save(identity, &fingerprint, &artifacts)?;

    info!(
        %identity,
        cells = fingerprint.cell_count(),
        methods = fingerprint.implemented_methods.len(),
        estimations = fingerprint.estimations.len(),
        elapsed_micros = start.elapsed().as_micros(),
        "submission_stored"
    );
    Ok((fingerprint, handle))
}

/// [`submit_notebook`] reading the notebook and any extra files from disk.
pub fn submit_notebook_path(
    store: &dyn FingerprintStore,
    identity: &SubmissionIdentity,
    notebook_path: &Path,
    extra_paths: &[PathBuf],
    cfg: &CanonicalizeConfig,
) -> Result<(Fingerprint, ArchiveHandle), PipelineError> {
    let notebook = Artifact::from_path(notebook_path)?;
    let extras = extra_paths
        .iter()
        .map(Artifact::from_path)
        .collect::<Result<Vec<_>, _>>()?;
    submit_notebook(store, identity, notebook, &extras, cfg)
}

/// Load two stored submissions and score them.
pub fn compare_submissions(
    store: &dyn FingerprintStore,
    a: &SubmissionIdentity,
    b: &SubmissionIdentity,
    cfg: &ScoreConfig,
) -> Result<ComparisonResult, PipelineError> {
    let fp_a = store.load(a)?;
    let fp_b = store.load(b)?;
    Ok(score(&fp_a, &fp_b, cfg)?)
}

/// Audit every submission of an assignment.
pub fn audit_assignment(
    store: &dyn FingerprintStore,
    assignment: &str,
    cfg: &BatchConfig,
) -> Result<BatchReport, PipelineError> {
    Ok(BatchAnalyzer::new(store).analyze_assignment(assignment, cfg)?)
}

/// Write the batch CSV and, when `verbose`, the detail JSON next to it.
/// Returns the detail path when one was written.
pub fn write_audit_reports(
    report: &BatchReport,
    csv_path: &Path,
    verbose: bool,
) -> Result<Option<PathBuf>, PipelineError> {
    write_batch_csv(report, csv_path)?;
    if !verbose {
        return Ok(None);
    }
    let detail = verbose_path(csv_path);
    write_detail_json(report, &detail)?;
    Ok(Some(detail))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notebook_json(cells: &[&str]) -> String {
        let cells: Vec<serde_json::Value> = cells
            .iter()
            .map(|src| serde_json::json!({"cell_type": "code", "source": src}))
            .collect();
        serde_json::json!({ "cells": cells }).to_string()
    }

    fn identity(student: &str) -> SubmissionIdentity {
        SubmissionIdentity::new(student, "decision-tree").expect("identity")
    }

    #[test]
    fn submit_stores_notebook_first() {
        let store = InMemoryStore::new();
        let nb = Artifact::new("hw.ipynb", notebook_json(&["def f():\n    pass\n"]));
        let extra = Artifact::new("helpers.py", "x = 1\n");

        let (fp, handle) = submit_notebook(
            &store,
            &identity("s1"),
            nb,
            &[extra],
            &CanonicalizeConfig::default(),
        )
        .expect("submit");

        assert_eq!(fp.implemented_methods, vec!["def f():"]);
        assert_eq!(handle.entries[0], "hw.ipynb");
        assert_eq!(handle.entries[1], "helpers.py");
        assert_eq!(store.load(&identity("s1")).expect("load"), fp);
    }

    #[test]
    fn submit_rejects_malformed_notebook_without_storing() {
        let store = InMemoryStore::new();
        let nb = Artifact::new("hw.ipynb", "{\"cells\": 3}");
        let err = submit_notebook(
            &store,
            &identity("s1"),
            nb,
            &[],
            &CanonicalizeConfig::default(),
        )
        .expect_err("malformed");
        assert!(matches!(
            err,
            PipelineError::Canonical(CanonicalError::MalformedNotebook { .. })
        ));
        assert!(store.list("decision-tree").expect("list").is_empty());
    }

    #[test]
    fn submit_rejects_non_utf8_notebook() {
        let store = InMemoryStore::new();
        let nb = Artifact::new("hw.ipynb", vec![0xff, 0xfe, 0x00]);
        let err = submit_notebook(
            &store,
            &identity("s1"),
            nb,
            &[],
            &CanonicalizeConfig::default(),
        )
        .expect_err("binary");
        assert!(matches!(
            err,
            PipelineError::Canonical(CanonicalError::MalformedNotebook { .. })
        ));
    }

    #[test]
    fn compare_reports_missing_submission() {
        let store = InMemoryStore::new();
        let err = compare_submissions(
            &store,
            &identity("s1"),
            &identity("s2"),
            &ScoreConfig::default(),
        )
        .expect_err("missing");
        assert!(matches!(
            err,
            PipelineError::Store(StoreError::SubmissionNotFound { .. })
        ));
    }

    #[test]
    fn capability_query_matches_feature() {
        assert_eq!(is_advanced_comparison_available(), cfg!(feature = "tfidf"));
    }

    #[test]
    fn pipeline_error_exposes_source() {
        let err = PipelineError::from(ScoreError::EmptySubmission {
            component: similarity::Component::Methods,
        });
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("scoring failure"));
    }
}
