//! # NBFP Batch Audit
//!
//! Runs the pairwise scorer over every unordered pair of a submission batch
//! and flags potential cheating.
//!
//! ## Pipeline
//!
//! ```text
//! identities ──► load each fingerprint once ──► score (i, j), i < j ──► BatchReport
//!                     (FingerprintStore)          (sequential | rayon)
//! ```
//!
//! - A pair is flagged when its overall similarity is **strictly** above
//!   `cheating_threshold` (default 0.8).
//! - When the flagged fraction is **strictly** above `suppression_fraction`
//!   (default 0.7), every verdict becomes `Ignored`: a batch where most pairs
//!   look alike usually means shared starter code, not cheating.
//! - Under `FailureMode::FailFast` the first failing pair aborts the batch;
//!   under `SkipFailed` it is listed in `BatchReport::skipped` and left out of
//!   the fraction.
//!
//! The parallel path scores the same pair set and aggregates in pair order,
//! so reports are identical either way.
//!
//! ## Observability
//!
//! Install an [`AuditMetrics`] implementation with [`set_audit_metrics`] to
//! receive per-pair latency and a per-batch summary.
//!
//! ```
//! use audit::{BatchAnalyzer, BatchConfig};
//! use canonical::{canonicalize, CanonicalizeConfig, Cell, Notebook};
//! use store::{FingerprintStore, InMemoryStore, SubmissionIdentity};
//!
//! let store = InMemoryStore::new();
//! let nb = Notebook::new(vec![Cell::code("# Estimation: x: 2.5\ndef g():\n    return 1\n")]);
//! let fp = canonicalize(&nb, &CanonicalizeConfig::default()).unwrap();
//! for student in ["s1", "s2"] {
//!     let id = SubmissionIdentity::new(student, "hw1").unwrap();
//!     store.save(&id, &fp, &[]).unwrap();
//! }
//!
//! let report = BatchAnalyzer::new(&store)
//!     .analyze_assignment("hw1", &BatchConfig::default())
//!     .unwrap();
//! assert_eq!(report.total_pairs(), 1);
//! assert_eq!(report.cheating_count, 1);
//! ```

mod analyzer;
mod config;
mod error;
mod methods;
pub mod metrics;
mod report;

pub use crate::analyzer::BatchAnalyzer;
pub use crate::config::{
    BatchConfig, FailureMode, DEFAULT_CHEATING_THRESHOLD, DEFAULT_SUPPRESSION_FRACTION,
};
pub use crate::error::{AuditError, PairFailure};
pub use crate::methods::check_required_methods;
pub use crate::metrics::{set_audit_metrics, AuditMetrics};
pub use crate::report::{
    pair_label, summarize, BatchReport, CheatingSummary, CheatingVerdict, PairScore, ReportRow,
    SkippedPair,
};
