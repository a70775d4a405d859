//! Batch report model: scored pairs, the cheating summary and report rows.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use similarity::ComparisonResult;
use store::SubmissionIdentity;

/// Label used for a pair in detail reports: `"<left> <-> <right>"`.
pub fn pair_label(left: &SubmissionIdentity, right: &SubmissionIdentity) -> String {
    format!("{left} <-> {right}")
}

/// One scored pair, `left` preceding `right` in the input order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PairScore {
    pub left: SubmissionIdentity,
    pub right: SubmissionIdentity,
    pub result: ComparisonResult,
}

impl PairScore {
    pub fn similarity(&self) -> f64 {
        self.result.overall_similarity
    }

    pub fn label(&self) -> String {
        pair_label(&self.left, &self.right)
    }
}

/// A pair left out of the report under `FailureMode::SkipFailed`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkippedPair {
    pub left: SubmissionIdentity,
    pub right: SubmissionIdentity,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CheatingVerdict {
    Yes,
    No,
    /// Flags were suppressed for the whole batch.
    Ignored,
}

impl fmt::Display for CheatingVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CheatingVerdict::Yes => "Yes",
            CheatingVerdict::No => "No",
            CheatingVerdict::Ignored => "Ignored",
        };
        f.write_str(label)
    }
}

/// Counts derived from a batch's similarities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheatingSummary {
    pub cheating_count: usize,
    pub cheating_fraction: f64,
    pub suppress: bool,
}

/// Count pairs strictly above `cheating_threshold` and decide suppression.
///
/// The fraction is 0 when there are no pairs, so an empty batch is never
/// suppressed.
pub fn summarize(
    similarities: &[f64],
    cheating_threshold: f64,
    suppression_fraction: f64,
) -> CheatingSummary {
    let cheating_count = similarities
        .iter()
        .filter(|&&s| s > cheating_threshold)
        .count();
    let cheating_fraction = if similarities.is_empty() {
        0.0
    } else {
        cheating_count as f64 / similarities.len() as f64
    };
    CheatingSummary {
        cheating_count,
        cheating_fraction,
        suppress: cheating_fraction > suppression_fraction,
    }
}

/// One line of the batch CSV report.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReportRow {
    #[serde(rename = "Identity1")]
    pub identity1: String,
    #[serde(rename = "Identity2")]
    pub identity2: String,
    #[serde(rename = "Similarity")]
    pub similarity: f64,
    #[serde(rename = "PotentialCheating")]
    pub potential_cheating: CheatingVerdict,
}

/// Outcome of a batch audit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchReport {
    /// Scored pairs in `(i, j)`, `i < j` input order.
    pub pairs: Vec<PairScore>,
    pub cheating_count: usize,
    /// `cheating_count / pairs.len()`, 0 with no pairs. Skipped pairs are
    /// not counted.
    pub cheating_fraction: f64,
    pub suppress: bool,
    pub cheating_threshold: f64,
    pub suppression_fraction: f64,
    pub skipped: Vec<SkippedPair>,
}

impl BatchReport {
    pub(crate) fn new(
        pairs: Vec<PairScore>,
        skipped: Vec<SkippedPair>,
        cheating_threshold: f64,
        suppression_fraction: f64,
    ) -> Self {
        let similarities: Vec<f64> = pairs.iter().map(PairScore::similarity).collect();
        let summary = summarize(&similarities, cheating_threshold, suppression_fraction);
        Self {
            pairs,
            cheating_count: summary.cheating_count,
            cheating_fraction: summary.cheating_fraction,
            suppress: summary.suppress,
            cheating_threshold,
            suppression_fraction,
            skipped,
        }
    }

    /// Verdict for a similarity under this batch's thresholds.
    pub fn verdict(&self, similarity: f64) -> CheatingVerdict {
        if self.suppress {
            CheatingVerdict::Ignored
        } else if similarity > self.cheating_threshold {
            CheatingVerdict::Yes
        } else {
            CheatingVerdict::No
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = ReportRow> + '_ {
        self.pairs.iter().map(|pair| ReportRow {
            identity1: pair.left.to_string(),
            identity2: pair.right.to_string(),
            similarity: pair.similarity(),
            potential_cheating: self.verdict(pair.similarity()),
        })
    }

    /// Full comparison results keyed by [`pair_label`].
    pub fn details(&self) -> BTreeMap<String, &ComparisonResult> {
        self.pairs
            .iter()
            .map(|pair| (pair.label(), &pair.result))
            .collect()
    }

    pub fn total_pairs(&self) -> usize {
        self.pairs.len()
    }
}
