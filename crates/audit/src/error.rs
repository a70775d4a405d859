use similarity::ScoreError;
use store::{StoreError, SubmissionIdentity};
use thiserror::Error;

/// Why a single pair could not be scored.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PairFailure {
    #[error("load failed: {0}")]
    Load(#[from] StoreError),
    #[error("scoring failed: {0}")]
    Score(#[from] ScoreError),
}

/// Errors raised by batch analysis.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AuditError {
    #[error("invalid batch config: {0}")]
    InvalidConfig(String),
    /// The score config cannot run in this build (e.g. vector-space without `tfidf`).
    #[error(transparent)]
    Score(#[from] ScoreError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("submission {0} appears more than once in the batch")]
    DuplicateIdentity(SubmissionIdentity),
    #[error("pair {left} <-> {right} failed: {source}")]
    Pair {
        left: SubmissionIdentity,
        right: SubmissionIdentity,
        #[source]
        source: PairFailure,
    },
    #[error("batch analysis was cancelled")]
    Cancelled,
}
