use thiserror::Error;

use crate::identity::SubmissionIdentity;

/// Errors produced by fingerprint stores.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("invalid submission identity: {0}")]
    InvalidIdentity(String),
    #[error("no submission archive for {identity}")]
    SubmissionNotFound { identity: SubmissionIdentity },
    #[error("corrupt submission archive for {identity}: {reason}")]
    CorruptArchive {
        identity: SubmissionIdentity,
        reason: String,
    },
    #[error("i/o failure at {path}: {reason}")]
    Io { path: String, reason: String },
    #[error("failed to build archive for {identity}: {reason}")]
    Archive {
        identity: SubmissionIdentity,
        reason: String,
    },
    #[error("store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub(crate) fn io(path: &std::path::Path, err: impl std::fmt::Display) -> Self {
        StoreError::Io {
            path: path.display().to_string(),
            reason: err.to_string(),
        }
    }

    pub(crate) fn corrupt(identity: &SubmissionIdentity, reason: impl Into<String>) -> Self {
        StoreError::CorruptArchive {
            identity: identity.clone(),
            reason: reason.into(),
        }
    }
}
