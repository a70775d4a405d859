use serde::{Deserialize, Serialize};

use crate::error::ScoreError;

/// Two estimations match when their absolute difference is below this.
pub const ESTIMATION_TOLERANCE: f64 = 1e-6;

/// How the cell component is computed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CellPolicy {
    /// Fraction of index-aligned cells with byte-identical source.
    #[default]
    Positional,
    /// TF-IDF cosine over each submission's concatenated, preprocessed cells.
    /// Requires the `tfidf` feature.
    VectorSpace,
}

impl CellPolicy {
    /// Whether this policy can run in the current build.
    pub fn is_available(self) -> bool {
        match self {
            CellPolicy::Positional => true,
            CellPolicy::VectorSpace => crate::is_vector_space_available(),
        }
    }
}

/// Configuration for pairwise scoring.
///
/// Immutable once built; pass the same value to every `score` call of a batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ScoreConfig {
    #[serde(default)]
    pub cell_policy: CellPolicy,
}

impl ScoreConfig {
    pub fn positional() -> Self {
        Self {
            cell_policy: CellPolicy::Positional,
        }
    }

    pub fn vector_space() -> Self {
        Self {
            cell_policy: CellPolicy::VectorSpace,
        }
    }

    /// Fails when the selected cell policy is not compiled in, so callers can
    /// choose a fallback before scoring anything.
    pub fn validate(&self) -> Result<(), ScoreError> {
        if !self.cell_policy.is_available() {
            return Err(ScoreError::CapabilityUnavailable {
                capability: "vector-space".into(),
            });
        }
        Ok(())
    }
}
