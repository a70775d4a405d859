//! # NBFP Pairwise Similarity
//!
//! Compares two notebook [`Fingerprint`](canonical::Fingerprint)s and returns
//! a [`ComparisonResult`] with three component scores and their mean:
//!
//! - **cells**: positional (index-aligned identical cells over the larger cell
//!   count) or vector-space (TF-IDF cosine, `tfidf` feature)
//! - **methods**: shared signatures over the larger signature set
//! - **estimations**: shared keys agreeing within `1e-6`, over the larger
//!   total number of estimation keys
//!
//! The overall score is the plain arithmetic mean; there is no weighting.
//!
//! ## Capability gating
//!
//! Vector-space scoring is compiled in only with the `tfidf` feature. Call
//! [`is_vector_space_available`] (or [`ScoreConfig::validate`]) before
//! choosing it; requesting it in a build without the feature fails with
//! [`ScoreError::CapabilityUnavailable`] instead of silently falling back.
//!
//! ```
//! use canonical::{canonicalize, CanonicalizeConfig, Cell, Notebook};
//! use similarity::{score, ScoreConfig};
//!
//! let nb = Notebook::new(vec![Cell::code("# Estimation: x: 2.5\ndef g():\n    return 1\n")]);
//! let fp = canonicalize(&nb, &CanonicalizeConfig::default()).unwrap();
//! let result = score(&fp, &fp, &ScoreConfig::positional()).unwrap();
//! assert_eq!(result.overall_similarity, 1.0);
//! ```

mod config;
mod error;
mod result;
mod score;
#[cfg(feature = "tfidf")]
pub mod tfidf;

pub use crate::config::{CellPolicy, ScoreConfig, ESTIMATION_TOLERANCE};
pub use crate::error::{Component, ScoreError, Side};
pub use crate::result::ComparisonResult;
pub use crate::score::{cell_similarity, score};

/// Whether the vector-space (TF-IDF) cell policy is compiled in.
pub fn is_vector_space_available() -> bool {
    cfg!(feature = "tfidf")
}
