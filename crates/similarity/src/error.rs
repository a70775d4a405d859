use std::fmt;

use canonical::CanonicalError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Score component, used to localize failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Component {
    Cells,
    Methods,
    Estimations,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Component::Cells => "cells",
            Component::Methods => "methods",
            Component::Estimations => "estimations",
        };
        f.write_str(name)
    }
}

/// Which fingerprint of the pair an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    A,
    B,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::A => f.write_str("first"),
            Side::B => f.write_str("second"),
        }
    }
}

/// Errors raised while scoring a pair of fingerprints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScoreError {
    /// Both fingerprints are empty for a component, so its ratio is 0/0.
    #[error("both submissions have no {component}; similarity is undefined")]
    EmptySubmission { component: Component },
    /// An optional comparison backend was requested but is not compiled in.
    #[error("{capability} comparison is unavailable in this build")]
    CapabilityUnavailable { capability: String },
    #[error("{side} fingerprint has unreadable cells: {source}")]
    CorruptCells {
        side: Side,
        #[source]
        source: CanonicalError,
    },
}
