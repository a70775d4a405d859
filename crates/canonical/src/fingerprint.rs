//! The fingerprint produced by the canonicalizer.
//!
//! # Structure
//!
//! ```text
//! Fingerprint
//! ├── version: u32                         # extraction rules version
//! ├── encoded_cells: Vec<String>           # base64 per code cell, in order
//! ├── implemented_methods: Vec<String>     # trimmed `def ...` lines, duplicates kept
//! └── estimations: BTreeMap<String, f64>   # `# Estimation: key: value` annotations
//! ```
//!
//! A fingerprint is immutable once created; it is serialized into the
//! submission archive and only read afterwards.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::encoding::decode_cell;
use crate::error::CanonicalError;

fn default_version() -> u32 {
    1
}

/// Canonical, comparable extract of a notebook submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Fingerprint {
    /// Version of the extraction rules that produced this fingerprint.
    #[serde(default = "default_version")]
    pub version: u32,

    /// One reversible encoding per code cell, in notebook order.
    pub encoded_cells: Vec<String>,

    /// Method-declaration signatures in scan order. Duplicates are preserved
    /// here; comparison treats the list as a set.
    pub implemented_methods: Vec<String>,

    /// Estimation annotations; the last occurrence of a key wins.
    pub estimations: BTreeMap<String, f64>,
}

impl Fingerprint {
    /// Number of code cells in the source notebook.
    pub fn cell_count(&self) -> usize {
        self.encoded_cells.len()
    }

    /// Decode a single cell by position.
    pub fn decode_cell(&self, cell: usize) -> Result<String, CanonicalError> {
        let encoded = self
            .encoded_cells
            .get(cell)
            .ok_or_else(|| CanonicalError::CellDecode {
                cell,
                reason: format!("fingerprint has only {} cells", self.encoded_cells.len()),
            })?;
        decode_cell(encoded).map_err(|reason| CanonicalError::CellDecode { cell, reason })
    }

    /// Decode every cell, failing on the first entry that does not decode.
    pub fn decoded_cells(&self) -> Result<Vec<String>, CanonicalError> {
        (0..self.encoded_cells.len())
            .map(|idx| self.decode_cell(idx))
            .collect()
    }

    /// Deduplicated method signatures.
    pub fn method_set(&self) -> BTreeSet<&str> {
        self.implemented_methods.iter().map(String::as_str).collect()
    }
}
