//! Strictly validated notebook schema.
//!
//! Raw `.ipynb` JSON is loosely structured; this module validates it once and
//! produces an ordered list of typed [`Cell`] records. Everything downstream of
//! [`Notebook`] can assume the shape is correct.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CanonicalError;

/// Cell type tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    Code,
    /// Any non-code cell (markdown, raw, ...). The original tag is kept.
    Other(String),
}

impl CellKind {
    fn from_tag(tag: &str) -> Self {
        match tag {
            "code" => CellKind::Code,
            other => CellKind::Other(other.to_string()),
        }
    }
}

/// A single notebook cell with its joined source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub kind: CellKind,
    /// Source lines concatenated without inserted separators.
    pub source: String,
}

impl Cell {
    pub fn code(source: impl Into<String>) -> Self {
        Self {
            kind: CellKind::Code,
            source: source.into(),
        }
    }

    pub fn markdown(source: impl Into<String>) -> Self {
        Self {
            kind: CellKind::Other("markdown".into()),
            source: source.into(),
        }
    }

    pub fn is_code(&self) -> bool {
        self.kind == CellKind::Code
    }
}

/// An ordered sequence of validated cells.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Notebook {
    pub cells: Vec<Cell>,
}

impl Notebook {
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    /// Read and validate a notebook file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CanonicalError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|err| {
            CanonicalError::notebook("document", None, format!("{}: {err}", path.display()))
        })?;
        Self::from_json_str(&raw)
    }

    /// Parse and validate notebook JSON text.
    pub fn from_json_str(raw: &str) -> Result<Self, CanonicalError> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|err| CanonicalError::notebook("document", None, err.to_string()))?;
        Self::from_json_value(&value)
    }

    /// Validate an already-parsed JSON document.
    ///
    /// Requires a top-level `cells` array whose entries carry a string
    /// `cell_type` and a `source` that is either a string or a list of strings.
    pub fn from_json_value(value: &Value) -> Result<Self, CanonicalError> {
        let root = value
            .as_object()
            .ok_or_else(|| CanonicalError::notebook("document", None, "expected a JSON object"))?;
        let raw_cells = root
            .get("cells")
            .ok_or_else(|| CanonicalError::notebook("cells", None, "missing field"))?
            .as_array()
            .ok_or_else(|| CanonicalError::notebook("cells", None, "expected an array"))?;

        let mut cells = Vec::with_capacity(raw_cells.len());
        for (idx, raw) in raw_cells.iter().enumerate() {
            cells.push(parse_cell(idx, raw)?);
        }
        Ok(Self { cells })
    }

    /// Iterate over code cells only, in document order.
    pub fn code_cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.iter().filter(|cell| cell.is_code())
    }
}

fn parse_cell(idx: usize, raw: &Value) -> Result<Cell, CanonicalError> {
    let obj = raw
        .as_object()
        .ok_or_else(|| CanonicalError::notebook("cell", Some(idx), "expected a JSON object"))?;

    let tag = obj
        .get("cell_type")
        .ok_or_else(|| CanonicalError::notebook("cell_type", Some(idx), "missing field"))?
        .as_str()
        .ok_or_else(|| CanonicalError::notebook("cell_type", Some(idx), "expected a string"))?;

    let source = match obj.get("source") {
        None => return Err(CanonicalError::notebook("source", Some(idx), "missing field")),
        Some(Value::String(text)) => text.clone(),
        Some(Value::Array(lines)) => {
            let mut joined = String::new();
            for (line_idx, line) in lines.iter().enumerate() {
                let text = line.as_str().ok_or_else(|| {
                    CanonicalError::notebook(
                        "source",
                        Some(idx),
                        format!("line {line_idx} is not a string"),
                    )
                })?;
                joined.push_str(text);
            }
            joined
        }
        Some(_) => {
            return Err(CanonicalError::notebook(
                "source",
                Some(idx),
                "expected a string or a list of strings",
            ))
        }
    };

    Ok(Cell {
        kind: CellKind::from_tag(tag),
        source,
    })
}
