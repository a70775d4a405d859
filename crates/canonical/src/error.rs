use thiserror::Error;

/// Errors that can occur while validating or canonicalizing a notebook.
///
/// Cell indices are zero-based positions in the source notebook's `cells`
/// list; line numbers are one-based within the cell's joined source.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CanonicalError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("malformed notebook: {field}{}: {reason}", cell_suffix(.cell))]
    MalformedNotebook {
        field: String,
        cell: Option<usize>,
        reason: String,
    },
    #[error("malformed estimation in cell {cell}, line {line}: {reason}")]
    MalformedEstimation {
        cell: usize,
        line: usize,
        reason: String,
    },
    #[error("encoded cell {cell} cannot be decoded: {reason}")]
    CellDecode { cell: usize, reason: String },
}

impl CanonicalError {
    pub(crate) fn notebook(field: &str, cell: Option<usize>, reason: impl Into<String>) -> Self {
        CanonicalError::MalformedNotebook {
            field: field.to_string(),
            cell,
            reason: reason.into(),
        }
    }
}

fn cell_suffix(cell: &Option<usize>) -> String {
    match cell {
        Some(idx) => format!(" (cell {idx})"),
        None => String::new(),
    }
}
