use std::collections::BTreeMap;

use tracing::debug;

use crate::config::CanonicalizeConfig;
use crate::encoding::encode_cell;
use crate::error::CanonicalError;
use crate::fingerprint::Fingerprint;
use crate::notebook::Notebook;

/// Main entry point. Extracts a fingerprint from a validated notebook.
///
/// Only code cells contribute. Each cell is encoded, then scanned line by
/// line for method declarations and estimation annotations.
pub fn canonicalize(
    notebook: &Notebook,
    cfg: &CanonicalizeConfig,
) -> Result<Fingerprint, CanonicalError> {
    cfg.validate()?;

    let mut encoded_cells = Vec::new();
    let mut implemented_methods = Vec::new();
    let mut estimations = BTreeMap::new();

    for (cell_idx, cell) in notebook.cells.iter().enumerate() {
        if !cell.is_code() {
            continue;
        }
        encoded_cells.push(encode_cell(&cell.source));

        for (line_idx, line) in cell.source.split('\n').enumerate() {
            let stripped = line.trim();
            if stripped.starts_with(cfg.method_prefix.as_str()) {
                implemented_methods.push(stripped.to_string());
            }
            if let Some((key, value)) = parse_estimation(line, cfg, cell_idx, line_idx + 1)? {
                estimations.insert(key, value);
            }
        }
    }

    debug!(
        cells = encoded_cells.len(),
        methods = implemented_methods.len(),
        estimations = estimations.len(),
        "notebook_canonicalized"
    );

    Ok(Fingerprint {
        version: cfg.version,
        encoded_cells,
        implemented_methods,
        estimations,
    })
}

/// Parse and canonicalize notebook JSON in one step.
pub fn canonicalize_json(raw: &str, cfg: &CanonicalizeConfig) -> Result<Fingerprint, CanonicalError> {
    let notebook = Notebook::from_json_str(raw)?;
    canonicalize(&notebook, cfg)
}

/// Extracts `(key, value)` from a line carrying the estimation marker.
///
/// Returns `Ok(None)` for lines without the marker.
fn parse_estimation(
    line: &str,
    cfg: &CanonicalizeConfig,
    cell: usize,
    line_no: usize,
) -> Result<Option<(String, f64)>, CanonicalError> {
    let Some((_, remainder)) = line.rsplit_once(cfg.estimation_marker.as_str()) else {
        return Ok(None);
    };
    let malformed = |reason: String| CanonicalError::MalformedEstimation {
        cell,
        line: line_no,
        reason,
    };

    let (key, value) = remainder
        .split_once(':')
        .ok_or_else(|| malformed(format!("expected `key: value`, found {:?}", remainder.trim())))?;
    let key = key.trim();
    let value_text = value.trim();
    let value: f64 = value_text
        .parse()
        .map_err(|_| malformed(format!("value {value_text:?} for {key:?} is not a number")))?;
    if !value.is_finite() {
        return Err(malformed(format!("value for {key:?} must be finite")));
    }
    Ok(Some((key.to_string(), value)))
}
