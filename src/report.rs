//! Report writers: batch CSV, per-pair detail JSON and prediction exports.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use audit::BatchReport;
use serde::Serialize;
use thiserror::Error;

/// Header of the batch CSV report.
pub const BATCH_CSV_HEADER: [&str; 4] = ["Identity1", "Identity2", "Similarity", "PotentialCheating"];

/// Header of the prediction export.
pub const PREDICTIONS_CSV_HEADER: [&str; 2] = ["id", "prediction"];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("i/o failure at {path}: {reason}")]
    Io { path: String, reason: String },
    #[error("failed to encode {path}: {reason}")]
    Encode { path: String, reason: String },
}

impl ReportError {
    fn io(path: &Path, err: impl std::fmt::Display) -> Self {
        ReportError::Io {
            path: path.display().to_string(),
            reason: err.to_string(),
        }
    }

    fn encode(path: &Path, err: impl std::fmt::Display) -> Self {
        ReportError::Encode {
            path: path.display().to_string(),
            reason: err.to_string(),
        }
    }
}

/// Write one row per scored pair. When the batch is suppressed every row
/// reads `Ignored`.
pub fn write_batch_csv(report: &BatchReport, path: &Path) -> Result<(), ReportError> {
    let mut writer = csv_writer(path)?;
    writer
        .write_record(BATCH_CSV_HEADER)
        .map_err(|err| ReportError::encode(path, err))?;
    for row in report.rows() {
        writer
            .serialize(row)
            .map_err(|err| ReportError::encode(path, err))?;
    }
    writer.flush().map_err(|err| ReportError::io(path, err))
}

/// Write the full comparison results as a JSON object keyed by
/// `"<identity1> <-> <identity2>"`.
pub fn write_detail_json(report: &BatchReport, path: &Path) -> Result<(), ReportError> {
    let file = File::create(path).map_err(|err| ReportError::io(path, err))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, &report.details())
        .map_err(|err| ReportError::encode(path, err))?;
    out.flush().map_err(|err| ReportError::io(path, err))
}

/// `<dir>/<stem>_verbose.json` next to a CSV report path.
pub fn verbose_path(csv_path: &Path) -> PathBuf {
    let stem = csv_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "report".to_string());
    csv_path.with_file_name(format!("{stem}_verbose.json"))
}

#[derive(Serialize)]
struct PredictionRow<'a, T> {
    id: usize,
    prediction: &'a T,
}

/// Export model predictions as `id,prediction` rows with 1-based ids.
pub fn write_predictions_csv<T: Serialize>(
    predictions: &[T],
    path: &Path,
) -> Result<(), ReportError> {
    let mut writer = csv_writer(path)?;
    writer
        .write_record(PREDICTIONS_CSV_HEADER)
        .map_err(|err| ReportError::encode(path, err))?;
    for (idx, prediction) in predictions.iter().enumerate() {
        writer
            .serialize(PredictionRow {
                id: idx + 1,
                prediction,
            })
            .map_err(|err| ReportError::encode(path, err))?;
    }
    writer.flush().map_err(|err| ReportError::io(path, err))
}

// Headers are written explicitly so that empty reports still carry them.
fn csv_writer(path: &Path) -> Result<csv::Writer<File>, ReportError> {
    let file = File::create(path).map_err(|err| ReportError::io(path, err))?;
    Ok(csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_path_sits_next_to_report() {
        assert_eq!(
            verbose_path(Path::new("out/results.csv")),
            PathBuf::from("out/results_verbose.json")
        );
        assert_eq!(
            verbose_path(Path::new("results")),
            PathBuf::from("results_verbose.json")
        );
    }

    #[test]
    fn predictions_use_one_based_ids() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("predictions.csv");
        write_predictions_csv(&[0, 1, 1], &path).expect("write");
        let text = std::fs::read_to_string(&path).expect("read back");
        assert_eq!(text, "id,prediction\n1,0\n2,1\n3,1\n");
    }

    #[test]
    fn empty_predictions_keep_header() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("predictions.csv");
        write_predictions_csv::<f64>(&[], &path).expect("write");
        let text = std::fs::read_to_string(&path).expect("read back");
        assert_eq!(text, "id,prediction\n");
    }

    #[test]
    fn missing_directory_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nope").join("predictions.csv");
        assert!(matches!(
            write_predictions_csv(&[1], &path),
            Err(ReportError::Io { .. })
        ));
    }
}
