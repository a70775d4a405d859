//! Submission archive content model.
//!
//! Every store keeps one zip archive per submission identity:
//!
//! ```text
//! <notebook>.ipynb        original notebook (first artifact)
//! <extra artifacts>       optional supporting files, by file name
//! fingerprint.json        serialized Fingerprint (UTF-8 JSON)
//! submission.csv          Type,Value rows: ("Method", sig) / ("Estimation", "key: value")
//! ```

use std::fs;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use canonical::Fingerprint;
use serde::{Deserialize, Serialize};
use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::error::StoreError;
use crate::identity::SubmissionIdentity;

/// Archive entry holding the serialized fingerprint.
pub const FINGERPRINT_ENTRY: &str = "fingerprint.json";

/// Archive entry holding the tabular submission report.
pub const REPORT_ENTRY: &str = "submission.csv";

/// A file packaged alongside the fingerprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a file from disk; the archive entry is named after its file name.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| StoreError::io(path, "path has no usable file name"))?
            .to_string();
        let bytes = fs::read(path).map_err(|err| StoreError::io(path, err))?;
        Ok(Self { name, bytes })
    }
}

/// Where a saved submission ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveHandle {
    pub identity: SubmissionIdentity,
    /// Filesystem path of the archive; `None` for in-memory stores.
    pub path: Option<PathBuf>,
    /// Entry names in archive order.
    pub entries: Vec<String>,
}

/// A single row of the tabular submission report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRow {
    pub kind: &'static str,
    pub value: String,
}

/// One `Method` row per implemented method (duplicates kept), then one
/// `Estimation` row per key in key order.
pub fn submission_rows(fingerprint: &Fingerprint) -> Vec<SubmissionRow> {
    let methods = fingerprint.implemented_methods.iter().map(|sig| SubmissionRow {
        kind: "Method",
        value: sig.clone(),
    });
    let estimations = fingerprint.estimations.iter().map(|(key, value)| SubmissionRow {
        kind: "Estimation",
        value: format!("{key}: {value:?}"),
    });
    methods.chain(estimations).collect()
}

fn report_csv(
    identity: &SubmissionIdentity,
    fingerprint: &Fingerprint,
) -> Result<Vec<u8>, StoreError> {
    let archive_err = |err: &dyn std::fmt::Display| StoreError::Archive {
        identity: identity.clone(),
        reason: format!("submission report: {err}"),
    };
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(["Type", "Value"])
        .map_err(|err| archive_err(&err))?;
    for row in submission_rows(fingerprint) {
        wtr.write_record([row.kind, row.value.as_str()])
            .map_err(|err| archive_err(&err))?;
    }
    wtr.into_inner().map_err(|err| archive_err(&err))
}

/// Build the zip archive bytes for a submission.
///
/// Returns the bytes and the entry names in archive order.
pub(crate) fn build_archive(
    identity: &SubmissionIdentity,
    fingerprint: &Fingerprint,
    artifacts: &[Artifact],
) -> Result<(Vec<u8>, Vec<String>), StoreError> {
    let archive_err = |reason: String| StoreError::Archive {
        identity: identity.clone(),
        reason,
    };

    let mut entries: Vec<String> = Vec::with_capacity(artifacts.len() + 2);
    for artifact in artifacts {
        if artifact.name == FINGERPRINT_ENTRY || artifact.name == REPORT_ENTRY {
            return Err(archive_err(format!(
                "artifact name {:?} is reserved",
                artifact.name
            )));
        }
        if entries.contains(&artifact.name) {
            return Err(archive_err(format!(
                "duplicate artifact name {:?}",
                artifact.name
            )));
        }
        entries.push(artifact.name.clone());
    }

    let fingerprint_json = serde_json::to_vec(fingerprint)
        .map_err(|err| archive_err(format!("serialize fingerprint: {err}")))?;
    let report = report_csv(identity, fingerprint)?;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default();
    let mut add = |name: &str, bytes: &[u8]| -> Result<(), StoreError> {
        zip.start_file(name, options)
            .map_err(|err| archive_err(format!("{name}: {err}")))?;
        zip.write_all(bytes)
            .map_err(|err| archive_err(format!("{name}: {err}")))
    };
    for artifact in artifacts {
        add(&artifact.name, &artifact.bytes)?;
    }
    add(FINGERPRINT_ENTRY, &fingerprint_json)?;
    add(REPORT_ENTRY, &report)?;
    let cursor = zip
        .finish()
        .map_err(|err| archive_err(format!("finish: {err}")))?;

    entries.push(FINGERPRINT_ENTRY.to_string());
    entries.push(REPORT_ENTRY.to_string());
    Ok((cursor.into_inner(), entries))
}

/// Read the fingerprint entry back out of archive bytes. A fingerprint whose
/// cells do not decode is treated as a corrupt archive.
pub(crate) fn read_fingerprint(
    identity: &SubmissionIdentity,
    bytes: &[u8],
) -> Result<Fingerprint, StoreError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|err| StoreError::corrupt(identity, format!("unreadable archive: {err}")))?;
    let mut entry = archive
        .by_name(FINGERPRINT_ENTRY)
        .map_err(|err| StoreError::corrupt(identity, format!("{FINGERPRINT_ENTRY}: {err}")))?;
    let mut raw = String::new();
    entry
        .read_to_string(&mut raw)
        .map_err(|err| StoreError::corrupt(identity, format!("{FINGERPRINT_ENTRY}: {err}")))?;
    let fingerprint: Fingerprint = serde_json::from_str(&raw)
        .map_err(|err| StoreError::corrupt(identity, format!("{FINGERPRINT_ENTRY}: {err}")))?;
    fingerprint
        .decoded_cells()
        .map_err(|err| StoreError::corrupt(identity, format!("{FINGERPRINT_ENTRY}: {err}")))?;
    Ok(fingerprint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn identity() -> SubmissionIdentity {
        SubmissionIdentity::new("s1", "hw1").unwrap()
    }

    fn fingerprint() -> Fingerprint {
        Fingerprint {
            version: 1,
            encoded_cells: vec![canonical::encode_cell("def f():\n    pass\n")],
            implemented_methods: vec!["def f():".into(), "def f():".into()],
            estimations: BTreeMap::from([("depth".to_string(), 3.0), ("acc".to_string(), 0.5)]),
        }
    }

    #[test]
    fn rows_list_methods_then_estimations() {
        let rows = submission_rows(&fingerprint());
        let flat: Vec<(&str, &str)> = rows.iter().map(|r| (r.kind, r.value.as_str())).collect();
        assert_eq!(
            flat,
            vec![
                ("Method", "def f():"),
                ("Method", "def f():"),
                ("Estimation", "acc: 0.5"),
                ("Estimation", "depth: 3.0"),
            ]
        );
    }

    #[test]
    fn archive_contains_all_entries() {
        let artifacts = [
            Artifact::new("main.ipynb", b"{}".to_vec()),
            Artifact::new("questions.docx", b"doc".to_vec()),
        ];
        let (bytes, entries) = build_archive(&identity(), &fingerprint(), &artifacts).unwrap();
        assert_eq!(
            entries,
            vec!["main.ipynb", "questions.docx", FINGERPRINT_ENTRY, REPORT_ENTRY]
        );

        let mut archive = ZipArchive::new(Cursor::new(bytes.as_slice())).unwrap();
        let mut report = String::new();
        archive
            .by_name(REPORT_ENTRY)
            .unwrap()
            .read_to_string(&mut report)
            .unwrap();
        assert!(report.starts_with("Type,Value\n"));
        assert!(report.contains("Estimation,depth: 3.0"));

        let restored = read_fingerprint(&identity(), &bytes).unwrap();
        assert_eq!(restored, fingerprint());
    }

    #[test]
    fn reserved_artifact_names_rejected() {
        let artifacts = [Artifact::new(FINGERPRINT_ENTRY, b"x".to_vec())];
        let err = build_archive(&identity(), &fingerprint(), &artifacts).unwrap_err();
        assert!(matches!(err, StoreError::Archive { .. }));
    }

    #[test]
    fn garbage_bytes_are_corrupt() {
        let err = read_fingerprint(&identity(), b"definitely not a zip").unwrap_err();
        assert!(matches!(err, StoreError::CorruptArchive { .. }));
    }

    #[test]
    fn undecodable_cells_are_corrupt() {
        let mut broken = fingerprint();
        broken.encoded_cells.push("@@not-base64@@".into());
        let (bytes, _) = build_archive(&identity(), &broken, &[]).unwrap();

        let err = read_fingerprint(&identity(), &bytes).unwrap_err();
        match err {
            StoreError::CorruptArchive { identity: who, reason } => {
                assert_eq!(who, identity());
                assert!(reason.contains(FINGERPRINT_ENTRY));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn archive_without_fingerprint_is_corrupt() {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        zip.start_file("main.ipynb", FileOptions::default()).unwrap();
        zip.write_all(b"{}").unwrap();
        let bytes = zip.finish().unwrap().into_inner();

        let err = read_fingerprint(&identity(), &bytes).unwrap_err();
        match err {
            StoreError::CorruptArchive { reason, .. } => assert!(reason.contains(FINGERPRINT_ENTRY)),
            other => panic!("unexpected error: {other}"),
        }
    }
}
