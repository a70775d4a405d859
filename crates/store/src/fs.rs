//! Filesystem archive store.
//!
//! Layout: `<root>/<assignment>/<student_id>.zip`. Archives are written to a
//! temporary file in the target directory and then renamed into place, so a
//! reader never observes a half-written archive.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use canonical::Fingerprint;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::archive::{build_archive, read_fingerprint, ArchiveHandle, Artifact};
use crate::backend::FingerprintStore;
use crate::error::StoreError;
use crate::identity::SubmissionIdentity;

const ARCHIVE_EXTENSION: &str = "zip";

pub struct ArchiveStore {
    root: PathBuf,
}

impl ArchiveStore {
    /// Open a store rooted at `root`, creating the directory if absent.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|err| StoreError::io(&root, err))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Archive path for an identity.
    pub fn archive_path(&self, identity: &SubmissionIdentity) -> PathBuf {
        self.root
            .join(&identity.assignment)
            .join(format!("{}.{ARCHIVE_EXTENSION}", identity.student_id))
    }
}

impl FingerprintStore for ArchiveStore {
    fn save(
        &self,
        identity: &SubmissionIdentity,
        fingerprint: &Fingerprint,
        artifacts: &[Artifact],
    ) -> Result<ArchiveHandle, StoreError> {
        let (bytes, entries) = build_archive(identity, fingerprint, artifacts)?;
        let path = self.archive_path(identity);
        let parent = path
            .parent()
            .ok_or_else(|| StoreError::io(&path, "archive path has no parent"))?;
        fs::create_dir_all(parent).map_err(|err| StoreError::io(parent, err))?;

        let mut temp = NamedTempFile::new_in(parent).map_err(|err| StoreError::io(parent, err))?;
        temp.write_all(&bytes)
            .map_err(|err| StoreError::io(temp.path(), err))?;
        temp.persist(&path)
            .map_err(|err| StoreError::io(&path, err.error))?;

        info!(
            %identity,
            path = %path.display(),
            bytes = bytes.len(),
            "submission_saved"
        );
        Ok(ArchiveHandle {
            identity: identity.clone(),
            path: Some(path),
            entries,
        })
    }

    fn load(&self, identity: &SubmissionIdentity) -> Result<Fingerprint, StoreError> {
        let path = self.archive_path(identity);
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::SubmissionNotFound {
                    identity: identity.clone(),
                })
            }
            Err(err) => return Err(StoreError::io(&path, err)),
        };
        debug!(%identity, bytes = bytes.len(), "submission_loaded");
        read_fingerprint(identity, &bytes)
    }

    fn list(&self, assignment: &str) -> Result<Vec<SubmissionIdentity>, StoreError> {
        let dir = self.root.join(assignment);
        let read_dir = match fs::read_dir(&dir) {
            Ok(read_dir) => read_dir,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(StoreError::io(&dir, err)),
        };

        let mut ids = Vec::new();
        for entry in read_dir {
            let path = entry.map_err(|err| StoreError::io(&dir, err))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(ARCHIVE_EXTENSION) {
                continue;
            }
            let Some(student_id) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            // Files whose names cannot form an identity are not ours.
            if let Ok(identity) = SubmissionIdentity::new(student_id, assignment) {
                ids.push(identity);
            }
        }
        ids.sort();
        Ok(ids)
    }
}
