use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use canonical::Fingerprint;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::archive::{build_archive, read_fingerprint, ArchiveHandle, Artifact};
use crate::error::StoreError;
use crate::fs::ArchiveStore;
use crate::identity::SubmissionIdentity;

/// Persistence seam for submission fingerprints.
///
/// A store is written once per submission and read many times during audits.
/// Implementations must tolerate concurrent readers; concurrent writers for
/// the same identity are not supported.
pub trait FingerprintStore: Send + Sync {
    /// Package the fingerprint with its artifacts under `identity`,
    /// replacing any previous submission for it.
    fn save(
        &self,
        identity: &SubmissionIdentity,
        fingerprint: &Fingerprint,
        artifacts: &[Artifact],
    ) -> Result<ArchiveHandle, StoreError>;

    /// Retrieve exactly the fingerprint previously saved for `identity`.
    fn load(&self, identity: &SubmissionIdentity) -> Result<Fingerprint, StoreError>;

    /// All stored identities for an assignment, sorted by student id.
    fn list(&self, assignment: &str) -> Result<Vec<SubmissionIdentity>, StoreError>;
}

/// Configuration for selecting and building a store backend.
///
/// ```
/// use store::StoreConfig;
///
/// let config = StoreConfig::in_memory();
/// let config = StoreConfig::archive("/srv/submissions");
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "snake_case")]
pub enum StoreConfig {
    /// Zip archives on the local filesystem under `root`.
    Archive { root: PathBuf },
    /// Archives held in memory; useful for tests and one-off audits.
    #[default]
    InMemory,
}

impl StoreConfig {
    pub fn in_memory() -> Self {
        StoreConfig::InMemory
    }

    pub fn archive<P: Into<PathBuf>>(root: P) -> Self {
        StoreConfig::Archive { root: root.into() }
    }

    pub fn build(&self) -> Result<Box<dyn FingerprintStore>, StoreError> {
        match self {
            StoreConfig::InMemory => Ok(Box::new(InMemoryStore::new())),
            StoreConfig::Archive { root } => Ok(Box::new(ArchiveStore::open(root)?)),
        }
    }
}

/// An in-memory store using a `RwLock` around a `HashMap` of archive bytes.
pub struct InMemoryStore {
    archives: RwLock<HashMap<SubmissionIdentity, Vec<u8>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            archives: RwLock::new(HashMap::new()),
        }
    }

    /// Replace the stored archive bytes for an identity verbatim.
    pub fn put_raw(
        &self,
        identity: SubmissionIdentity,
        bytes: Vec<u8>,
    ) -> Result<(), StoreError> {
        self.archives
            .write()
            .map_err(|_| StoreError::Backend("poisoned lock".into()))?
            .insert(identity, bytes);
        Ok(())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FingerprintStore for InMemoryStore {
    fn save(
        &self,
        identity: &SubmissionIdentity,
        fingerprint: &Fingerprint,
        artifacts: &[Artifact],
    ) -> Result<ArchiveHandle, StoreError> {
        let (bytes, entries) = build_archive(identity, fingerprint, artifacts)?;
        self.put_raw(identity.clone(), bytes)?;
        info!(%identity, entries = entries.len(), "submission_saved");
        Ok(ArchiveHandle {
            identity: identity.clone(),
            path: None,
            entries,
        })
    }

    fn load(&self, identity: &SubmissionIdentity) -> Result<Fingerprint, StoreError> {
        let guard = self
            .archives
            .read()
            .map_err(|_| StoreError::Backend("poisoned lock".into()))?;
        let bytes = guard
            .get(identity)
            .ok_or_else(|| StoreError::SubmissionNotFound {
                identity: identity.clone(),
            })?;
        read_fingerprint(identity, bytes)
    }

    fn list(&self, assignment: &str) -> Result<Vec<SubmissionIdentity>, StoreError> {
        let guard = self
            .archives
            .read()
            .map_err(|_| StoreError::Backend("poisoned lock".into()))?;
        let mut ids: Vec<SubmissionIdentity> = guard
            .keys()
            .filter(|id| id.assignment == assignment)
            .cloned()
            .collect();
        ids.sort();
        Ok(ids)
    }
}
