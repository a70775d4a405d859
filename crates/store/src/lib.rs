//! NBFP submission store.
//!
//! Persists a [`Fingerprint`](canonical::Fingerprint) together with the
//! original notebook and a tabular report in one zip archive per
//! [`SubmissionIdentity`], and reads the fingerprint back at audit time.
//!
//! Backends implement [`FingerprintStore`]:
//!
//! - [`ArchiveStore`]: `<root>/<assignment>/<student_id>.zip` on disk
//! - [`InMemoryStore`]: same archive bytes, held in a map
//!
//! ```
//! use canonical::{canonicalize, CanonicalizeConfig, Cell, Notebook};
//! use store::{Artifact, FingerprintStore, InMemoryStore, SubmissionIdentity};
//!
//! let notebook = Notebook::new(vec![Cell::code("def f():\n    pass\n")]);
//! let fp = canonicalize(&notebook, &CanonicalizeConfig::default()).unwrap();
//!
//! let store = InMemoryStore::new();
//! let id = SubmissionIdentity::new("s1", "hw1").unwrap();
//! store.save(&id, &fp, &[Artifact::new("main.ipynb", b"{}".to_vec())]).unwrap();
//! assert_eq!(store.load(&id).unwrap(), fp);
//! ```

mod archive;
mod backend;
mod error;
mod fs;
mod identity;

pub use crate::archive::{
    submission_rows, ArchiveHandle, Artifact, SubmissionRow, FINGERPRINT_ENTRY, REPORT_ENTRY,
};
pub use crate::backend::{FingerprintStore, InMemoryStore, StoreConfig};
pub use crate::error::StoreError;
pub use crate::fs::ArchiveStore;
pub use crate::identity::SubmissionIdentity;
