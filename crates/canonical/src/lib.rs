//! NBFP canonical notebook layer.
//!
//! This crate turns a notebook submission into a deterministic [`Fingerprint`]
//! that the similarity layer can compare. Downstream stages (store,
//! similarity, audit) never look at raw notebook JSON.
//!
//! ## What we do
//!
//! - Validate the notebook document once ([`Notebook`]); malformed input is
//!   rejected with the failing field and cell index
//! - Encode every code cell reversibly (base64) in document order
//! - Collect method-declaration signatures (`def ...` lines, trimmed)
//! - Collect numeric `# Estimation: key: value` annotations
//!
//! ## Pure function guarantee
//!
//! [`canonicalize`] does no I/O, reads no clock and depends on nothing but the
//! notebook and the config. Same notebook + same config = same fingerprint.
//!
//! ## Invariants worth knowing
//!
//! - `encoded_cells.len()` equals the number of code cells
//! - Decoding an encoded cell yields the exact original source
//! - Estimation values are always finite; a malformed annotation fails the
//!   whole extraction instead of being skipped
//!
//! ```rust
//! use canonical::{canonicalize, CanonicalizeConfig, Cell, Notebook};
//!
//! let notebook = Notebook::new(vec![
//!     Cell::code("def f():\n    pass\n"),
//!     Cell::markdown("Some notes"),
//!     Cell::code("# Estimation: x: 2.5\ndef g():\n    return 1\n"),
//! ]);
//! let fp = canonicalize(&notebook, &CanonicalizeConfig::default()).unwrap();
//!
//! assert_eq!(fp.encoded_cells.len(), 2);
//! assert_eq!(fp.implemented_methods, vec!["def f():", "def g():"]);
//! assert_eq!(fp.estimations.get("x"), Some(&2.5));
//! ```

mod config;
mod encoding;
mod error;
mod fingerprint;
mod notebook;
mod pipeline;

pub use crate::config::{CanonicalizeConfig, DEFAULT_ESTIMATION_MARKER, DEFAULT_METHOD_PREFIX};
pub use crate::encoding::{decode_cell, encode_cell};
pub use crate::error::CanonicalError;
pub use crate::fingerprint::Fingerprint;
pub use crate::notebook::{Cell, CellKind, Notebook};
pub use crate::pipeline::{canonicalize, canonicalize_json};
