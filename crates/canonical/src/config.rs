//! Configuration types for notebook canonicalization.
//!
//! [`CanonicalizeConfig`] fixes the two literal tokens the canonicalizer looks
//! for inside code cells: the method-declaration prefix and the estimation
//! annotation marker. Fingerprints are only comparable when they were produced
//! with the same tokens, so the config carries a `version` that must be bumped
//! whenever extraction behavior changes.
//!
//! # Examples
//!
//! ```rust
//! use canonical::CanonicalizeConfig;
//!
//! let config = CanonicalizeConfig::default();
//! assert_eq!(config.version, 1);
//! assert_eq!(config.method_prefix, "def ");
//! assert_eq!(config.estimation_marker, "# Estimation:");
//! ```

use serde::{Deserialize, Serialize};

use crate::error::CanonicalError;

/// Default method-declaration prefix (Python notebooks).
pub const DEFAULT_METHOD_PREFIX: &str = "def ";

/// Default estimation annotation marker.
pub const DEFAULT_ESTIMATION_MARKER: &str = "# Estimation:";

/// Configuration for the notebook canonicalizer.
///
/// Serializes as:
///
/// ```json
/// {
///   "version": 1,
///   "method_prefix": "def ",
///   "estimation_marker": "# Estimation:"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CanonicalizeConfig {
    /// Version of the extraction rules. Must be >= 1.
    pub version: u32,

    /// A source line whose trimmed form starts with this prefix is a method
    /// declaration; the whole trimmed line is recorded as its signature.
    pub method_prefix: String,

    /// Literal token introducing an `<key>: <value>` estimation annotation.
    ///
    /// When a line contains the marker more than once, only the text after
    /// the last occurrence is parsed.
    pub estimation_marker: String,
}

impl CanonicalizeConfig {
    /// Validate the configuration before use.
    pub fn validate(&self) -> Result<(), CanonicalError> {
        if self.version == 0 {
            return Err(CanonicalError::InvalidConfig(
                "config version must be >= 1".into(),
            ));
        }
        if self.method_prefix.trim().is_empty() {
            return Err(CanonicalError::InvalidConfig(
                "method_prefix must not be empty".into(),
            ));
        }
        if self.estimation_marker.trim().is_empty() {
            return Err(CanonicalError::InvalidConfig(
                "estimation_marker must not be empty".into(),
            ));
        }
        Ok(())
    }
}

impl Default for CanonicalizeConfig {
    fn default() -> Self {
        Self {
            version: 1,
            method_prefix: DEFAULT_METHOD_PREFIX.to_string(),
            estimation_marker: DEFAULT_ESTIMATION_MARKER.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(CanonicalizeConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_version_rejected() {
        let cfg = CanonicalizeConfig {
            version: 0,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(CanonicalError::InvalidConfig(_))));
    }

    #[test]
    fn blank_marker_rejected() {
        let cfg = CanonicalizeConfig {
            estimation_marker: "  ".into(),
            ..Default::default()
        };
        let err = cfg.validate().expect_err("blank marker");
        match err {
            CanonicalError::InvalidConfig(msg) => assert!(msg.contains("estimation_marker")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
