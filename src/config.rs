//! YAML configuration file support for NBFP.
//!
//! One file configures every stage: canonicalization tokens, the cell
//! comparison policy, batch thresholds, the archive root and the log level.
//! Every section and field is optional; missing values fall back to the
//! defaults below.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! # NBFP configuration
//! version: "1.0"
//!
//! canonical:
//!   version: 1
//!   method_prefix: "def "
//!   estimation_marker: "# Estimation:"
//!
//! scoring:
//!   cell_policy: "positional"   # or "vector_space" (needs the tfidf feature)
//!
//! batch:
//!   cheating_threshold: 0.8
//!   suppression_fraction: 0.7
//!   failure_mode: "fail_fast"   # or "skip_failed"
//!   parallel: false
//!
//! store:
//!   root: "submissions"
//!
//! log_level: "info"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use audit::{BatchConfig, FailureMode};
use canonical::{CanonicalizeConfig, DEFAULT_ESTIMATION_MARKER, DEFAULT_METHOD_PREFIX};
use serde::{Deserialize, Serialize};
use similarity::{CellPolicy, ScoreConfig};
use store::StoreConfig;
use thiserror::Error;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level YAML configuration for the NBFP pipeline
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct NbfpConfig {
    /// Configuration format version
    #[serde(default = "default_format_version")]
    pub version: String,

    #[serde(default)]
    pub canonical: CanonicalYamlConfig,

    #[serde(default)]
    pub scoring: ScoringYamlConfig,

    #[serde(default)]
    pub batch: BatchYamlConfig,

    #[serde(default)]
    pub store: StoreYamlConfig,

    /// `tracing` filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl NbfpConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: NbfpConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.canonical.validate()?;
        self.batch.validate()?;
        self.scoring.validate()?;
        if self.log_level.trim().is_empty() {
            return Err(ConfigLoadError::Validation(
                "log_level must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn canonicalize_config(&self) -> CanonicalizeConfig {
        self.canonical.to_config()
    }

    pub fn score_config(&self) -> ScoreConfig {
        ScoreConfig {
            cell_policy: self.scoring.cell_policy,
        }
    }

    pub fn batch_config(&self) -> BatchConfig {
        BatchConfig {
            cheating_threshold: self.batch.cheating_threshold,
            suppression_fraction: self.batch.suppression_fraction,
            failure_mode: self.batch.failure_mode,
            parallel: self.batch.parallel,
            score: self.score_config(),
        }
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::archive(self.store.root.clone())
    }
}

impl Default for NbfpConfig {
    fn default() -> Self {
        Self {
            version: default_format_version(),
            canonical: CanonicalYamlConfig::default(),
            scoring: ScoringYamlConfig::default(),
            batch: BatchYamlConfig::default(),
            store: StoreYamlConfig::default(),
            log_level: default_log_level(),
        }
    }
}

/// Canonicalization stage YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CanonicalYamlConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default = "default_method_prefix")]
    pub method_prefix: String,

    #[serde(default = "default_estimation_marker")]
    pub estimation_marker: String,
}

impl CanonicalYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        self.to_config()
            .validate()
            .map_err(|err| ConfigLoadError::Validation(format!("canonical: {err}")))
    }

    fn to_config(&self) -> CanonicalizeConfig {
        CanonicalizeConfig {
            version: self.version,
            method_prefix: self.method_prefix.clone(),
            estimation_marker: self.estimation_marker.clone(),
        }
    }
}

impl Default for CanonicalYamlConfig {
    fn default() -> Self {
        Self {
            version: 1,
            method_prefix: default_method_prefix(),
            estimation_marker: default_estimation_marker(),
        }
    }
}

/// Pairwise scoring YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ScoringYamlConfig {
    #[serde(default)]
    pub cell_policy: CellPolicy,
}

impl ScoringYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if !self.cell_policy.is_available() {
            return Err(ConfigLoadError::Validation(
                "scoring.cell_policy vector_space requires the tfidf feature".to_string(),
            ));
        }
        Ok(())
    }
}

/// Batch audit YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchYamlConfig {
    #[serde(default = "default_cheating_threshold")]
    pub cheating_threshold: f64,

    #[serde(default = "default_suppression_fraction")]
    pub suppression_fraction: f64,

    #[serde(default)]
    pub failure_mode: FailureMode,

    #[serde(default)]
    pub parallel: bool,
}

impl BatchYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        for (name, value) in [
            ("cheating_threshold", self.cheating_threshold),
            ("suppression_fraction", self.suppression_fraction),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigLoadError::Validation(format!(
                    "batch.{name} must lie in [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

impl Default for BatchYamlConfig {
    fn default() -> Self {
        Self {
            cheating_threshold: default_cheating_threshold(),
            suppression_fraction: default_suppression_fraction(),
            failure_mode: FailureMode::FailFast,
            parallel: false,
        }
    }
}

/// Archive store YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StoreYamlConfig {
    #[serde(default = "default_store_root")]
    pub root: PathBuf,
}

impl Default for StoreYamlConfig {
    fn default() -> Self {
        Self {
            root: default_store_root(),
        }
    }
}

fn default_format_version() -> String {
    "1.0".to_string()
}
fn default_version() -> u32 {
    1
}
fn default_method_prefix() -> String {
    DEFAULT_METHOD_PREFIX.to_string()
}
fn default_estimation_marker() -> String {
    DEFAULT_ESTIMATION_MARKER.to_string()
}
fn default_cheating_threshold() -> f64 {
    audit::DEFAULT_CHEATING_THRESHOLD
}
fn default_suppression_fraction() -> f64 {
    audit::DEFAULT_SUPPRESSION_FRACTION
}
fn default_store_root() -> PathBuf {
    PathBuf::from("submissions")
}
fn default_log_level() -> String {
    "info".to_string()
}
