use serde::{Deserialize, Serialize};
use similarity::ScoreConfig;

use crate::error::AuditError;

pub const DEFAULT_CHEATING_THRESHOLD: f64 = 0.8;
pub const DEFAULT_SUPPRESSION_FRACTION: f64 = 0.7;

/// What to do when a pair cannot be loaded or scored.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailureMode {
    /// Abort the whole batch on the first failing pair.
    #[default]
    FailFast,
    /// Record the pair in `BatchReport::skipped` and keep going.
    SkipFailed,
}

/// Configuration for a batch audit run.
///
/// ```
/// use audit::{BatchConfig, FailureMode};
///
/// let cfg = BatchConfig {
///     cheating_threshold: 0.9,
///     failure_mode: FailureMode::SkipFailed,
///     ..Default::default()
/// };
/// assert!(cfg.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BatchConfig {
    /// A pair is potential cheating when its overall similarity is strictly
    /// above this value.
    pub cheating_threshold: f64,
    /// Flags are suppressed when the fraction of flagged pairs is strictly
    /// above this value.
    pub suppression_fraction: f64,
    pub failure_mode: FailureMode,
    /// Score pairs on the rayon pool.
    pub parallel: bool,
    pub score: ScoreConfig,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            cheating_threshold: DEFAULT_CHEATING_THRESHOLD,
            suppression_fraction: DEFAULT_SUPPRESSION_FRACTION,
            failure_mode: FailureMode::default(),
            parallel: false,
            score: ScoreConfig::default(),
        }
    }
}

impl BatchConfig {
    pub fn validate(&self) -> Result<(), AuditError> {
        check_fraction("cheating_threshold", self.cheating_threshold)?;
        check_fraction("suppression_fraction", self.suppression_fraction)?;
        self.score.validate()?;
        Ok(())
    }
}

fn check_fraction(name: &str, value: f64) -> Result<(), AuditError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(AuditError::InvalidConfig(format!(
            "{name} must lie in [0, 1], got {value}"
        )));
    }
    Ok(())
}
