use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use canonical::Fingerprint;
use rayon::prelude::*;
use similarity::{ComparisonResult, ScoreConfig};
use store::{FingerprintStore, StoreError, SubmissionIdentity};
use tracing::{debug, info, info_span, warn};

use crate::config::{BatchConfig, FailureMode};
use crate::error::{AuditError, PairFailure};
use crate::metrics::{metrics_recorder, AuditMetrics, MetricsSpan};
use crate::report::{BatchReport, PairScore, SkippedPair};

type PairOutcome = Result<ComparisonResult, PairFailure>;

/// Set when the cancel flag was observed mid-run.
struct Interrupted;

/// Scores every unordered pair of a submission batch against one store.
pub struct BatchAnalyzer<'s> {
    store: &'s dyn FingerprintStore,
}

impl<'s> BatchAnalyzer<'s> {
    pub fn new(store: &'s dyn FingerprintStore) -> Self {
        Self { store }
    }

    /// Analyze every submission stored for `assignment`, in student-id order.
    pub fn analyze_assignment(
        &self,
        assignment: &str,
        cfg: &BatchConfig,
    ) -> Result<BatchReport, AuditError> {
        let identities = self.store.list(assignment)?;
        self.analyze(&identities, cfg)
    }

    /// Score all `N(N-1)/2` pairs `(i, j)`, `i < j`, of `identities`.
    pub fn analyze(
        &self,
        identities: &[SubmissionIdentity],
        cfg: &BatchConfig,
    ) -> Result<BatchReport, AuditError> {
        self.analyze_with_cancel(identities, cfg, &AtomicBool::new(false))
    }

    /// Like [`analyze`](Self::analyze), but checks `cancel` between pairs.
    ///
    /// A cancelled run returns [`AuditError::Cancelled`]; no partial report is
    /// produced.
    pub fn analyze_with_cancel(
        &self,
        identities: &[SubmissionIdentity],
        cfg: &BatchConfig,
        cancel: &AtomicBool,
    ) -> Result<BatchReport, AuditError> {
        cfg.validate()?;
        reject_duplicates(identities)?;

        let start = Instant::now();
        let pairs = pair_indices(identities.len());
        let span = info_span!(
            "audit.analyze",
            submissions = identities.len(),
            pairs = pairs.len(),
            parallel = cfg.parallel
        );
        let _guard = span.enter();

        let recorder = metrics_recorder();
        let batch_metrics = MetricsSpan::start_with(recorder.as_ref());

        let fingerprints = self
            .load_all(identities, cancel)
            .map_err(|Interrupted| cancelled(start))?;

        let ctx = PairContext {
            fingerprints: &fingerprints,
            score: &cfg.score,
            recorder: recorder.as_ref(),
        };
        let outcomes = if cfg.parallel {
            ctx.score_parallel(&pairs, cancel)
        } else {
            ctx.score_sequential(&pairs, cfg.failure_mode, cancel)
        }
        .map_err(|Interrupted| cancelled(start))?;

        let report = assemble(identities, &pairs, outcomes, cfg)?;
        let elapsed_micros = start.elapsed().as_micros();
        info!(
            pairs = report.total_pairs(),
            skipped = report.skipped.len(),
            cheating_count = report.cheating_count,
            cheating_fraction = report.cheating_fraction,
            suppress = report.suppress,
            elapsed_micros,
            "batch_complete"
        );
        if let Some(span) = batch_metrics {
            span.record_batch(report.total_pairs(), report.cheating_count, report.suppress);
        }
        Ok(report)
    }

    /// Load each fingerprint once. Failures are kept per identity and
    /// surface on the pairs that need them.
    fn load_all(
        &self,
        identities: &[SubmissionIdentity],
        cancel: &AtomicBool,
    ) -> Result<Vec<Result<Fingerprint, StoreError>>, Interrupted> {
        let mut loaded = Vec::with_capacity(identities.len());
        for identity in identities {
            if cancel.load(Ordering::Relaxed) {
                return Err(Interrupted);
            }
            let result = self.store.load(identity);
            if let Err(err) = &result {
                warn!(%identity, error = %err, "fingerprint_load_failed");
            }
            loaded.push(result);
        }
        Ok(loaded)
    }
}

struct PairContext<'a> {
    fingerprints: &'a [Result<Fingerprint, StoreError>],
    score: &'a ScoreConfig,
    recorder: Option<&'a Arc<dyn AuditMetrics>>,
}

impl PairContext<'_> {
    fn score_sequential(
        &self,
        pairs: &[(usize, usize)],
        failure_mode: FailureMode,
        cancel: &AtomicBool,
    ) -> Result<Vec<PairOutcome>, Interrupted> {
        let mut outcomes = Vec::with_capacity(pairs.len());
        for &(i, j) in pairs {
            if cancel.load(Ordering::Relaxed) {
                return Err(Interrupted);
            }
            let outcome = self.score_pair(i, j);
            let stop = outcome.is_err() && failure_mode == FailureMode::FailFast;
            outcomes.push(outcome);
            if stop {
                break;
            }
        }
        Ok(outcomes)
    }

    /// Outcomes come back in pair order, so aggregation is identical to the
    /// sequential path.
    fn score_parallel(
        &self,
        pairs: &[(usize, usize)],
        cancel: &AtomicBool,
    ) -> Result<Vec<PairOutcome>, Interrupted> {
        pairs
            .par_iter()
            .map(|&(i, j)| {
                if cancel.load(Ordering::Relaxed) {
                    return Err(Interrupted);
                }
                Ok(self.score_pair(i, j))
            })
            .collect()
    }

    fn score_pair(&self, i: usize, j: usize) -> PairOutcome {
        let metrics = MetricsSpan::start_with(self.recorder);
        let outcome = self.compare(i, j);
        if let Some(span) = metrics {
            span.record_pair(outcome.as_ref().map(|_| ()).map_err(Clone::clone));
        }
        outcome
    }

    fn compare(&self, i: usize, j: usize) -> PairOutcome {
        let a = self.fingerprints[i].as_ref().map_err(|err| err.clone())?;
        let b = self.fingerprints[j].as_ref().map_err(|err| err.clone())?;
        let result = similarity::score(a, b, self.score)?;
        debug!(i, j, overall = result.overall_similarity, "pair_scored");
        Ok(result)
    }
}

fn assemble(
    identities: &[SubmissionIdentity],
    pairs: &[(usize, usize)],
    outcomes: Vec<PairOutcome>,
    cfg: &BatchConfig,
) -> Result<BatchReport, AuditError> {
    let mut scored = Vec::with_capacity(outcomes.len());
    let mut skipped = Vec::new();
    for (&(i, j), outcome) in pairs.iter().zip(outcomes) {
        let left = identities[i].clone();
        let right = identities[j].clone();
        match outcome {
            Ok(result) => scored.push(PairScore {
                left,
                right,
                result,
            }),
            Err(source) => match cfg.failure_mode {
                FailureMode::FailFast => {
                    warn!(%left, %right, error = %source, "batch_aborted");
                    return Err(AuditError::Pair {
                        left,
                        right,
                        source,
                    });
                }
                FailureMode::SkipFailed => {
                    warn!(%left, %right, error = %source, "pair_skipped");
                    skipped.push(SkippedPair {
                        left,
                        right,
                        reason: source.to_string(),
                    });
                }
            },
        }
    }
    Ok(BatchReport::new(
        scored,
        skipped,
        cfg.cheating_threshold,
        cfg.suppression_fraction,
    ))
}

/// `(i, j)` with `i < j`, in nested order.
fn pair_indices(n: usize) -> Vec<(usize, usize)> {
    (0..n)
        .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
        .collect()
}

fn reject_duplicates(identities: &[SubmissionIdentity]) -> Result<(), AuditError> {
    let mut seen = HashSet::with_capacity(identities.len());
    for identity in identities {
        if !seen.insert(identity) {
            return Err(AuditError::DuplicateIdentity(identity.clone()));
        }
    }
    Ok(())
}

fn cancelled(start: Instant) -> AuditError {
    let elapsed_micros = start.elapsed().as_micros();
    warn!(elapsed_micros, "batch_cancelled");
    AuditError::Cancelled
}
