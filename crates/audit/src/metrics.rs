use std::sync::{Arc, OnceLock, RwLock};
use std::time::{Duration, Instant};

use crate::error::PairFailure;

/// Metrics observer for batch audits.
pub trait AuditMetrics: Send + Sync {
    /// Called once per scored (or failed) pair, possibly from rayon workers.
    fn record_pair(&self, latency: Duration, result: Result<(), PairFailure>);
    /// Called once per completed batch.
    fn record_batch(&self, latency: Duration, pairs: usize, cheating_count: usize, suppressed: bool);
}

/// Install or clear the global audit metrics recorder.
pub fn set_audit_metrics(recorder: Option<Arc<dyn AuditMetrics>>) {
    let mut guard = metrics_lock()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn AuditMetrics>>> {
    static METRICS: OnceLock<RwLock<Option<Arc<dyn AuditMetrics>>>> = OnceLock::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

pub(crate) fn metrics_recorder() -> Option<Arc<dyn AuditMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

pub(crate) struct MetricsSpan {
    recorder: Arc<dyn AuditMetrics>,
    start: Instant,
}

impl MetricsSpan {
    pub(crate) fn start_with(recorder: Option<&Arc<dyn AuditMetrics>>) -> Option<Self> {
        recorder.map(|recorder| Self {
            recorder: Arc::clone(recorder),
            start: Instant::now(),
        })
    }

    pub(crate) fn record_pair(self, result: Result<(), PairFailure>) {
        self.recorder.record_pair(self.start.elapsed(), result);
    }

    pub(crate) fn record_batch(self, pairs: usize, cheating_count: usize, suppressed: bool) {
        self.recorder
            .record_batch(self.start.elapsed(), pairs, cheating_count, suppressed);
    }
}
