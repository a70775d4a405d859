use std::collections::BTreeMap;

use store::{FingerprintStore, StoreError, SubmissionIdentity};
use tracing::info;

/// Report which `required` method signatures the stored submission
/// implements. Signatures are compared after trimming, as a set.
pub fn check_required_methods<S: AsRef<str>>(
    store: &dyn FingerprintStore,
    identity: &SubmissionIdentity,
    required: &[S],
) -> Result<BTreeMap<String, bool>, StoreError> {
    let fingerprint = store.load(identity)?;
    let implemented = fingerprint.method_set();
    let report: BTreeMap<String, bool> = required
        .iter()
        .map(|sig| {
            let sig = sig.as_ref().trim();
            (sig.to_string(), implemented.contains(sig))
        })
        .collect();
    let missing = report.values().filter(|present| !**present).count();
    info!(%identity, required = report.len(), missing, "required_methods_checked");
    Ok(report)
}
