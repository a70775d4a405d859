use std::collections::BTreeMap;

use canonical::Fingerprint;
use tracing::trace;

use crate::config::{CellPolicy, ScoreConfig, ESTIMATION_TOLERANCE};
use crate::error::{Component, ScoreError, Side};
use crate::result::ComparisonResult;

/// Score two fingerprints. Pure; the fingerprints must already be loaded.
///
/// All three components are ratios in [0, 1]; the overall score is their
/// unweighted mean. Every component is symmetric in its arguments.
pub fn score(
    a: &Fingerprint,
    b: &Fingerprint,
    cfg: &ScoreConfig,
) -> Result<ComparisonResult, ScoreError> {
    cfg.validate()?;

    let cell_similarity = cell_similarity(a, b, cfg.cell_policy)?;
    let methods = method_overlap(a, b)?;
    let estimations = estimation_overlap(a, b)?;

    let overall_similarity =
        (cell_similarity + methods.similarity + estimations.similarity) / 3.0;
    trace!(
        cell_similarity,
        method_similarity = methods.similarity,
        estimation_similarity = estimations.similarity,
        overall_similarity,
        "pair_scored"
    );

    Ok(ComparisonResult {
        cell_similarity,
        method_similarity: methods.similarity,
        estimation_similarity: estimations.similarity,
        overall_similarity,
        common_methods: methods.common,
        unique_methods_a: methods.only_a,
        unique_methods_b: methods.only_b,
        common_estimations: estimations.common,
    })
}

/// Cell component under the given policy.
pub fn cell_similarity(
    a: &Fingerprint,
    b: &Fingerprint,
    policy: CellPolicy,
) -> Result<f64, ScoreError> {
    let cells_a = a
        .decoded_cells()
        .map_err(|source| ScoreError::CorruptCells { side: Side::A, source })?;
    let cells_b = b
        .decoded_cells()
        .map_err(|source| ScoreError::CorruptCells { side: Side::B, source })?;

    if cells_a.is_empty() && cells_b.is_empty() {
        return Err(ScoreError::EmptySubmission {
            component: Component::Cells,
        });
    }
    match policy {
        CellPolicy::Positional => positional(&cells_a, &cells_b),
        CellPolicy::VectorSpace => vector_space(&cells_a, &cells_b),
    }
}

fn positional(cells_a: &[String], cells_b: &[String]) -> Result<f64, ScoreError> {
    let larger = cells_a.len().max(cells_b.len());
    let identical = cells_a
        .iter()
        .zip(cells_b)
        .filter(|(x, y)| x.as_bytes() == y.as_bytes())
        .count();
    Ok(identical as f64 / larger as f64)
}

#[cfg(feature = "tfidf")]
fn vector_space(cells_a: &[String], cells_b: &[String]) -> Result<f64, ScoreError> {
    let doc_a = crate::tfidf::document(cells_a);
    let doc_b = crate::tfidf::document(cells_b);
    crate::tfidf::cosine_similarity(&doc_a, &doc_b).ok_or(ScoreError::EmptySubmission {
        component: Component::Cells,
    })
}

#[cfg(not(feature = "tfidf"))]
fn vector_space(_cells_a: &[String], _cells_b: &[String]) -> Result<f64, ScoreError> {
    Err(ScoreError::CapabilityUnavailable {
        capability: "vector-space".into(),
    })
}

struct MethodOverlap {
    similarity: f64,
    common: Vec<String>,
    only_a: Vec<String>,
    only_b: Vec<String>,
}

/// |A ∩ B| / max(|A|, |B|) over deduplicated signatures.
fn method_overlap(a: &Fingerprint, b: &Fingerprint) -> Result<MethodOverlap, ScoreError> {
    let set_a = a.method_set();
    let set_b = b.method_set();
    let larger = set_a.len().max(set_b.len());
    if larger == 0 {
        return Err(ScoreError::EmptySubmission {
            component: Component::Methods,
        });
    }

    let common = owned(set_a.intersection(&set_b));
    let only_a = owned(set_a.difference(&set_b));
    let only_b = owned(set_b.difference(&set_a));

    Ok(MethodOverlap {
        similarity: common.len() as f64 / larger as f64,
        common,
        only_a,
        only_b,
    })
}

fn owned<'a>(signatures: impl Iterator<Item = &'a &'a str>) -> Vec<String> {
    signatures.map(|sig| sig.to_string()).collect()
}

struct EstimationOverlap {
    similarity: f64,
    common: BTreeMap<String, (f64, f64)>,
}

/// Matching shared keys divided by the larger total key count.
fn estimation_overlap(a: &Fingerprint, b: &Fingerprint) -> Result<EstimationOverlap, ScoreError> {
    let larger = a.estimations.len().max(b.estimations.len());
    if larger == 0 {
        return Err(ScoreError::EmptySubmission {
            component: Component::Estimations,
        });
    }

    let mut common = BTreeMap::new();
    let mut matching = 0usize;
    for (key, value_a) in &a.estimations {
        if let Some(value_b) = b.estimations.get(key) {
            if (value_a - value_b).abs() < ESTIMATION_TOLERANCE {
                matching += 1;
            }
            common.insert(key.clone(), (*value_a, *value_b));
        }
    }

    Ok(EstimationOverlap {
        similarity: matching as f64 / larger as f64,
        common,
    })
}
