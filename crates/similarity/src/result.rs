use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Full outcome of comparing two fingerprints.
///
/// "A" and "B" refer to the first and second argument of
/// [`score`](crate::score).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ComparisonResult {
    pub cell_similarity: f64,
    pub method_similarity: f64,
    pub estimation_similarity: f64,
    /// Unweighted mean of the three components.
    pub overall_similarity: f64,
    /// Sorted signatures implemented by both submissions.
    pub common_methods: Vec<String>,
    /// Sorted signatures implemented only by A.
    pub unique_methods_a: Vec<String>,
    /// Sorted signatures implemented only by B.
    pub unique_methods_b: Vec<String>,
    /// Shared estimation keys with `(value_a, value_b)`.
    pub common_estimations: BTreeMap<String, (f64, f64)>,
}

impl ComparisonResult {
    /// The three component scores in `(cells, methods, estimations)` order.
    pub fn components(&self) -> (f64, f64, f64) {
        (
            self.cell_similarity,
            self.method_similarity,
            self.estimation_similarity,
        )
    }
}
