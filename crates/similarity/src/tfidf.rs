//! Vector-space cell similarity.
//!
//! Each submission's decoded cells are preprocessed and concatenated into a
//! single document. The two documents form the whole corpus:
//!
//! - terms are preprocessed words of at least two characters
//! - `idf(t) = ln((1 + n) / (1 + df(t))) + 1` with `n = 2`
//! - weights are raw term counts times idf
//! - similarity is the cosine of the two weight vectors, 0 if exactly one
//!   document has no terms and undefined if neither has any

use std::collections::{BTreeMap, HashSet};
use std::sync::OnceLock;

use rust_stemmers::{Algorithm, Stemmer};
use unicode_segmentation::UnicodeSegmentation;

const MIN_TERM_CHARS: usize = 2;

/// NLTK English stop words.
fn english_stop_words() -> &'static HashSet<String> {
    static STOP: OnceLock<HashSet<String>> = OnceLock::new();
    STOP.get_or_init(|| {
        stop_words::get(stop_words::LANGUAGE::English)
            .into_iter()
            .map(|word| word.to_string())
            .collect()
    })
}

/// Lowercase, split into Unicode words, keep alphanumeric words that are not
/// English stop words, and reduce each to its English stem so inflected
/// forms (`trees`, `tree`) count as one term.
pub fn preprocess(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stop = english_stop_words();
    let stemmer = Stemmer::create(Algorithm::English);
    lowered
        .unicode_words()
        .filter(|word| word.chars().all(char::is_alphanumeric))
        .filter(|word| !stop.contains(*word))
        .map(|word| stemmer.stem(word).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Join preprocessed cells into one document.
pub fn document(cells: &[String]) -> String {
    cells
        .iter()
        .map(|cell| preprocess(cell))
        .collect::<Vec<_>>()
        .join(" ")
}

fn term_counts(doc: &str) -> BTreeMap<&str, f64> {
    let mut counts = BTreeMap::new();
    for term in doc.split_whitespace() {
        if term.chars().count() >= MIN_TERM_CHARS {
            *counts.entry(term).or_insert(0.0) += 1.0;
        }
    }
    counts
}

/// TF-IDF cosine similarity of two documents, in [0, 1].
///
/// Returns `None` when neither document contributes a single term, since the
/// corpus vocabulary is then empty.
pub fn cosine_similarity(doc_a: &str, doc_b: &str) -> Option<f64> {
    let counts_a = term_counts(doc_a);
    let counts_b = term_counts(doc_b);
    if counts_a.is_empty() && counts_b.is_empty() {
        return None;
    }
    let n_docs = 2.0_f64;
    let idf = |df: f64| ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0;

    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for (term, tf_a) in &counts_a {
        match counts_b.get(term) {
            Some(tf_b) => {
                let w = idf(2.0);
                let (wa, wb) = (tf_a * w, tf_b * w);
                dot += wa * wb;
                norm_a += wa * wa;
            }
            None => {
                let wa = tf_a * idf(1.0);
                norm_a += wa * wa;
            }
        }
    }
    for (term, tf_b) in &counts_b {
        let df = if counts_a.contains_key(term) { 2.0 } else { 1.0 };
        let wb = tf_b * idf(df);
        norm_b += wb * wb;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Some(0.0);
    }
    // sqrt of the product keeps identical documents at exactly 1.0
    Some((dot / (norm_a * norm_b).sqrt()).clamp(0.0, 1.0))
}
