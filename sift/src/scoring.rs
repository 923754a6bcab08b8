//! Okapi BM25 scoring.
//!
//! Uses the non-negative IDF variant so a term appearing in more than
//! half the corpus scores zero rather than negative. Cross-field term
//! frequencies are summed by the caller; the effective weight is the
//! maximum of the matched fields' weights, so a title match is not
//! double-counted through summed boosts.

use crate::config::Bm25Config;

/// `max(0, ln((N − df + 0.5) / (df + 0.5) + 1))`.
pub fn idf(doc_freq: usize, doc_count: usize) -> f64 {
    let n = doc_count as f64;
    let df = doc_freq as f64;
    let raw = ((n - df + 0.5) / (df + 0.5) + 1.0).ln();
    raw.max(0.0)
}

/// Length-normalised term contribution, scaled by the field weight.
pub fn term_score(
    tf: f64,
    doc_length: f64,
    avg_doc_length: f64,
    idf: f64,
    weight: f64,
    config: &Bm25Config,
) -> f64 {
    let Bm25Config { k1, b } = *config;
    let norm = if avg_doc_length > 0.0 {
        doc_length / avg_doc_length
    } else {
        1.0
    };
    let denominator = tf + k1 * (1.0 - b + b * norm);
    if denominator <= 0.0 {
        return 0.0;
    }
    idf * (tf * (k1 + 1.0) / denominator) * weight
}
