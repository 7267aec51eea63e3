//! Pairwise similarity results.

use crate::RecordId;
use serde::{Deserialize, Serialize};

/// Explanation of the rule-based signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityBreakdown {
    /// Canonical terms present in both records.
    pub shared_terms: Vec<String>,
    /// One record covers a declared prerequisite of the other.
    pub prerequisite_relation: bool,
    /// Both URLs share a hostname.
    pub category_match: bool,
    /// Absolute abstraction level difference.
    pub abstraction_diff: u8,
}

/// Combined similarity between two records.
///
/// Signals are symmetric, but `(a, b)` and `(b, a)` are distinct values;
/// callers dedupe when they need unordered pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimilarityScore {
    pub record_a: RecordId,
    pub record_b: RecordId,
    /// Weighted combination in [0, 1].
    pub overall_score: f64,
    /// Rule-based signal in [0, 1].
    pub rule_based_score: f64,
    /// TF-IDF cosine in [0, 1].
    pub statistical_score: f64,
    /// Embedding cosine in [0, 1], absent when no embedding was available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_score: Option<f64>,
    pub breakdown: SimilarityBreakdown,
}
