//! Local abstraction estimate from ontology terms, then keywords.

use super::heuristic::heuristic_estimate;
use std::collections::HashMap;
use trailmap_ontology::Ontology;
use trailmap_protocol::{
    AbstractionEstimation, AbstractionMethod, ConfirmedRecord, RecordId,
};

const BASE_CONFIDENCE: f64 = 0.7;
const PER_TERM_BONUS: f64 = 0.05;
const PER_DEPTH_BONUS: f64 = 0.05;

/// Estimate a record from its URL and title.
pub fn estimate_abstraction(ontology: &Ontology, record: &ConfirmedRecord) -> AbstractionEstimation {
    estimate_text(ontology, &record.topic_text())
}

/// Estimate arbitrary text.
///
/// Matched terms decide the level; without a match the keyword cascade
/// takes over.
pub fn estimate_text(ontology: &Ontology, text: &str) -> AbstractionEstimation {
    let terms = ontology.extract_terms(text);
    if terms.is_empty() {
        return heuristic_estimate(text);
    }
    from_terms(ontology, terms)
}

/// Stage-one estimates keyed by record id.
pub fn estimate_batch(
    ontology: &Ontology,
    records: &[ConfirmedRecord],
) -> HashMap<RecordId, AbstractionEstimation> {
    records
        .iter()
        .map(|record| (record.id.clone(), estimate_abstraction(ontology, record)))
        .collect()
}

/// Maximum level over `terms`, with confidence growing per term and per
/// step of the longest prerequisite chain behind the leading terms.
///
/// Depth is the length of that transitive chain, not the number of direct
/// prerequisites: a term requiring two roots has depth 1.
fn from_terms(ontology: &Ontology, terms: Vec<String>) -> AbstractionEstimation {
    let level = terms
        .iter()
        .map(|term| ontology.abstraction_level(term))
        .max()
        .unwrap_or_default();
    let leading: Vec<&str> = terms
        .iter()
        .filter(|term| ontology.abstraction_level(term) == level)
        .map(String::as_str)
        .collect();
    let depth = leading
        .iter()
        .map(|term| ontology.prerequisite_depth(term))
        .max()
        .unwrap_or(0);
    let confidence = (BASE_CONFIDENCE
        + PER_TERM_BONUS * terms.len() as f64
        + PER_DEPTH_BONUS * depth as f64)
        .min(1.0);

    AbstractionEstimation {
        level,
        confidence,
        method: AbstractionMethod::Ontology,
        reasoning: format!(
            "ontology terms: {} (prerequisite depth {depth})",
            leading.join(", ")
        ),
        detected_terms: terms,
    }
}
