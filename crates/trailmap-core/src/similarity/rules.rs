//! Rule-based similarity from ontology terms, hostnames and levels.

use trailmap_ontology::Ontology;
use trailmap_protocol::{
    AbstractionEstimation, AbstractionLevel, ConfirmedRecord, SimilarityBreakdown,
};
use url::Url;

const SHARED_TERM_WEIGHT: f64 = 0.15;
const SHARED_TERM_CAP: f64 = 0.4;
const PREREQUISITE_BONUS: f64 = 0.3;
const SAME_HOST_BONUS: f64 = 0.2;
const LEVEL_CLOSENESS_MAX: f64 = 0.1;
const LEVEL_CLOSENESS_STEP: f64 = 0.025;

/// Per-record features read by the rule signal.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordProfile {
    pub terms: Vec<String>,
    pub level: AbstractionLevel,
    /// Lowercased hostname; empty when the URL does not parse.
    pub host: String,
}

impl RecordProfile {
    /// Extract terms and hostname; the level comes from `estimate` when
    /// present.
    pub fn new(
        ontology: &Ontology,
        record: &ConfirmedRecord,
        estimate: Option<&AbstractionEstimation>,
    ) -> Self {
        Self {
            terms: ontology.extract_terms(&record.topic_text()),
            level: estimate.map(|estimate| estimate.level).unwrap_or_default(),
            host: hostname(&record.session.url),
        }
    }
}

/// Hostname of a URL, or an empty string.
pub fn hostname(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|url| url.host_str().map(str::to_lowercase))
        .unwrap_or_default()
}

/// Score two profiles; the result is in [0, 1].
pub fn rule_similarity(
    ontology: &Ontology,
    left: &RecordProfile,
    right: &RecordProfile,
) -> (f64, SimilarityBreakdown) {
    let shared_terms: Vec<String> = left
        .terms
        .iter()
        .filter(|term| right.terms.contains(term))
        .cloned()
        .collect();
    let prerequisite_relation =
        covers_prerequisite(ontology, left, right) || covers_prerequisite(ontology, right, left);
    let category_match = !left.host.is_empty() && left.host == right.host;
    let abstraction_diff = left.level.distance(right.level);

    let mut score = (SHARED_TERM_WEIGHT * shared_terms.len() as f64).min(SHARED_TERM_CAP);
    if prerequisite_relation {
        score += PREREQUISITE_BONUS;
    }
    if category_match {
        score += SAME_HOST_BONUS;
    }
    score += (LEVEL_CLOSENESS_MAX - LEVEL_CLOSENESS_STEP * f64::from(abstraction_diff)).max(0.0);

    let breakdown = SimilarityBreakdown {
        shared_terms,
        prerequisite_relation,
        category_match,
        abstraction_diff,
    };
    (score.min(1.0), breakdown)
}

/// Whether some term of `dependent` declares a term of `base` as prerequisite.
fn covers_prerequisite(ontology: &Ontology, dependent: &RecordProfile, base: &RecordProfile) -> bool {
    dependent.terms.iter().any(|term| {
        base.terms
            .iter()
            .any(|candidate| ontology.requires(term, candidate))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;

    fn profile(terms: &[&str], level: u8, host: &str) -> RecordProfile {
        RecordProfile {
            terms: terms.iter().map(|term| term.to_string()).collect(),
            level: AbstractionLevel::clamped(i64::from(level)),
            host: host.to_string(),
        }
    }

    #[test]
    fn hostname_parses_or_is_empty() {
        assert_eq!(hostname("https://React.dev/learn"), "react.dev");
        assert_eq!(hostname("not a url"), "");
    }

    #[test]
    fn every_component_adds_up() {
        let ontology = Ontology::builtin();
        let left = profile(&["React", "React Hooks"], 3, "react.dev");
        let right = profile(&["React", "React Hooks", "Next.js"], 3, "react.dev");
        let (score, breakdown) = rule_similarity(&ontology, &left, &right);
        // 0.3 shared + 0.3 prerequisite + 0.2 host + 0.1 closeness, capped.
        assert_relative_eq!(score, 0.9, epsilon = 1e-9);
        assert_eq!(
            breakdown.shared_terms,
            vec!["React".to_string(), "React Hooks".to_string()]
        );
        assert!(breakdown.prerequisite_relation);
        assert!(breakdown.category_match);
        assert_eq!(breakdown.abstraction_diff, 0);
    }

    #[test]
    fn shared_terms_are_capped() {
        let ontology = Ontology::builtin();
        let terms = ["Git", "Algorithms", "Databases"];
        let (score, _) = rule_similarity(
            &ontology,
            &profile(&terms, 5, "a.example"),
            &profile(&terms, 1, "b.example"),
        );
        assert_relative_eq!(score, 0.4, epsilon = 1e-9);
    }

    #[test]
    fn unrelated_records_only_get_closeness() {
        let ontology = Ontology::builtin();
        let (score, breakdown) = rule_similarity(
            &ontology,
            &profile(&["Git"], 1, ""),
            &profile(&["Tailwind CSS"], 2, ""),
        );
        assert_relative_eq!(score, 0.075, epsilon = 1e-9);
        assert!(!breakdown.category_match);
        assert!(!breakdown.prerequisite_relation);
    }
}
