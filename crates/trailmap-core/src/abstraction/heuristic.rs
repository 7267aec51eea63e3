//! Keyword cascade used when a record mentions no ontology term.

use std::sync::LazyLock;
use trailmap_ontology::KeywordPattern;
use trailmap_protocol::{AbstractionEstimation, AbstractionLevel, AbstractionMethod};

/// Confidence of the estimate produced when no tier matches.
pub const NO_MATCH_CONFIDENCE: f64 = 0.3;

/// One level of the keyword cascade.
#[derive(Debug)]
pub struct HeuristicTier {
    pub name: &'static str,
    pub level: AbstractionLevel,
    pub confidence: f64,
    patterns: Vec<KeywordPattern>,
}

impl HeuristicTier {
    pub fn matches(&self, text: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.is_match(text))
    }
}

// Checked top to bottom; the first matching tier wins.
static TIERS: LazyLock<Vec<HeuristicTier>> = LazyLock::new(|| {
    vec![
        tier(
            "expert",
            5,
            0.6,
            &[
                (r"research|論文|specification|仕様書", None),
                (r"custom implementation|独自実装", None),
                (r"cutting-edge|最先端", None),
            ],
        ),
        tier(
            "advanced",
            4,
            0.6,
            &[
                (r"advanced|expert|深掘り|詳解", None),
                (r"deep dive|internals|under the hood", None),
                (r"optimization|performance|最適化", None),
                (r"architecture|設計", None),
            ],
        ),
        tier(
            "intermediate",
            3,
            0.5,
            &[
                (r"intermediate|practical|実践|応用", None),
                (r"how to|guide|チュートリアル", None),
                (r"best practices|パターン", None),
            ],
        ),
        tier(
            "basic",
            2,
            0.5,
            &[
                (r"basic|basics|fundamentals|概要|とは", None),
                (r"introduction to|overview", None),
            ],
        ),
        tier(
            "beginner",
            1,
            0.6,
            &[
                (
                    r"beginner|初心者|入門|はじめて|getting started|tutorial|基礎",
                    None,
                ),
                (r"html", None),
                (r"css", Some("-in-js")),
                (r"git\s+basics|version control 入門", None),
            ],
        ),
    ]
});

fn tier(
    name: &'static str,
    level: u8,
    confidence: f64,
    patterns: &[(&str, Option<&str>)],
) -> HeuristicTier {
    HeuristicTier {
        name,
        level: AbstractionLevel::clamped(i64::from(level)),
        confidence,
        patterns: patterns
            .iter()
            .map(|(pattern, unless)| {
                KeywordPattern::new(pattern, *unless).expect("heuristic patterns compile")
            })
            .collect(),
    }
}

/// The cascade in evaluation order.
pub fn heuristic_tiers() -> &'static [HeuristicTier] {
    &TIERS
}

/// Estimate a level from free-text keywords alone.
pub fn heuristic_estimate(text: &str) -> AbstractionEstimation {
    let lowered = text.to_lowercase();
    match TIERS.iter().find(|tier| tier.matches(&lowered)) {
        Some(tier) => AbstractionEstimation {
            level: tier.level,
            confidence: tier.confidence,
            method: AbstractionMethod::Heuristic,
            reasoning: format!("{} keywords in title or URL", tier.name),
            detected_terms: Vec::new(),
        },
        None => AbstractionEstimation {
            level: AbstractionLevel::DEFAULT,
            confidence: NO_MATCH_CONFIDENCE,
            method: AbstractionMethod::Heuristic,
            reasoning: "no keywords detected; default level".to_string(),
            detected_terms: Vec::new(),
        },
    }
}
