//! Abstraction level estimates and the external classifier response.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Conceptual difficulty from 1 (foundational) to 5 (specialized).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct AbstractionLevel(u8);

impl AbstractionLevel {
    /// Lowest level.
    pub const MIN: AbstractionLevel = AbstractionLevel(1);
    /// Highest level.
    pub const MAX: AbstractionLevel = AbstractionLevel(5);
    /// Level assumed when nothing better is known.
    pub const DEFAULT: AbstractionLevel = AbstractionLevel(3);

    /// Build a level, rejecting values outside 1..=5.
    pub fn new(value: u8) -> Option<Self> {
        (1..=5).contains(&value).then_some(Self(value))
    }

    /// Build a level, clamping any integer into 1..=5.
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(1, 5) as u8)
    }

    /// Numeric value.
    pub fn get(self) -> u8 {
        self.0
    }

    /// Absolute distance between two levels (0..=4).
    pub fn distance(self, other: AbstractionLevel) -> u8 {
        self.0.abs_diff(other.0)
    }

    /// Human readable label.
    pub fn label(self) -> &'static str {
        match self.0 {
            1 => "Foundational",
            2 => "Beginner",
            3 => "Intermediate",
            4 => "Advanced",
            _ => "Expert",
        }
    }
}

impl Default for AbstractionLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u8> for AbstractionLevel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value).ok_or_else(|| format!("abstraction level out of range: {value}"))
    }
}

impl From<AbstractionLevel> for u8 {
    fn from(level: AbstractionLevel) -> Self {
        level.0
    }
}

impl fmt::Display for AbstractionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How an estimate was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbstractionMethod {
    /// Derived from matched ontology terms.
    Ontology,
    /// Derived from keyword heuristics.
    Heuristic,
    /// Taken from the external classifier.
    Llm,
    /// Average of the local estimate and the external classifier.
    Combined,
}

impl AbstractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AbstractionMethod::Ontology => "ontology",
            AbstractionMethod::Heuristic => "heuristic",
            AbstractionMethod::Llm => "llm",
            AbstractionMethod::Combined => "combined",
        }
    }
}

/// Abstraction estimate for a single record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbstractionEstimation {
    /// Estimated level.
    pub level: AbstractionLevel,
    /// Confidence in [0, 1].
    pub confidence: f64,
    /// Producing method.
    pub method: AbstractionMethod,
    /// Short explanation.
    pub reasoning: String,
    /// Canonical ontology terms detected in the record.
    pub detected_terms: Vec<String>,
}

impl AbstractionEstimation {
    /// Badge summarizing the confidence band.
    pub fn confidence_badge(&self) -> &'static str {
        if self.confidence >= 0.8 {
            "✓✓✓"
        } else if self.confidence >= 0.6 {
            "✓✓"
        } else if self.confidence >= 0.4 {
            "✓"
        } else {
            "?"
        }
    }
}

/// Response of the external text classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    pub category: String,
    pub abstraction_level: AbstractionLevel,
    /// Confidence in [0, 1].
    pub confidence: f64,
    pub reasoning: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn level_rejects_out_of_range() {
        assert_eq!(AbstractionLevel::new(0), None);
        assert_eq!(AbstractionLevel::new(6), None);
        assert_eq!(AbstractionLevel::new(4).map(AbstractionLevel::get), Some(4));
    }

    #[test]
    fn level_clamps_and_measures_distance() {
        assert_eq!(AbstractionLevel::clamped(-3), AbstractionLevel::MIN);
        assert_eq!(AbstractionLevel::clamped(99), AbstractionLevel::MAX);
        assert_eq!(AbstractionLevel::MIN.distance(AbstractionLevel::MAX), 4);
    }

    #[test]
    fn level_serializes_as_integer() {
        let encoded = serde_json::to_string(&AbstractionLevel::DEFAULT).expect("encode");
        assert_eq!(encoded, "3");
        let err = serde_json::from_str::<AbstractionLevel>("9");
        assert!(err.is_err());
    }

    #[test]
    fn badge_follows_confidence_bands() {
        let mut estimation = AbstractionEstimation {
            level: AbstractionLevel::DEFAULT,
            confidence: 0.85,
            method: AbstractionMethod::Ontology,
            reasoning: String::new(),
            detected_terms: Vec::new(),
        };
        assert_eq!(estimation.confidence_badge(), "✓✓✓");
        estimation.confidence = 0.6;
        assert_eq!(estimation.confidence_badge(), "✓✓");
        estimation.confidence = 0.45;
        assert_eq!(estimation.confidence_badge(), "✓");
        estimation.confidence = 0.3;
        assert_eq!(estimation.confidence_badge(), "?");
    }
}
