//! Category classification with an ordered keyword fallback.

use crate::error::OntologyError;
use crate::model::Ontology;
use regex::{Regex, RegexBuilder};
use trailmap_protocol::ConfirmedRecord;

/// Case-insensitive keyword pattern with an optional negative suffix.
///
/// A match immediately followed by `unless_followed_by` is ignored, which
/// covers cases like `js` not counting inside `json`.
#[derive(Debug, Clone)]
pub struct KeywordPattern {
    regex: Regex,
    unless_followed_by: Option<String>,
}

impl KeywordPattern {
    pub fn new(pattern: &str, unless_followed_by: Option<&str>) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        Ok(Self {
            regex,
            unless_followed_by: unless_followed_by
                .filter(|suffix| !suffix.is_empty())
                .map(str::to_string),
        })
    }

    /// Source pattern.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    pub fn is_match(&self, text: &str) -> bool {
        let Some(suffix) = self.unless_followed_by.as_deref() else {
            return self.regex.is_match(text);
        };
        self.regex.find_iter(text).any(|found| {
            let rest = &text[found.end()..];
            !rest
                .get(..suffix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(suffix))
        })
    }
}

/// Keyword rule mapping matching text to a category.
#[derive(Debug, Clone)]
pub struct CategoryRule {
    category: String,
    pattern: KeywordPattern,
}

impl CategoryRule {
    pub(crate) fn compile(
        category: String,
        pattern: &str,
        unless_followed_by: Option<String>,
    ) -> Result<Self, OntologyError> {
        let pattern = KeywordPattern::new(pattern, unless_followed_by.as_deref()).map_err(|err| {
            OntologyError::InvalidPattern {
                category: category.clone(),
                message: err.to_string(),
            }
        })?;
        Ok(Self { category, pattern })
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn pattern(&self) -> &KeywordPattern {
        &self.pattern
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.pattern.is_match(text)
    }
}

impl Ontology {
    /// Category of a record, from its URL followed by its title.
    pub fn classify(&self, record: &ConfirmedRecord) -> &str {
        self.classify_text(&record.topic_text())
    }

    /// Category of free text.
    ///
    /// The first matched term in ontology order decides, even when later
    /// terms belong to other categories. Without a term match the fallback
    /// rules are tried in order, then the fallback category.
    pub fn classify_text(&self, text: &str) -> &str {
        if let Some(idx) = self.matched_indices(text).next() {
            return self.term_category(&self.terms()[idx].name);
        }
        let lowered = text.to_lowercase();
        self.fallback_rules
            .iter()
            .find(|rule| rule.is_match(&lowered))
            .map(CategoryRule::category)
            .unwrap_or(self.fallback_category())
    }
}
