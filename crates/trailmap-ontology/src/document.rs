//! JSON5 ontology documents.
//!
//! A document replaces the built-in vocabulary entirely. Terms and
//! categories are arrays so that declaration order, which drives
//! classification, survives parsing.

use crate::error::OntologyError;
use crate::model::{CategoryInfo, Ontology, TermDefinition};
use crate::vocabulary::default_rules;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use trailmap_protocol::AbstractionLevel;

/// On-disk ontology layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OntologyDocument {
    pub categories: Vec<CategoryDocument>,
    pub terms: Vec<TermDocument>,
    /// Keyword rules; when omitted, the built-in rules for declared
    /// categories apply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<RuleDocument>>,
    /// Catch-all category; defaults to the last declared category.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_category: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CategoryDocument {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TermDocument {
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abstraction_level: Option<AbstractionLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RuleDocument {
    pub category: String,
    pub pattern: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unless_followed_by: Option<String>,
}

fn default_color() -> String {
    "gray".to_string()
}

impl OntologyDocument {
    pub fn from_json5_str(contents: &str) -> Result<Self, OntologyError> {
        Ok(json5::from_str(contents)?)
    }

    /// Validate the document and build the ontology it describes.
    pub fn into_ontology(self) -> Result<Ontology, OntologyError> {
        let declared: Vec<String> = self
            .categories
            .iter()
            .map(|category| category.name.clone())
            .collect();
        let mut builder = Ontology::builder();
        for category in self.categories {
            builder = builder.category(CategoryInfo {
                name: category.name,
                description: category.description,
                color: category.color,
                icon: category.icon,
                parent: category.parent,
            });
        }
        for term in self.terms {
            builder = builder.term(TermDefinition {
                name: term.name,
                aliases: term.aliases,
                category: term.category,
                prerequisites: term.prerequisites,
                abstraction_level: term.abstraction_level,
                description: term.description,
            });
        }
        if let Some(name) = self.fallback_category {
            builder = builder.fallback_category(name);
        }
        builder = match self.rules {
            Some(rules) => rules.into_iter().fold(builder, |builder, rule| {
                builder.fallback_rule(rule.category, rule.pattern, rule.unless_followed_by.as_deref())
            }),
            None => default_rules(builder, |category| {
                declared.iter().any(|name| name == category)
            }),
        };
        builder.build()
    }
}

impl Ontology {
    /// Parse and validate an ontology from JSON5 text.
    pub fn from_json5_str(contents: &str) -> Result<Ontology, OntologyError> {
        OntologyDocument::from_json5_str(contents)?.into_ontology()
    }

    /// Load an ontology file.
    pub fn load_from_path(path: &Path) -> Result<Ontology, OntologyError> {
        debug!("loading ontology (path={})", path.display());
        let contents = fs::read_to_string(path)?;
        Self::from_json5_str(&contents)
    }
}
