//! Controlled vocabulary for learning topics.
//!
//! The ontology maps canonical terms to aliases, a category, prerequisite
//! terms and an abstraction level. It is an explicit immutable value that
//! callers thread through every lookup; [`Ontology::builtin`] returns the
//! default web-development vocabulary.

mod classify;
mod document;
mod error;
mod extract;
mod model;
mod vocabulary;

/// Keyword matching used by the category fallback and by heuristics.
pub use classify::{CategoryRule, KeywordPattern};
/// Serializable ontology file layout.
pub use document::{CategoryDocument, OntologyDocument, RuleDocument, TermDocument};
/// Errors raised while building or loading an ontology.
pub use error::OntologyError;
/// Ontology value, its builder, and entry types.
pub use model::{CategoryInfo, Ontology, OntologyBuilder, TermDefinition};
/// Name of the built-in catch-all category.
pub use vocabulary::DEFAULT_FALLBACK_CATEGORY;
