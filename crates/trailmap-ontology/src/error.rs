//! Error types for ontology construction and loading.

use thiserror::Error;

/// Errors returned while building, validating or loading an ontology.
#[derive(Debug, Error)]
pub enum OntologyError {
    /// Reading an ontology file failed.
    #[error("failed to read ontology: {0}")]
    ReadFailed(#[from] std::io::Error),
    /// Parsing an ontology file failed.
    #[error("failed to parse ontology: {0}")]
    ParseFailed(#[from] json5::Error),
    /// The same canonical term was declared twice.
    #[error("duplicate term: {0}")]
    DuplicateTerm(String),
    /// The same category was declared twice.
    #[error("duplicate category: {0}")]
    DuplicateCategory(String),
    /// A term or rule points at a category that was never declared.
    #[error("{owner} references undeclared category {category}")]
    UnknownCategory { owner: String, category: String },
    /// A term lists itself as a prerequisite.
    #[error("term {0} lists itself as a prerequisite")]
    SelfReference(String),
    /// Prerequisites form a cycle.
    #[error("prerequisite cycle: {}", .0.join(" -> "))]
    PrerequisiteCycle(Vec<String>),
    /// A fallback rule pattern failed to compile.
    #[error("invalid pattern for category {category}: {message}")]
    InvalidPattern { category: String, message: String },
}
