//! Error types for the graph pipeline.

use thiserror::Error;
use trailmap_config::ConfigError;
use trailmap_ontology::OntologyError;

/// Errors returned by pipeline operations.
///
/// Capability failures never appear here; they degrade to local signals.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Two embeddings with different dimensionality were compared.
    #[error("embedding dimension mismatch: {left} vs {right}")]
    DimensionMismatch { left: usize, right: usize },
    /// A record id is not part of the scored corpus.
    #[error("unknown record: {0}")]
    UnknownRecord(String),
    /// A blocking scoring task panicked or was cancelled.
    #[error("task error: {0}")]
    Task(String),
    /// Loading or validating the ontology failed.
    #[error("ontology error: {0}")]
    Ontology(#[from] OntologyError),
    /// Config error.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}
