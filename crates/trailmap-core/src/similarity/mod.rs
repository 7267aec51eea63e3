//! Pairwise record similarity.
//!
//! Three signals feed the combined score: a rule-based signal from shared
//! ontology terms, prerequisites, hostnames and abstraction levels; a TF-IDF
//! cosine over the corpus; and an optional embedding cosine.

mod matrix;
mod rules;
mod scorer;
mod semantic;
mod tfidf;

pub use matrix::SimilarityMatrix;
pub use rules::{RecordProfile, hostname, rule_similarity};
pub use scorer::{SimilarityScorer, combine};
pub use semantic::{EmbeddingCache, cached_similarity, cosine_similarity, semantic_similarity};
pub use tfidf::{TfIdfCorpus, tokenize};
