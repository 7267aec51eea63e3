//! Shared data model for the learning-graph pipeline.
//!
//! Confirmed records flow in, graph nodes and typed edges flow out. The
//! two optional external capabilities (text classification and embedding)
//! are declared here so every crate can depend on the same contract.

mod abstraction;
mod capability;
mod graph;
mod record;
mod similarity;

pub use abstraction::{AbstractionEstimation, AbstractionLevel, AbstractionMethod, Classification};
pub use capability::{CapabilityError, EmbeddingProvider, TextClassifier};
pub use graph::{EdgeKind, GraphEdge, GraphNode, LearningGraph, Position};
pub use record::{BrowsingSession, ConfirmedRecord, RecordId};
pub use similarity::{SimilarityBreakdown, SimilarityScore};
