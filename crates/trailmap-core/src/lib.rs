//! Learning-graph pipeline for trailmap.
//!
//! Turns confirmed learning records into graph nodes with an abstraction
//! estimate, scores every pair of records for similarity, derives timeline
//! and similarity edges, and positions the nodes with a grid or polar
//! layout.

pub mod abstraction;
mod error;
pub mod graph;
pub mod layout;
mod pipeline;
pub mod similarity;

pub use error::CoreError;
pub use graph::{CategoryStats, available_categories, category_stats, understanding_score};
pub use layout::LayoutMode;
pub use pipeline::GraphPipeline;
pub use similarity::{EmbeddingCache, SimilarityMatrix, SimilarityScorer};
