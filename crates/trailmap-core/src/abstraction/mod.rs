//! Two-stage abstraction level estimation.
//!
//! Stage one is local: ontology terms when the record mentions any,
//! otherwise a keyword cascade. Stage two optionally consults an external
//! [`trailmap_protocol::TextClassifier`] and reconciles both answers by
//! confidence.

mod heuristic;
mod refine;
mod stage1;

pub use heuristic::{HeuristicTier, NO_MATCH_CONFIDENCE, heuristic_estimate, heuristic_tiers};
pub use refine::{AbstractionRefiner, merge_classification};
pub use stage1::{estimate_abstraction, estimate_batch, estimate_text};
