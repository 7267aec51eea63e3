//! Test helpers shared across trailmap crates.

pub mod classifier;
pub mod embedding;
pub mod fixtures;

pub use classifier::{FailingClassifier, StubClassifier};
pub use embedding::{FailingEmbedder, FixedEmbedder, MappedEmbedder, RecordingEmbedder};
pub use fixtures::{BASE_TIME, node, record, record_at};
