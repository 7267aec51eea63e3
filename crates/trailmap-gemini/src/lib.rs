//! Gemini REST implementations of the trailmap capabilities.
//!
//! [`GeminiEmbedder`] implements [`trailmap_protocol::EmbeddingProvider`]
//! and [`GeminiClassifier`] implements [`trailmap_protocol::TextClassifier`].
//! Both report themselves unavailable when no API key is configured.

mod classifier;
mod client;
mod embedding;
mod wire;

pub use classifier::{GeminiClassifier, build_prompt, parse_classification};
pub use client::GeminiClient;
pub use embedding::GeminiEmbedder;
