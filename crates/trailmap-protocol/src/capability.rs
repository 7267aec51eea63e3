//! Optional external capabilities: text classification and embeddings.
//!
//! Both are request/response calls without retries. Callers treat every
//! error as "no result" and fall back to local signals.

use crate::Classification;
use async_trait::async_trait;

/// Errors returned by external capabilities.
#[derive(Debug, thiserror::Error)]
pub enum CapabilityError {
    /// Capability is not configured (for example a missing API key).
    #[error("capability unavailable: {0}")]
    Unavailable(String),
    /// The request failed in transport or returned a non-success status.
    #[error("request failed: {0}")]
    Request(String),
    /// The response could not be interpreted.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Classifies a record's title and URL into a category and abstraction level.
#[async_trait]
pub trait TextClassifier: Send + Sync {
    /// Whether the classifier is configured to accept requests.
    fn is_available(&self) -> bool {
        true
    }

    /// Classify a single record.
    async fn classify(&self, title: &str, url: &str) -> Result<Classification, CapabilityError>;
}

/// Produces fixed-dimension embedding vectors for text.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Whether the provider is configured to accept requests.
    fn is_available(&self) -> bool {
        true
    }

    /// Embed a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, CapabilityError>;
}
