use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use trailmap_protocol::{CapabilityError, EmbeddingProvider};

/// Same vector for every text.
#[derive(Debug, Clone)]
pub struct FixedEmbedder {
    vector: Vec<f32>,
}

impl FixedEmbedder {
    pub fn new(vector: Vec<f32>) -> Self {
        Self { vector }
    }
}

#[async_trait]
impl EmbeddingProvider for FixedEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>, CapabilityError> {
        Ok(self.vector.clone())
    }
}

/// Vectors chosen by the first registered substring found in the text.
#[derive(Debug, Clone, Default)]
pub struct MappedEmbedder {
    entries: Vec<(String, Vec<f32>)>,
    fallback: Option<Vec<f32>>,
}

impl MappedEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, needle: impl Into<String>, vector: Vec<f32>) -> Self {
        self.entries.push((needle.into(), vector));
        self
    }

    /// Vector for texts matching no needle; without one those texts fail.
    pub fn with_fallback(mut self, vector: Vec<f32>) -> Self {
        self.fallback = Some(vector);
        self
    }
}

#[async_trait]
impl EmbeddingProvider for MappedEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, CapabilityError> {
        self.entries
            .iter()
            .find(|(needle, _)| text.contains(needle.as_str()))
            .map(|(_, vector)| vector.clone())
            .or_else(|| self.fallback.clone())
            .ok_or_else(|| CapabilityError::MalformedResponse(format!("no vector for {text}")))
    }
}

/// Always fails, or reports itself unavailable.
#[derive(Debug, Clone, Default)]
pub struct FailingEmbedder {
    unavailable: bool,
}

impl FailingEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable() -> Self {
        Self { unavailable: true }
    }
}

#[async_trait]
impl EmbeddingProvider for FailingEmbedder {
    fn is_available(&self) -> bool {
        !self.unavailable
    }

    async fn embed(&self, _text: &str) -> Result<Vec<f32>, CapabilityError> {
        Err(CapabilityError::Request("embedding service offline".to_string()))
    }
}

/// Records every embedded text and answers from a per-text table.
#[derive(Debug, Clone)]
pub struct RecordingEmbedder {
    vectors: HashMap<String, Vec<f32>>,
    dimension: usize,
    seen: Arc<Mutex<Vec<String>>>,
}

impl RecordingEmbedder {
    /// Unknown texts embed as a zero vector of `dimension`.
    pub fn new(dimension: usize) -> (Self, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                vectors: HashMap::new(),
                dimension,
                seen: seen.clone(),
            },
            seen,
        )
    }

    pub fn with_vector(mut self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.into(), vector);
        self
    }
}

#[async_trait]
impl EmbeddingProvider for RecordingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, CapabilityError> {
        self.seen.lock().push(text.to_string());
        Ok(self
            .vectors
            .get(text)
            .cloned()
            .unwrap_or_else(|| vec![0.0; self.dimension]))
    }
}
