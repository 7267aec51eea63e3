use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use trailmap_protocol::{AbstractionLevel, CapabilityError, Classification, TextClassifier};

/// Returns the same classification for every request and counts calls.
#[derive(Debug, Clone)]
pub struct StubClassifier {
    response: Classification,
    calls: Arc<Mutex<Vec<String>>>,
}

impl StubClassifier {
    pub fn new(category: impl Into<String>, level: u8, confidence: f64) -> Self {
        Self {
            response: Classification {
                category: category.into(),
                abstraction_level: AbstractionLevel::clamped(i64::from(level)),
                confidence,
                reasoning: "stub".to_string(),
            },
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.response.reasoning = reasoning.into();
        self
    }

    /// Titles seen so far, in call order.
    pub fn seen_titles(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl TextClassifier for StubClassifier {
    async fn classify(&self, title: &str, _url: &str) -> Result<Classification, CapabilityError> {
        self.calls.lock().push(title.to_string());
        Ok(self.response.clone())
    }
}

/// Always fails, or reports itself unavailable.
#[derive(Debug, Clone, Default)]
pub struct FailingClassifier {
    unavailable: bool,
}

impl FailingClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unavailable() -> Self {
        Self { unavailable: true }
    }
}

#[async_trait]
impl TextClassifier for FailingClassifier {
    fn is_available(&self) -> bool {
        !self.unavailable
    }

    async fn classify(&self, _title: &str, _url: &str) -> Result<Classification, CapabilityError> {
        Err(CapabilityError::Request("classifier offline".to_string()))
    }
}
