use crate::client::GeminiClient;
use crate::wire::{Content, EmbedRequest, EmbedResponse};
use async_trait::async_trait;
use trailmap_protocol::{CapabilityError, EmbeddingProvider};

/// Embeddings from the `embedContent` endpoint.
#[derive(Clone)]
pub struct GeminiEmbedder {
    client: GeminiClient,
}

impl GeminiEmbedder {
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EmbeddingProvider for GeminiEmbedder {
    fn is_available(&self) -> bool {
        self.client.has_api_key()
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, CapabilityError> {
        let model = &self.client.config().embedding_model;
        let url = self.client.endpoint(model, "embedContent");
        let request = EmbedRequest {
            model: format!("models/{model}"),
            content: Content::text(text),
        };
        let response: EmbedResponse = self.client.post(&url, &request).await?;
        match response.embedding {
            Some(embedding) if !embedding.values.is_empty() => Ok(embedding.values),
            _ => Err(CapabilityError::MalformedResponse(
                "response carries no embedding values".to_string(),
            )),
        }
    }
}
