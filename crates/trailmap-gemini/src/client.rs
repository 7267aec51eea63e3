//! Shared HTTP plumbing for the Gemini endpoints.

use log::{debug, warn};
use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use trailmap_config::GeminiConfig;
use trailmap_protocol::CapabilityError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client bound to one API key and base URL.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Clone)]
pub struct GeminiClient {
    http: Client,
    config: GeminiConfig,
    api_key: Option<String>,
}

impl GeminiClient {
    /// Client with an explicit key; `None` makes every call unavailable.
    pub fn new(config: GeminiConfig, api_key: Option<String>) -> Result<Self, CapabilityError> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| CapabilityError::Request(format!("failed to build HTTP client: {err}")))?;
        let api_key = api_key.filter(|key| !key.trim().is_empty());
        Ok(Self {
            http,
            config,
            api_key,
        })
    }

    /// Client reading its key from the variable named by `api_key_env`.
    pub fn from_env(config: GeminiConfig) -> Result<Self, CapabilityError> {
        let api_key = std::env::var(&config.api_key_env).ok();
        if api_key.is_none() {
            warn!(
                "Gemini API key not set; remote capabilities disabled (env={})",
                config.api_key_env
            );
        }
        Self::new(config, api_key)
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// `{base}/models/{model}:{method}`.
    pub(crate) fn endpoint(&self, model: &str, method: &str) -> String {
        format!(
            "{}/models/{model}:{method}",
            self.config.base_url.trim_end_matches('/')
        )
    }

    pub(crate) async fn post<B, R>(&self, url: &str, body: &B) -> Result<R, CapabilityError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let Some(key) = self.api_key.as_deref() else {
            return Err(CapabilityError::Unavailable(format!(
                "{} is not set",
                self.config.api_key_env
            )));
        };
        debug!("Gemini request (url={url})");
        let response = self
            .http
            .post(url)
            .query(&[("key", key)])
            .json(body)
            .send()
            .await
            .map_err(|err| CapabilityError::Request(format!("request failed: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(CapabilityError::Request(format!(
                "Gemini API error ({status}): {text}"
            )));
        }
        response
            .json()
            .await
            .map_err(|err| CapabilityError::MalformedResponse(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn endpoint_joins_base_model_and_method() {
        let config = GeminiConfig {
            base_url: "https://example.test/v1beta/".to_string(),
            ..GeminiConfig::default()
        };
        let client = GeminiClient::new(config, Some("k".to_string())).expect("client");
        assert_eq!(
            client.endpoint("text-embedding-004", "embedContent"),
            "https://example.test/v1beta/models/text-embedding-004:embedContent"
        );
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let client = GeminiClient::new(GeminiConfig::default(), Some("  ".to_string()))
            .expect("client");
        assert!(!client.has_api_key());
    }

    #[tokio::test]
    async fn missing_key_is_unavailable() {
        let client = GeminiClient::new(GeminiConfig::default(), None).expect("client");
        let err = client
            .post::<_, serde_json::Value>("https://example.test", &serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, CapabilityError::Unavailable(_)));
    }
}
