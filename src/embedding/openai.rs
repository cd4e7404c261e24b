//! Embeddings over an OpenAI-compatible API.

use super::Embedder;
use crate::config::EmbeddingSettings;
use crate::error::{RagError, Result};
use crate::openai::{api_key_from_env, create_client, Endpoint};
use async_openai::types::{CreateEmbeddingRequestArgs, EmbeddingInput};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// Embedder backed by an OpenAI-compatible `/embeddings` endpoint.
pub struct OpenAIEmbedder {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    dimensions: usize,
    batch_size: usize,
}

impl OpenAIEmbedder {
    /// Create an embedder for a specific endpoint, model and dimensions.
    pub fn with_config(endpoint: &Endpoint, model: &str, dimensions: usize) -> Result<Self> {
        Ok(Self {
            client: create_client(endpoint)?,
            model: model.to_string(),
            dimensions,
            batch_size: 100,
        })
    }

    /// Create an embedder from settings, reading the key from the configured variable.
    pub fn from_settings(settings: &EmbeddingSettings) -> Result<Self> {
        let api_key = api_key_from_env(&settings.api_key_env).unwrap_or_default();
        let endpoint = Endpoint::new(settings.api_base.clone(), api_key);
        Ok(Self::with_config(&endpoint, &settings.model, settings.dimensions as usize)?
            .with_batch_size(settings.batch_size))
    }

    /// Set the maximum number of texts per request.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    #[instrument(skip(self, text))]
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let embeddings = self.embed_batch(&[text.to_string()]).await?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| RagError::Embedding("Empty embedding response".to_string()))
    }

    #[instrument(skip(self, texts), fields(count = texts.len()))]
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!("Generating embeddings for {} texts", texts.len());

        let mut all_embeddings = Vec::with_capacity(texts.len());

        for batch in texts.chunks(self.batch_size) {
            let request = CreateEmbeddingRequestArgs::default()
                .model(&self.model)
                .input(EmbeddingInput::StringArray(batch.to_vec()))
                .dimensions(self.dimensions as u32)
                .build()
                .map_err(|e| RagError::Embedding(format!("Failed to build request: {}", e)))?;

            let response = self
                .client
                .embeddings()
                .create(request)
                .await
                .map_err(|e| RagError::Embedding(format!("Embedding API error: {}", e)))?;

            if response.data.len() != batch.len() {
                return Err(RagError::Embedding(format!(
                    "Expected {} embeddings, received {}",
                    batch.len(),
                    response.data.len()
                )));
            }

            // Sort by index to ensure correct order
            let mut embeddings: Vec<_> = response.data.into_iter().collect();
            embeddings.sort_by_key(|e| e.index);

            all_embeddings.extend(embeddings.into_iter().map(|e| e.embedding));
        }

        debug!("Generated {} embeddings", all_embeddings.len());
        Ok(all_embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn embedding_body(vectors: &[Vec<f32>]) -> serde_json::Value {
        let data: Vec<_> = vectors
            .iter()
            .enumerate()
            .rev()
            .map(|(i, v)| json!({ "object": "embedding", "index": i, "embedding": v }))
            .collect();
        json!({
            "object": "list",
            "model": "test-embed",
            "data": data,
            "usage": { "prompt_tokens": 4, "total_tokens": 4 }
        })
    }

    async fn embedder_for(server: &MockServer) -> OpenAIEmbedder {
        let endpoint = Endpoint::new(format!("{}/v1", server.uri()), "test-key");
        OpenAIEmbedder::with_config(&endpoint, "test-embed", 3).unwrap()
    }

    #[test]
    fn test_embedder_creation() {
        let settings = EmbeddingSettings::default();
        let embedder = OpenAIEmbedder::from_settings(&settings).unwrap();
        assert_eq!(embedder.dimensions(), 1536);
        assert_eq!(embedder.model(), "text-embedding-3-small");
    }

    #[tokio::test]
    async fn test_embed_batch_restores_input_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(embedding_body(&[
                vec![1.0, 0.0, 0.0],
                vec![0.0, 1.0, 0.0],
            ])))
            .mount(&server)
            .await;

        let embedder = embedder_for(&server).await;
        let vectors = embedder
            .embed_batch(&["first".to_string(), "second".to_string()])
            .await
            .unwrap();

        assert_eq!(vectors, vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]]);
    }

    #[tokio::test]
    async fn test_api_error_is_embedding_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {
                    "message": "Invalid API key",
                    "type": "invalid_request_error",
                    "param": null,
                    "code": "invalid_api_key"
                }
            })))
            .mount(&server)
            .await;

        let embedder = embedder_for(&server).await;
        let err = embedder.embed("query").await.unwrap_err();
        assert!(matches!(err, RagError::Embedding(_)));
    }

    #[tokio::test]
    async fn test_rate_limit_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {
                    "message": "Rate limit reached",
                    "type": "requests",
                    "param": null,
                    "code": "rate_limit_exceeded"
                }
            })))
            .mount(&server)
            .await;

        let embedder = embedder_for(&server).await;
        let result = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            embedder.embed("query"),
        )
        .await
        .expect("rate-limited request should fail without waiting");

        assert!(matches!(result, Err(RagError::Embedding(_))));
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_short_response_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/embeddings"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(embedding_body(&[vec![1.0, 0.0, 0.0]])),
            )
            .mount(&server)
            .await;

        let embedder = embedder_for(&server).await;
        let result = embedder
            .embed_batch(&["a".to_string(), "b".to_string()])
            .await;
        assert!(matches!(result, Err(RagError::Embedding(_))));
    }
}
