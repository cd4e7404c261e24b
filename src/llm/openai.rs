//! Chat completions over an OpenAI-compatible API (Groq by default).

use super::ChatModel;
use crate::config::CompletionSettings;
use crate::error::{RagError, Result};
use crate::openai::{api_key_from_env, create_client, Endpoint};
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// Chat model backed by an OpenAI-compatible `/chat/completions` endpoint.
pub struct OpenAIChatModel {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
}

impl OpenAIChatModel {
    pub fn with_config(endpoint: &Endpoint, model: &str) -> Result<Self> {
        Ok(Self {
            client: create_client(endpoint)?,
            model: model.to_string(),
        })
    }

    /// Create the model from settings. The API key variable must be set.
    pub fn from_settings(settings: &CompletionSettings) -> Result<Self> {
        let api_key = api_key_from_env(&settings.api_key_env).ok_or_else(|| {
            RagError::Config(format!(
                "{} not found in environment variables",
                settings.api_key_env
            ))
        })?;

        let endpoint = Endpoint::new(settings.api_base.clone(), api_key)
            .with_timeout(Duration::from_secs(settings.timeout_secs));
        Self::with_config(&endpoint, &settings.model)
    }
}

#[async_trait]
impl ChatModel for OpenAIChatModel {
    #[instrument(skip(self, system, user), fields(model = %self.model))]
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system.to_string())
                .build()
                .map_err(|e| RagError::Generation(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user.to_string())
                .build()
                .map_err(|e| RagError::Generation(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .build()
            .map_err(|e| RagError::Generation(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| RagError::Generation(e.to_string()))?;

        let answer = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| RagError::Generation("Empty response from completion service".to_string()))?;

        debug!("Received {} characters from {}", answer.len(), self.model);
        Ok(answer)
    }

    fn model(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn completion_body(content: serde_json::Value) -> serde_json::Value {
        json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 1700000000,
            "model": "openai/gpt-oss-20b",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop",
                "logprobs": null
            }],
            "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
        })
    }

    fn model_for(server: &MockServer) -> OpenAIChatModel {
        let endpoint = Endpoint::new(format!("{}/openai/v1", server.uri()), "gsk-test");
        OpenAIChatModel::with_config(&endpoint, "openai/gpt-oss-20b").unwrap()
    }

    #[tokio::test]
    async fn test_complete_sends_system_and_user_messages() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/openai/v1/chat/completions"))
            .and(header("authorization", "Bearer gsk-test"))
            .and(body_partial_json(json!({
                "model": "openai/gpt-oss-20b",
                "messages": [
                    { "role": "system", "content": "Be helpful." },
                    { "role": "user", "content": "Question: Hello" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(json!("Hi there!"))))
            .expect(1)
            .mount(&server)
            .await;

        let answer = model_for(&server)
            .complete("Be helpful.", "Question: Hello")
            .await
            .unwrap();
        assert_eq!(answer, "Hi there!");
    }

    #[tokio::test]
    async fn test_missing_content_is_generation_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/openai/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(json!(null))))
            .mount(&server)
            .await;

        let err = model_for(&server).complete("s", "u").await.unwrap_err();
        assert!(matches!(err, RagError::Generation(_)));
    }

    #[tokio::test]
    async fn test_api_error_is_generation_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/openai/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {
                    "message": "Invalid API Key",
                    "type": "invalid_request_error",
                    "param": null,
                    "code": "invalid_api_key"
                }
            })))
            .mount(&server)
            .await;

        let err = model_for(&server).complete("s", "u").await.unwrap_err();
        match err {
            RagError::Generation(msg) => assert!(msg.contains("Invalid API Key")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_rate_limit_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/openai/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {
                    "message": "Rate limit reached for model",
                    "type": "tokens",
                    "param": null,
                    "code": "rate_limit_exceeded"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            model_for(&server).complete("s", "u"),
        )
        .await
        .expect("rate-limited request should fail without waiting");

        assert!(matches!(result, Err(RagError::Generation(_))));
        assert_eq!(server.received_requests().await.unwrap().len(), 1);
    }

    #[test]
    fn test_missing_api_key_is_config_error() {
        let settings = CompletionSettings {
            api_key_env: "COURSE_RAG_TEST_UNSET_COMPLETION_KEY".to_string(),
            ..CompletionSettings::default()
        };
        let result = OpenAIChatModel::from_settings(&settings);
        assert!(matches!(result, Err(RagError::Config(_))));
    }
}
