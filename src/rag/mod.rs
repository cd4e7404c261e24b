//! Retrieval-augmented question answering over the course index.
//!
//! [`Retriever`] finds the chunks closest to a question, [`AnswerGenerator`]
//! asks the chat model, and [`Assistant`] routes a request to either the
//! grounded flow or the direct one.

mod generator;
mod retriever;

pub use generator::AnswerGenerator;
pub use retriever::{Retriever, DEFAULT_TOP_K};

use crate::error::{RagError, Result};
use crate::index::SearchHit;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, instrument};

/// Source of context chunks for a question.
#[async_trait]
pub trait ContextSource: Send + Sync {
    /// Return the most relevant chunks, best first.
    async fn retrieve(&self, query: &str) -> Result<Vec<SearchHit>>;
}

/// How a question is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatMode {
    /// Retrieve context, then answer from it.
    Rag,
    /// Ask the model directly.
    Direct,
}

impl ChatMode {
    /// Map a request `type` field: `llm` (any case) is direct, anything else is RAG.
    pub fn from_request_type(kind: &str) -> Self {
        if kind.eq_ignore_ascii_case("llm") {
            ChatMode::Direct
        } else {
            ChatMode::Rag
        }
    }
}

/// An answer with the context it was grounded on.
#[derive(Debug, Clone)]
pub struct Answer {
    pub text: String,
    /// Empty in direct mode.
    pub sources: Vec<SearchHit>,
}

/// Join chunk texts with single spaces.
pub fn format_context(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|h| h.chunk.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Request-level entry point combining retrieval and generation.
#[derive(Clone)]
pub struct Assistant {
    context: Arc<dyn ContextSource>,
    generator: AnswerGenerator,
}

impl Assistant {
    pub fn new(context: Arc<dyn ContextSource>, generator: AnswerGenerator) -> Self {
        Self { context, generator }
    }

    /// Answer a question in the given mode.
    ///
    /// Blank queries are `InvalidInput`; retrieval failures surface as
    /// `Retrieval`, completion failures as `Generation`.
    #[instrument(skip(self))]
    pub async fn answer(&self, query: &str, mode: ChatMode) -> Result<Answer> {
        if query.trim().is_empty() {
            return Err(RagError::InvalidInput("query must not be empty".to_string()));
        }

        match mode {
            ChatMode::Direct => {
                let text = self.generator.generate_direct(query).await?;
                Ok(Answer {
                    text,
                    sources: Vec::new(),
                })
            }
            ChatMode::Rag => {
                let sources = self.context.retrieve(query).await?;
                info!("Answering with {} context chunks", sources.len());
                let text = self.generator.generate_with_context(query, &sources).await?;
                Ok(Answer { text, sources })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{hit, CountingContextSource, ScriptedChatModel};

    #[test]
    fn test_mode_from_request_type() {
        assert_eq!(ChatMode::from_request_type("llm"), ChatMode::Direct);
        assert_eq!(ChatMode::from_request_type("LLM"), ChatMode::Direct);
        assert_eq!(ChatMode::from_request_type("rag"), ChatMode::Rag);
        assert_eq!(ChatMode::from_request_type(""), ChatMode::Rag);
        assert_eq!(ChatMode::from_request_type("anything"), ChatMode::Rag);
    }

    #[test]
    fn test_format_context() {
        let hits = vec![hit(0, "one", 1.0), hit(1, "two", 0.5)];
        assert_eq!(format_context(&hits), "one two");
        assert_eq!(format_context(&[]), "");
    }

    #[tokio::test]
    async fn test_direct_mode_skips_retrieval() {
        let context = Arc::new(CountingContextSource::new(vec![hit(0, "ctx", 1.0)]));
        let assistant = Assistant::new(
            context.clone(),
            AnswerGenerator::new(Arc::new(ScriptedChatModel::replying("Hi"))),
        );

        let answer = assistant.answer("Hello", ChatMode::Direct).await.unwrap();
        assert_eq!(answer.text, "Hi");
        assert!(answer.sources.is_empty());
        assert_eq!(context.call_count(), 0);
    }

    #[tokio::test]
    async fn test_rag_mode_uses_retrieved_context() {
        let context = Arc::new(CountingContextSource::new(vec![hit(3, "Languages: Tamil.", 0.7)]));
        let model = Arc::new(ScriptedChatModel::replying("Tamil"));
        let assistant = Assistant::new(context.clone(), AnswerGenerator::new(model.clone()));

        let answer = assistant.answer("Languages?", ChatMode::Rag).await.unwrap();
        assert_eq!(answer.text, "Tamil");
        assert_eq!(answer.sources.len(), 1);
        assert_eq!(context.call_count(), 1);
        assert!(model.recorded()[0].user.contains("Languages: Tamil."));
    }

    #[tokio::test]
    async fn test_blank_query_is_rejected() {
        let context = Arc::new(CountingContextSource::new(Vec::new()));
        let assistant = Assistant::new(
            context.clone(),
            AnswerGenerator::new(Arc::new(ScriptedChatModel::replying("unused"))),
        );

        let err = assistant.answer("   ", ChatMode::Rag).await.unwrap_err();
        assert!(matches!(err, RagError::InvalidInput(_)));
        assert_eq!(context.call_count(), 0);
    }

    #[tokio::test]
    async fn test_retrieval_failure_stops_before_generation() {
        let model = Arc::new(ScriptedChatModel::replying("unused"));
        let assistant = Assistant::new(
            Arc::new(CountingContextSource::failing()),
            AnswerGenerator::new(model.clone()),
        );

        let err = assistant.answer("q", ChatMode::Rag).await.unwrap_err();
        assert!(matches!(err, RagError::Retrieval(_)));
        assert!(model.recorded().is_empty());
    }
}
