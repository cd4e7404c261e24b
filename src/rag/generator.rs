//! Answer generation with or without retrieved context.

use super::format_context;
use crate::config::Prompts;
use crate::error::{RagError, Result};
use crate::index::SearchHit;
use crate::llm::ChatModel;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument};

/// Builds prompts and calls the chat model.
#[derive(Clone)]
pub struct AnswerGenerator {
    model: Arc<dyn ChatModel>,
    prompts: Prompts,
}

impl AnswerGenerator {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            model,
            prompts: Prompts::default(),
        }
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    /// Answer from the retrieved chunks only.
    #[instrument(skip(self, hits), fields(chunks = hits.len()))]
    pub async fn generate_with_context(&self, query: &str, hits: &[SearchHit]) -> Result<String> {
        let mut vars = HashMap::new();
        vars.insert("context".to_string(), format_context(hits));
        vars.insert("question".to_string(), query.to_string());

        let user = self.prompts.render_with_custom(&self.prompts.rag.user, &vars);
        let system = self.prompts.render_with_custom(&self.prompts.rag.system, &HashMap::new());

        info!("Generating grounded answer with {}", self.model.model());
        self.complete(&system, &user).await
    }

    /// Answer without retrieval.
    #[instrument(skip(self))]
    pub async fn generate_direct(&self, query: &str) -> Result<String> {
        let mut vars = HashMap::new();
        vars.insert("question".to_string(), query.to_string());

        let user = self.prompts.render_with_custom(&self.prompts.direct.user, &vars);
        let system = self.prompts.render_with_custom(&self.prompts.direct.system, &HashMap::new());

        info!("Generating direct answer with {}", self.model.model());
        self.complete(&system, &user).await
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        self.model.complete(system, user).await.map_err(|e| match e {
            RagError::Generation(msg) => RagError::Generation(msg),
            other => RagError::Generation(other.to_string()),
        })
    }
}
