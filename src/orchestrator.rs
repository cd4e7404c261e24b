//! Startup pipeline.
//!
//! Loads the catalog, normalizes and chunks it, builds the vector index and
//! wires the request-time services. Everything here runs once, to completion,
//! before any request is served.

use crate::catalog::{load_courses, load_languages, normalize, EnrichedRecord};
use crate::chunking::TextChunker;
use crate::config::{Prompts, Settings};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::{RagError, Result};
use crate::index::{IndexBuilder, VectorIndex};
use crate::llm::{ChatModel, OpenAIChatModel};
use crate::rag::{AnswerGenerator, Assistant, Retriever};
use std::sync::Arc;
use tracing::{info, instrument};

/// Services available once startup has finished.
#[derive(Clone)]
pub struct Services {
    pub assistant: Assistant,
    pub retriever: Retriever,
}

/// Coordinates startup from settings to ready-to-serve services.
pub struct Orchestrator {
    settings: Settings,
    prompts: Prompts,
}

impl Orchestrator {
    /// Create an orchestrator, loading prompt templates from settings.
    pub fn new(settings: Settings) -> Result<Self> {
        settings.validate()?;
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        Ok(Self { settings, prompts })
    }

    /// Create an orchestrator with explicit prompts.
    pub fn with_prompts(settings: Settings, prompts: Prompts) -> Result<Self> {
        settings.validate()?;
        Ok(Self { settings, prompts })
    }

    /// Get the settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Start against the configured hosted services.
    ///
    /// The completion API key is checked before any data is loaded.
    pub async fn start(&self) -> Result<Services> {
        let chat_model: Arc<dyn ChatModel> =
            Arc::new(OpenAIChatModel::from_settings(&self.settings.completion)?);
        let embedder: Arc<dyn Embedder> =
            Arc::new(OpenAIEmbedder::from_settings(&self.settings.embedding)?);

        self.start_with(embedder, chat_model).await
    }

    /// Start with caller-provided services.
    pub async fn start_with(
        &self,
        embedder: Arc<dyn Embedder>,
        chat_model: Arc<dyn ChatModel>,
    ) -> Result<Services> {
        let retriever = self.build_retriever(embedder).await?;
        let generator = AnswerGenerator::new(chat_model).with_prompts(self.prompts.clone());
        let assistant = Assistant::new(Arc::new(retriever.clone()), generator);

        Ok(Services {
            assistant,
            retriever,
        })
    }

    /// Build the index and a retriever over it, without a chat model.
    pub async fn build_retriever(&self, embedder: Arc<dyn Embedder>) -> Result<Retriever> {
        let index = self.build_index(embedder.clone()).await?;
        Ok(Retriever::new(Arc::new(index), embedder).with_top_k(self.settings.retrieval.top_k))
    }

    /// Load, normalize, chunk and embed the catalog.
    #[instrument(skip(self, embedder))]
    pub async fn build_index(&self, embedder: Arc<dyn Embedder>) -> Result<VectorIndex> {
        let records = self.load_records()?;

        let chunker = TextChunker::from_settings(&self.settings.chunking)?;
        let chunks = chunker.chunk(&records);
        info!(
            "Split {} course records into {} chunks (size {}, overlap {})",
            records.len(),
            chunks.len(),
            chunker.chunk_size(),
            chunker.overlap()
        );

        if chunks.is_empty() {
            return Err(RagError::DataLoad("course catalog contains no courses".to_string()));
        }

        IndexBuilder::new(embedder)
            .with_metric(self.settings.retrieval.metric)
            .build(chunks)
            .await
    }

    /// Load both catalog files and produce enriched records.
    pub fn load_records(&self) -> Result<Vec<EnrichedRecord>> {
        let courses = load_courses(&self.settings.courses_path())?;
        let languages = load_languages(&self.settings.languages_path())?;
        Ok(normalize(&courses, &languages))
    }
}
