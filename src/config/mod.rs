//! Configuration module.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{DirectPrompts, Prompts, RagPrompts};
pub use settings::{
    ChunkingSettings, CompletionSettings, DataSettings, EmbeddingSettings,
    GenerationFailurePolicy, PromptSettings, RetrievalSettings, ServerSettings, Settings,
    SimilarityMetric,
};
