//! Search command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::orchestrator::Orchestrator;
use crate::rag::ContextSource;
use anyhow::Result;
use std::sync::Arc;

/// Run the search command.
pub async fn run_search(query: &str, k: Option<usize>, settings: Settings) -> Result<()> {
    let embedder: Arc<dyn Embedder> = Arc::new(OpenAIEmbedder::from_settings(&settings.embedding)?);
    let top_k = k.unwrap_or(settings.retrieval.top_k);
    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Building course index...");
    let retriever = orchestrator.build_retriever(embedder).await;
    spinner.finish_and_clear();
    let retriever = retriever?.with_top_k(top_k);

    match retriever.retrieve(query).await {
        Ok(hits) if hits.is_empty() => {
            Output::warning("No results found matching your query.");
        }
        Ok(hits) => {
            Output::success(&format!("Found {} results", hits.len()));
            for (rank, hit) in hits.iter().enumerate() {
                Output::search_result(rank + 1, hit.chunk.record_index, hit.score, &hit.chunk.text);
            }
        }
        Err(e) => {
            Output::error(&format!("Search failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
