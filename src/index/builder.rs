//! Index construction from chunks.

use super::{IndexedChunk, VectorIndex};
use crate::chunking::Chunk;
use crate::config::SimilarityMetric;
use crate::embedding::Embedder;
use crate::error::{RagError, Result};
use std::sync::Arc;
use tracing::{info, instrument};

/// Embeds chunks and assembles a [`VectorIndex`].
pub struct IndexBuilder {
    embedder: Arc<dyn Embedder>,
    metric: SimilarityMetric,
}

impl IndexBuilder {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            metric: SimilarityMetric::Cosine,
        }
    }

    /// Set the similarity metric of the built index.
    pub fn with_metric(mut self, metric: SimilarityMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Embed every chunk and build the index.
    ///
    /// Any embedding failure or malformed vector fails the whole build.
    #[instrument(skip(self, chunks), fields(chunks = chunks.len(), model = self.embedder.model()))]
    pub async fn build(&self, chunks: Vec<Chunk>) -> Result<VectorIndex> {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();

        let embeddings = self
            .embedder
            .embed_batch(&texts)
            .await
            .map_err(|e| RagError::IndexBuild(e.to_string()))?;

        if embeddings.len() != chunks.len() {
            return Err(RagError::IndexBuild(format!(
                "embedding service returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let dimensions = self.embedder.dimensions();
        let mut entries = Vec::with_capacity(chunks.len());

        for (chunk, embedding) in chunks.into_iter().zip(embeddings) {
            if embedding.iter().any(|v| !v.is_finite()) {
                return Err(RagError::IndexBuild(format!(
                    "non-finite embedding for chunk {}/{}",
                    chunk.record_index, chunk.index
                )));
            }
            entries.push(IndexedChunk { chunk, embedding });
        }

        let index = VectorIndex::new(entries, dimensions, self.metric)?;
        info!(
            "Built {} index with {} chunks ({} dimensions)",
            self.metric,
            index.len(),
            dimensions
        );
        Ok(index)
    }
}
