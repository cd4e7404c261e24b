//! In-memory vector index over course chunks.
//!
//! The index is built once at startup and never mutated afterwards, so it can
//! be shared behind an `Arc` and searched concurrently without locking.

mod builder;

pub use builder::IndexBuilder;

use crate::chunking::Chunk;
use crate::config::SimilarityMetric;
use crate::error::{RagError, Result};
use serde::Serialize;

/// A chunk with its embedding.
#[derive(Debug, Clone)]
pub struct IndexedChunk {
    pub chunk: Chunk,
    pub embedding: Vec<f32>,
}

/// A search result with score.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    /// The matched chunk.
    pub chunk: Chunk,
    /// Similarity score (higher is better).
    pub score: f32,
}

/// Exact nearest-neighbour index.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    entries: Vec<IndexedChunk>,
    dimensions: usize,
    metric: SimilarityMetric,
}

impl VectorIndex {
    /// Create an index from pre-computed entries. Every embedding must have `dimensions` components.
    pub fn new(
        entries: Vec<IndexedChunk>,
        dimensions: usize,
        metric: SimilarityMetric,
    ) -> Result<Self> {
        if let Some(bad) = entries.iter().find(|e| e.embedding.len() != dimensions) {
            return Err(RagError::IndexBuild(format!(
                "chunk {}/{} has {} dimensions, expected {}",
                bad.chunk.record_index,
                bad.chunk.index,
                bad.embedding.len(),
                dimensions
            )));
        }

        Ok(Self {
            entries,
            dimensions,
            metric,
        })
    }

    /// Return the `limit` chunks most similar to the query, best first.
    ///
    /// Equal scores keep insertion order.
    pub fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchHit>> {
        if query_embedding.len() != self.dimensions {
            return Err(RagError::Retrieval(format!(
                "query embedding has {} dimensions, index expects {}",
                query_embedding.len(),
                self.dimensions
            )));
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, self.score(query_embedding, &entry.embedding)))
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(limit);

        Ok(scored
            .into_iter()
            .map(|(i, score)| SearchHit {
                chunk: self.entries[i].chunk.clone(),
                score,
            })
            .collect())
    }

    fn score(&self, a: &[f32], b: &[f32]) -> f32 {
        match self.metric {
            SimilarityMetric::Cosine => cosine_similarity(a, b),
            SimilarityMetric::L2 => -l2_distance(a, b),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn metric(&self) -> SimilarityMetric {
        self.metric
    }
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Euclidean distance between two vectors.
pub fn l2_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f32>()
        .sqrt()
}
