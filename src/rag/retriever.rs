//! Query-time retrieval against the shared index.

use super::ContextSource;
use crate::embedding::Embedder;
use crate::error::{RagError, Result};
use crate::index::{SearchHit, VectorIndex};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Default number of chunks returned per query.
pub const DEFAULT_TOP_K: usize = 4;

/// Embeds queries and looks them up in the index.
///
/// Holds the index read-only; cloning is cheap and clones share the index.
#[derive(Clone)]
pub struct Retriever {
    index: Arc<VectorIndex>,
    embedder: Arc<dyn Embedder>,
    top_k: usize,
}

impl Retriever {
    /// Create a retriever. `embedder` must be the one the index was built with.
    pub fn new(index: Arc<VectorIndex>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            index,
            embedder,
            top_k: DEFAULT_TOP_K,
        }
    }

    /// Set the number of chunks returned per query.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }
}

#[async_trait]
impl ContextSource for Retriever {
    #[instrument(skip(self), fields(k = self.top_k))]
    async fn retrieve(&self, query: &str) -> Result<Vec<SearchHit>> {
        let query_embedding = self
            .embedder
            .embed(query)
            .await
            .map_err(|e| RagError::Retrieval(e.to_string()))?;

        let hits = self.index.search(&query_embedding, self.top_k)?;
        debug!("Retrieved {} chunks", hits.len());
        Ok(hits)
    }
}
