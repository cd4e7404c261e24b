//! Deterministic test doubles for the external services.

use crate::embedding::Embedder;
use crate::error::{RagError, Result};
use crate::index::SearchHit;
use crate::llm::ChatModel;
use crate::rag::ContextSource;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Bag-of-words embedder: each lowercase word bumps one hashed dimension.
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn vectorize(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0; self.dimensions];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let word = word.to_lowercase();
            // FNV-1a
            let hash = word.bytes().fold(0xcbf29ce484222325u64, |h, b| {
                (h ^ u64::from(b)).wrapping_mul(0x100000001b3)
            });
            vector[(hash % self.dimensions as u64) as usize] += 1.0;
        }
        vector
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.vectorize(text))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.vectorize(t)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model(&self) -> &str {
        "hashing-test"
    }
}

/// Embedder that always fails, as an unreachable service would.
pub struct UnreachableEmbedder;

#[async_trait]
impl Embedder for UnreachableEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        Err(RagError::Embedding("connection refused".to_string()))
    }

    async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(RagError::Embedding("connection refused".to_string()))
    }

    fn dimensions(&self) -> usize {
        8
    }

    fn model(&self) -> &str {
        "unreachable"
    }
}

/// Embedder returning a fixed set of vectors regardless of input.
pub struct FixedEmbedder {
    pub vectors: Vec<Vec<f32>>,
    pub dimensions: usize,
}

#[async_trait]
impl Embedder for FixedEmbedder {
    async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
        self.vectors
            .first()
            .cloned()
            .ok_or_else(|| RagError::Embedding("no vectors".to_string()))
    }

    async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(self.vectors.clone())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model(&self) -> &str {
        "fixed"
    }
}

/// One recorded chat-completion call.
#[derive(Debug, Clone)]
pub struct ChatCall {
    pub system: String,
    pub user: String,
}

/// Chat model that records its prompts and answers with a canned reply.
pub struct ScriptedChatModel {
    reply: std::result::Result<String, String>,
    pub calls: Mutex<Vec<ChatCall>>,
}

impl ScriptedChatModel {
    pub fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn recorded(&self) -> Vec<ChatCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for ScriptedChatModel {
    async fn complete(&self, system: &str, user: &str) -> Result<String> {
        self.calls.lock().unwrap().push(ChatCall {
            system: system.to_string(),
            user: user.to_string(),
        });
        self.reply.clone().map_err(RagError::Generation)
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

/// Context source that counts lookups and returns fixed hits.
pub struct CountingContextSource {
    hits: Vec<SearchHit>,
    fail: bool,
    pub calls: AtomicUsize,
}

impl CountingContextSource {
    pub fn new(hits: Vec<SearchHit>) -> Self {
        Self {
            hits,
            fail: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            hits: Vec::new(),
            fail: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContextSource for CountingContextSource {
    async fn retrieve(&self, _query: &str) -> Result<Vec<SearchHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(RagError::Retrieval("embedding service unreachable".to_string()));
        }
        Ok(self.hits.clone())
    }
}

/// Build a hit for a chunk of text.
pub fn hit(record_index: usize, text: &str, score: f32) -> SearchHit {
    SearchHit {
        chunk: crate::chunking::Chunk {
            record_index,
            index: 0,
            start: 0,
            text: text.to_string(),
        },
        score,
    }
}
