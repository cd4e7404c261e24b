//! Course catalog assistant.
//!
//! Answers natural-language questions about a fixed course catalog with
//! retrieval-augmented generation: course rows are turned into text,
//! chunked, embedded into an in-memory index at startup, and the chunks
//! closest to each question are handed to a hosted chat model as context.
//! A direct mode skips retrieval and asks the model on its own.
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `catalog` - CSV loading and record normalization
//! - `chunking` - Overlapping fixed-size text chunks
//! - `embedding` - Embedding generation
//! - `index` - Immutable vector index and its builder
//! - `llm` - Chat-completion models
//! - `rag` - Retrieval, answer generation and request routing
//! - `orchestrator` - Startup pipeline
//! - `api` - HTTP endpoints
//!
//! # Example
//!
//! ```rust,no_run
//! use course_rag::config::Settings;
//! use course_rag::orchestrator::Orchestrator;
//! use course_rag::rag::ChatMode;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let services = Orchestrator::new(settings)?.start().await?;
//!
//!     let answer = services
//!         .assistant
//!         .answer("Which courses are available in Kannada?", ChatMode::Rag)
//!         .await?;
//!     println!("{}", answer.text);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod catalog;
pub mod chunking;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod index;
pub mod llm;
pub mod openai;
pub mod orchestrator;
pub mod rag;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{RagError, Result};
