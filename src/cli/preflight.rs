//! Pre-flight checks before expensive operations.
//!
//! Validates that required configuration is available before the index is
//! built, so a missing key fails fast instead of after embedding the catalog.

use crate::config::Settings;
use crate::error::{RagError, Result};
use crate::openai::api_key_from_env;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Serving and asking need the completion key.
    Answer,
    /// Search only needs the embeddings endpoint.
    Search,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Answer => check_api_key(&settings.completion.api_key_env),
        Operation::Search => Ok(()),
    }
}

fn check_api_key(var: &str) -> Result<()> {
    match api_key_from_env(var) {
        Some(_) => Ok(()),
        None => Err(RagError::Config(format!(
            "{} not set. Set it with: export {}='...'",
            var, var
        ))),
    }
}
