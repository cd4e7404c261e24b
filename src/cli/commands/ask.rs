//! Ask command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use crate::rag::ChatMode;
use anyhow::Result;

/// Run the ask command.
pub async fn run_ask(query: &str, direct: bool, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Answer, &settings) {
        Output::error(&e.to_string());
        return Err(e.into());
    }

    let orchestrator = Orchestrator::new(settings)?;

    let spinner = Output::spinner("Building course index...");
    let services = orchestrator.start().await;
    spinner.finish_and_clear();
    let services = services?;

    let mode = if direct { ChatMode::Direct } else { ChatMode::Rag };
    let spinner = Output::spinner("Thinking...");
    let result = services.assistant.answer(query, mode).await;
    spinner.finish_and_clear();

    match result {
        Ok(answer) => {
            println!("\n{}\n", answer.text);

            if !answer.sources.is_empty() {
                Output::header("Context");
                for (rank, source) in answer.sources.iter().enumerate() {
                    Output::search_result(
                        rank + 1,
                        source.chunk.record_index,
                        source.score,
                        &source.chunk.text,
                    );
                }
            }
        }
        Err(e) => {
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
