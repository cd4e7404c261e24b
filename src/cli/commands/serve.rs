//! Serve command: build the index, then run the HTTP API.

use crate::api::{router, AppState};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::orchestrator::Orchestrator;
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

/// Run the HTTP API server.
pub async fn run_serve(host: Option<String>, port: Option<u16>, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Answer, &settings) {
        Output::error(&e.to_string());
        return Err(e.into());
    }

    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);

    let orchestrator = Orchestrator::new(settings.clone())?;

    // The index is complete before the listener is bound.
    let spinner = Output::spinner("Initializing RAG pipeline...");
    let services = match orchestrator.start().await {
        Ok(services) => {
            spinner.finish_and_clear();
            services
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Startup failed: {}", e));
            return Err(e.into());
        }
    };
    let indexed_chunks = services.retriever.index().len();
    info!("RAG pipeline initialized with {} chunks", indexed_chunks);

    let state = Arc::new(AppState::new(services.assistant, indexed_chunks, &settings.server));
    let app = router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Course Assistant API");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    Output::kv("Indexed chunks", &indexed_chunks.to_string());
    Output::kv("Completion model", &settings.completion.model);
    Output::kv("Embedding model", &settings.embedding.model);
    println!();
    println!("Endpoints:");
    Output::kv("Welcome", "GET  /");
    Output::kv("Health", "GET  /health");
    Output::kv("Chat", "POST /chat");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}
