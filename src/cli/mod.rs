//! CLI module.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Course catalog assistant
///
/// Answers questions about a course catalog by retrieving relevant course
/// descriptions and passing them to a hosted language model.
#[derive(Parser, Debug)]
#[command(name = "course-rag")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "COURSE_RAG_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the index and start the HTTP API
    Serve {
        /// Host to bind to (defaults to server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Ask a single question
    Ask {
        /// The question to ask
        query: String,

        /// Skip retrieval and ask the model directly
        #[arg(short, long)]
        direct: bool,
    },

    /// Show the course chunks closest to a query
    Search {
        /// Search query
        query: String,

        /// Number of chunks to show (defaults to retrieval.top_k)
        #[arg(short, long)]
        k: Option<usize>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}
