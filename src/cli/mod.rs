//! CLI module for Reise.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Reise - Travel Q&A with live weather and a book
///
/// Answers travel questions from a live weather API and the text of
/// Mark Twain's "The Innocents Abroad."
/// The name "Reise" comes from the Norwegian word for "journey."
#[derive(Parser, Debug)]
#[command(name = "reise")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask the travel assistant a question
    Ask {
        /// The question to ask
        question: String,
    },

    /// Build the knowledge base index from the book text
    Build,

    /// Search the book directly without the agent
    Search {
        /// Search query
        query: String,

        /// Maximum number of passages
        #[arg(short, long, default_value = "3")]
        limit: usize,
    },

    /// Check API keys, corpus file, and index state
    Doctor,

    /// Start the HTTP front end
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
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
