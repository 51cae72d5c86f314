//! Reise - Travel Q&A with live weather and a book
//!
//! A CLI assistant that answers travel questions from two sources: a live
//! weather API and the text of Mark Twain's "The Innocents Abroad".
//!
//! The name "Reise" comes from the Norwegian word for "journey."
//!
//! # Overview
//!
//! Reise allows you to:
//! - Build a searchable vector index from the book text
//! - Ask weather questions answered by a live weather service
//! - Ask about Twain's journey, opinions, and the places he described
//! - Combine both: find places in the book, then fetch their weather
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - `config` - Settings and credential management
//! - `corpus` - Corpus loading and overlapping chunking
//! - `embedding` - Embedding generation
//! - `vector_store` - Vector database abstraction
//! - `knowledge_base` - Index build and retrieval over the book
//! - `weather` - Live weather lookup tool
//! - `agent` - Tool-calling agent loop
//!
//! # Example
//!
//! ```rust,no_run
//! use reise::config::{Credentials, Settings};
//! use reise::embedding::OpenAIEmbedder;
//! use reise::knowledge_base;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let credentials = Credentials::from_env()?;
//!
//!     let embedder = Arc::new(OpenAIEmbedder::new(
//!         &credentials,
//!         &settings.embedding.model,
//!         settings.embedding.dimensions as usize,
//!     ));
//!
//!     let result = knowledge_base::build(&settings, embedder).await?;
//!     println!("Indexed {} chunks", result.chunks_indexed);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod embedding;
pub mod error;
pub mod knowledge_base;
pub mod openai;
pub mod vector_store;
pub mod weather;

pub use error::{ReiseError, Result};
