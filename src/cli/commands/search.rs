//! Search command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Credentials, Settings};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::vector_store::{SqliteVectorStore, VectorStore};
use anyhow::Result;

/// Run the search command: direct retrieval, no agent in between.
pub async fn run_search(query: &str, limit: usize, settings: Settings) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Search, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'reise doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let credentials = Credentials::from_env()?;

    let embedder = OpenAIEmbedder::new(
        &credentials,
        &settings.embedding.model,
        settings.embedding.dimensions as usize,
    );

    let store = SqliteVectorStore::open(&settings.index_dir())?;

    let spinner = Output::spinner("Searching...");
    let query_embedding = embedder.embed(query).await?;
    let results = store.search(&query_embedding, limit).await?;
    spinner.finish_and_clear();

    if results.is_empty() {
        Output::warning("No passages found.");
        return Ok(());
    }

    Output::header(&format!("Passages for '{}'", query));
    for (i, result) in results.iter().enumerate() {
        Output::passage(i + 1, result.score, &result.document.content);
    }
    println!();

    Ok(())
}
