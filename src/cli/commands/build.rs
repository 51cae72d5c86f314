//! Build command implementation.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Credentials, Settings};
use crate::embedding::OpenAIEmbedder;
use crate::knowledge_base;
use anyhow::Result;
use std::sync::Arc;

/// Run the build command.
pub async fn run_build(settings: Settings) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Build, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'reise doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let credentials = Credentials::from_env()?;

    let embedder = Arc::new(OpenAIEmbedder::new(
        &credentials,
        &settings.embedding.model,
        settings.embedding.dimensions as usize,
    ));

    Output::info(&format!("Corpus: {:?}", settings.corpus_path()));
    Output::info(&format!("Index: {:?}", settings.index_dir()));

    let spinner = Output::spinner("Building knowledge base...");

    match knowledge_base::build(&settings, embedder).await {
        Ok(result) => {
            spinner.finish_and_clear();
            Output::success(&format!("Indexed {} chunks.", result.chunks_indexed));
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Build failed: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
