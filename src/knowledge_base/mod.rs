//! Knowledge base build and retrieval over the book corpus.
//!
//! Building is a one-shot batch job: load the book, split it into
//! overlapping chunks, embed every chunk, persist the index. Re-running
//! overwrites the previous index; there is no merge or versioning.

use crate::config::Settings;
use crate::corpus;
use crate::embedding::Embedder;
use crate::error::{ReiseError, Result};
use crate::vector_store::{index_exists, Document, SqliteVectorStore, VectorStore};
use std::sync::Arc;
use tracing::{info, instrument};

/// Result of a knowledge base build.
#[derive(Debug)]
pub struct BuildResult {
    /// Number of chunks indexed.
    pub chunks_indexed: usize,
}

/// Build the knowledge base from the configured corpus.
///
/// Steps run sequentially with no partial-failure recovery; a missing
/// corpus file aborts before any embedding is computed.
#[instrument(skip_all)]
pub async fn build(settings: &Settings, embedder: Arc<dyn Embedder>) -> Result<BuildResult> {
    let corpus_path = settings.corpus_path();

    info!("Loading corpus from {:?}", corpus_path);
    let text = corpus::load_corpus(&corpus_path)?;

    info!("Splitting text into chunks");
    let chunks = corpus::split_into_chunks(
        &text,
        settings.corpus.chunk_size,
        settings.corpus.chunk_overlap,
    );

    info!("Generating embeddings for {} chunks", chunks.len());
    let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
    let embeddings = embedder.embed_batch(&texts).await?;

    if embeddings.len() != chunks.len() {
        return Err(ReiseError::Embedding(format!(
            "Expected {} embeddings, got {}",
            chunks.len(),
            embeddings.len()
        )));
    }

    let documents: Vec<Document> = chunks
        .into_iter()
        .zip(embeddings)
        .map(|(chunk, embedding)| Document::new(chunk.content, chunk.order, embedding))
        .collect();

    info!("Persisting index to {:?}", settings.index_dir());
    let store = SqliteVectorStore::create(&settings.index_dir())?;
    store.clear().await?;
    let indexed = store.upsert_batch(&documents).await?;

    info!("Indexed {} chunks", indexed);
    Ok(BuildResult {
        chunks_indexed: indexed,
    })
}

/// Top-k passage retrieval over the persisted index.
pub struct Retriever {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    top_k: usize,
}

impl std::fmt::Debug for Retriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Retriever")
            .field("top_k", &self.top_k)
            .finish_non_exhaustive()
    }
}

impl Retriever {
    /// Open the persisted index for retrieval.
    ///
    /// Fails with [`ReiseError::IndexNotFound`] if the index has never
    /// been built.
    pub fn open(settings: &Settings, embedder: Arc<dyn Embedder>) -> Result<Self> {
        let index_dir = settings.index_dir();
        if !index_exists(&index_dir) {
            return Err(ReiseError::IndexNotFound(index_dir));
        }

        let store = Arc::new(SqliteVectorStore::open(&index_dir)?);
        Ok(Self {
            store,
            embedder,
            top_k: settings.agent.top_k,
        })
    }

    /// Create a retriever over an explicit store (for tests).
    pub fn with_store(
        store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
        top_k: usize,
    ) -> Self {
        Self {
            store,
            embedder,
            top_k,
        }
    }

    /// Return the text of the top-k nearest chunks, nearest first,
    /// concatenated for the agent to read.
    #[instrument(skip(self))]
    pub async fn retrieve(&self, query: &str) -> Result<String> {
        let query_embedding = self.embedder.embed(query).await?;
        let results = self.store.search(&query_embedding, self.top_k).await?;

        if results.is_empty() {
            return Ok("No relevant passages found in the book.".to_string());
        }

        let passages = results
            .iter()
            .map(|r| r.document.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");

        Ok(passages)
    }
}
