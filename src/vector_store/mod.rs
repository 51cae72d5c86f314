//! Vector store abstraction for Reise.
//!
//! Provides a trait-based interface over the persisted similarity index.
//! The index is built once from the full chunk set and read-only after
//! that; rebuilding overwrites the previous copy.

mod memory;
mod sqlite;

pub use memory::MemoryVectorStore;
pub use sqlite::{SqliteVectorStore, INDEX_FILE_NAME};

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

/// A document stored in the vector database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique document ID.
    pub id: Uuid,
    /// Text content of this chunk.
    pub content: String,
    /// Order of this chunk in the corpus.
    pub chunk_order: i32,
    /// Embedding vector.
    pub embedding: Vec<f32>,
    /// When this document was indexed.
    pub indexed_at: DateTime<Utc>,
}

impl Document {
    /// Create a new document.
    pub fn new(content: String, chunk_order: i32, embedding: Vec<f32>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content,
            chunk_order,
            embedding,
            indexed_at: Utc::now(),
        }
    }
}

/// A search result with score.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The matched document.
    pub document: Document,
    /// Similarity score (higher is better).
    pub score: f32,
}

/// Trait for vector store implementations.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Bulk upsert documents.
    async fn upsert_batch(&self, docs: &[Document]) -> Result<usize>;

    /// Search for the most similar documents, nearest first.
    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>>;

    /// Remove all documents.
    async fn clear(&self) -> Result<usize>;

    /// Get total document count.
    async fn document_count(&self) -> Result<usize>;
}

/// Check whether a persisted index is present.
///
/// True only when both the index directory and its index file exist.
pub fn index_exists(index_dir: &Path) -> bool {
    index_dir.exists() && index_dir.join(INDEX_FILE_NAME).exists()
}

/// Compute cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&a, &c)).abs() < 0.001);

        let d = vec![-1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &d) + 1.0).abs() < 0.001);
    }

    #[test]
    fn test_index_exists_permutations() {
        let tmp = tempfile::tempdir().unwrap();

        // Directory missing entirely.
        assert!(!index_exists(&tmp.path().join("absent")));

        // Directory present, index file missing.
        let dir = tmp.path().join("index");
        std::fs::create_dir_all(&dir).unwrap();
        assert!(!index_exists(&dir));

        // Both present.
        std::fs::write(dir.join(INDEX_FILE_NAME), b"").unwrap();
        assert!(index_exists(&dir));
    }
}
