//! SQLite-based vector store implementation.
//!
//! Uses SQLite with cosine similarity computed in Rust for simplicity.
//! For large corpora, consider the sqlite-vec extension or a dedicated
//! vector database.

use super::{cosine_similarity, Document, SearchResult, VectorStore};
use crate::error::{ReiseError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;
use tracing::{info, instrument};

/// File name of the persisted index inside the index directory.
pub const INDEX_FILE_NAME: &str = "index.db";

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS documents (
        id TEXT PRIMARY KEY,
        content TEXT NOT NULL,
        chunk_order INTEGER NOT NULL,
        embedding BLOB NOT NULL,
        indexed_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_documents_chunk_order ON documents(chunk_order);
"#;

/// SQLite-based vector store, persisted as `index.db` in the index directory.
#[derive(Debug)]
pub struct SqliteVectorStore {
    conn: Mutex<Connection>,
}

impl SqliteVectorStore {
    /// Create (or overwrite-in-place) the index in the given directory.
    ///
    /// The directory is created if absent. Existing rows survive; the
    /// builder clears them explicitly before re-indexing.
    #[instrument(skip_all)]
    pub fn create(index_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(index_dir)?;

        let path = index_dir.join(INDEX_FILE_NAME);
        let conn = Connection::open(&path)?;

        // Enable WAL mode for better concurrent performance
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;

        info!("Initialized vector index at {:?}", path);

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an existing index read-only-by-convention.
    ///
    /// Fails with [`ReiseError::IndexNotFound`] if the directory or its
    /// index file is missing.
    pub fn open(index_dir: &Path) -> Result<Self> {
        if !super::index_exists(index_dir) {
            return Err(ReiseError::IndexNotFound(index_dir.to_path_buf()));
        }

        let conn = Connection::open(index_dir.join(INDEX_FILE_NAME))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Serialize embedding to bytes.
    fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    /// Deserialize embedding from bytes.
    fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect()
    }

    fn load_all(&self) -> Result<Vec<Document>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, content, chunk_order, embedding, indexed_at FROM documents
             ORDER BY chunk_order",
        )?;

        let docs = stmt
            .query_map([], |row| {
                let id: String = row.get(0)?;
                let embedding: Vec<u8> = row.get(3)?;
                let indexed_at: String = row.get(4)?;
                Ok(Document {
                    id: id.parse().unwrap_or_default(),
                    content: row.get(1)?,
                    chunk_order: row.get(2)?,
                    embedding: Self::bytes_to_embedding(&embedding),
                    indexed_at: indexed_at
                        .parse::<DateTime<Utc>>()
                        .unwrap_or_else(|_| Utc::now()),
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(docs)
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    #[instrument(skip_all, fields(count = docs.len()))]
    async fn upsert_batch(&self, docs: &[Document]) -> Result<usize> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        for doc in docs {
            tx.execute(
                "INSERT OR REPLACE INTO documents (id, content, chunk_order, embedding, indexed_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    doc.id.to_string(),
                    doc.content,
                    doc.chunk_order,
                    Self::embedding_to_bytes(&doc.embedding),
                    doc.indexed_at.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        Ok(docs.len())
    }

    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<SearchResult>> {
        // Brute-force scan; the corpus is one book, this is fine.
        let docs = self.load_all()?;

        let mut results: Vec<SearchResult> = docs
            .into_iter()
            .map(|doc| {
                let score = cosine_similarity(query_embedding, &doc.embedding);
                SearchResult {
                    document: doc,
                    score,
                }
            })
            .collect();

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(limit);

        Ok(results)
    }

    async fn clear(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let deleted = conn.execute("DELETE FROM documents", [])?;
        Ok(deleted)
    }

    async fn document_count(&self) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sqlite_round_trip() {
        let store = SqliteVectorStore::in_memory().unwrap();

        let docs = vec![
            Document::new("first chunk".to_string(), 0, vec![1.0, 0.0, 0.0]),
            Document::new("second chunk".to_string(), 1, vec![0.0, 1.0, 0.0]),
        ];
        store.upsert_batch(&docs).await.unwrap();
        assert_eq!(store.document_count().await.unwrap(), 2);

        let results = store.search(&[1.0, 0.0, 0.0], 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].document.content, "first chunk");
        assert!(results[0].score > results[1].score);
    }

    #[tokio::test]
    async fn test_clear_removes_all() {
        let store = SqliteVectorStore::in_memory().unwrap();
        let docs = vec![Document::new("chunk".to_string(), 0, vec![1.0])];
        store.upsert_batch(&docs).await.unwrap();

        assert_eq!(store.clear().await.unwrap(), 1);
        assert_eq!(store.document_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_create_then_open() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("vector_store");

        {
            let store = SqliteVectorStore::create(&dir).unwrap();
            let docs = vec![Document::new("persisted".to_string(), 0, vec![0.5, 0.5])];
            store.upsert_batch(&docs).await.unwrap();
        }

        let reopened = SqliteVectorStore::open(&dir).unwrap();
        assert_eq!(reopened.document_count().await.unwrap(), 1);
    }

    #[test]
    fn test_open_missing_index() {
        let tmp = tempfile::tempdir().unwrap();
        let err = SqliteVectorStore::open(&tmp.path().join("absent")).unwrap_err();
        assert!(matches!(err, ReiseError::IndexNotFound(_)));
    }

    #[test]
    fn test_embedding_serialization() {
        let embedding = vec![1.5, -2.25, 0.0];
        let bytes = SqliteVectorStore::embedding_to_bytes(&embedding);
        assert_eq!(bytes.len(), 12);
        assert_eq!(SqliteVectorStore::bytes_to_embedding(&bytes), embedding);
    }
}
