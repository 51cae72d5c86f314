//! Corpus loading and chunking.
//!
//! The book is split into fixed-length, overlapping character chunks.
//! Boundaries are purely positional, not semantic; overlap keeps context
//! from being cut mid-sentence at retrieval time.

use crate::error::{ReiseError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// A chunk of the source corpus.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusChunk {
    /// Text content of this chunk.
    pub content: String,
    /// Position of this chunk in the corpus.
    pub order: i32,
}

/// Load the corpus text from disk.
///
/// Fails with [`ReiseError::CorpusNotFound`] before any downstream work
/// if the file is absent.
pub fn load_corpus(path: &Path) -> Result<String> {
    if !path.exists() {
        return Err(ReiseError::CorpusNotFound(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path)?;
    debug!("Loaded corpus: {} characters", text.chars().count());
    Ok(text)
}

/// Split text into fixed-size overlapping chunks.
///
/// Chunks are `chunk_size` characters long and consecutive chunks share
/// `overlap` characters, so concatenating the first chunk with every later
/// chunk minus its leading overlap reconstructs the original text. Offsets
/// are counted in characters, never raw bytes.
pub fn split_into_chunks(text: &str, chunk_size: usize, overlap: usize) -> Vec<CorpusChunk> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() || chunk_size == 0 {
        return Vec::new();
    }

    // An overlap as large as the chunk would never advance.
    let step = chunk_size.saturating_sub(overlap).max(1);
    let mut chunks = Vec::new();
    let mut start = 0;
    let mut order = 0;

    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        chunks.push(CorpusChunk {
            content: chars[start..end].iter().collect(),
            order,
        });
        if end == chars.len() {
            break;
        }
        start += step;
        order += 1;
    }

    debug!("Split corpus into {} chunks", chunks.len());
    chunks
}
