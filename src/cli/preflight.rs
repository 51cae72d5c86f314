//! Pre-flight checks before expensive operations.
//!
//! Validates that required credentials and files are available before
//! starting operations that would otherwise fail midway.

use crate::config::{Credentials, Settings};
use crate::error::{ReiseError, Result};
use crate::vector_store::index_exists;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Asking requires both API keys and a built index.
    Ask,
    /// Building requires the OpenAI key and the corpus file.
    Build,
    /// Direct search requires the OpenAI key and a built index.
    Search,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Ask => {
            Credentials::from_env()?;
            check_index(settings)?;
        }
        Operation::Build => {
            Credentials::from_env()?;
            check_corpus(settings)?;
        }
        Operation::Search => {
            Credentials::from_env()?;
            check_index(settings)?;
        }
    }
    Ok(())
}

fn check_corpus(settings: &Settings) -> Result<()> {
    let path = settings.corpus_path();
    if !path.exists() {
        return Err(ReiseError::CorpusNotFound(path));
    }
    Ok(())
}

fn check_index(settings: &Settings) -> Result<()> {
    let dir = settings.index_dir();
    if !index_exists(&dir) {
        return Err(ReiseError::IndexNotFound(dir));
    }
    Ok(())
}
