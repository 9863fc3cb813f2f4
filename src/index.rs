//! Semantic index lifecycle.
//!
//! The embedding-index service is an injected dependency behind the
//! [`EmbeddingIndexProvider`]/[`EmbeddingIndex`] traits. [`IndexManager`]
//! owns exactly one index scoped to the currently loaded document: it is
//! rebuilt from chunker output on every load and torn down on unload. Every
//! service call is fallible and none of those failures escape the manager —
//! they degrade to "no semantic retrieval" and are visible only in logs.

use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
};

use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    chunking::{self, chunk_words},
    error::{Error, Result},
    units::Unit,
};

/// Name under which the single per-document index is created.
pub const INDEX_NAME: &str = "document_index";

/// Metadata submitted with every chunk, mapping it back to its source unit.
#[derive(Debug, Clone, Serialize)]
pub struct ChunkMeta {
    pub unit_index: usize,
    pub label: String,
}

/// Factory side of the embedding-index service: creates and destroys named
/// indexes.
pub trait EmbeddingIndexProvider {
    fn create(&self, name: &str) -> Result<Box<dyn EmbeddingIndex>>;
    fn delete(&self, name: &str) -> Result<()>;
}

/// A handle to one searchable index of text chunks.
pub trait EmbeddingIndex {
    /// Submit chunks with parallel metadata and id sequences.
    fn add(&mut self, texts: Vec<String>, metadatas: Vec<ChunkMeta>, ids: Vec<String>)
    -> Result<()>;

    /// Return the top-`k` chunk texts most similar to `query`, best first.
    fn query(&self, query: &str, k: usize) -> Result<Vec<String>>;

    /// Number of chunks currently held.
    fn count(&self) -> Result<usize>;
}

/// Derive a chunk id from the document key and the chunk's position.
///
/// Ids are content-deterministic: reloading the same document reproduces the
/// same ids, so an external service that persists between loads converges
/// instead of accumulating strays.
fn chunk_id(doc_key: &str, unit_index: usize, ordinal: usize) -> String {
    let mut hasher = DefaultHasher::new();
    doc_key.hash(&mut hasher);
    unit_index.hash(&mut hasher);
    ordinal.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

/// Owns the lifecycle of the one semantic index tied to the loaded document.
pub struct IndexManager {
    provider: Box<dyn EmbeddingIndexProvider>,
    index: Option<Box<dyn EmbeddingIndex>>,
}

impl IndexManager {
    pub fn new(provider: Box<dyn EmbeddingIndexProvider>) -> Self {
        Self {
            provider,
            index: None,
        }
    }

    /// Whether a semantic index is currently available.
    pub fn is_available(&self) -> bool {
        self.index.is_some()
    }

    /// Chunk count of the current index; 0 when absent or unreadable.
    /// Callers treat "absent" and "empty" identically.
    pub fn chunk_count(&self) -> usize {
        match &self.index {
            Some(index) => match index.count() {
                Ok(count) => count,
                Err(e) => {
                    warn!("index count failed: {e}");
                    0
                }
            },
            None => 0,
        }
    }

    /// Query the current index for the top-`k` chunk texts.
    pub fn query(&self, query: &str, k: usize) -> Result<Vec<String>> {
        match &self.index {
            Some(index) => index.query(query, k),
            None => Err(Error::IndexQuery("no index available".to_string())),
        }
    }

    /// Tear down the current index. Best-effort: service errors (including
    /// "no such index") are logged and swallowed.
    pub fn teardown(&mut self) {
        self.index = None;
        if let Err(e) = self.provider.delete(INDEX_NAME) {
            debug!("index teardown skipped: {e}");
        }
    }

    /// Rebuild the index from the given units.
    ///
    /// The previous index is always torn down first. On create or submit
    /// failure the partially built index is abandoned and the manager is
    /// left with no index; the caller's load still succeeds. When the units
    /// yield zero chunks the empty index is kept.
    pub fn rebuild(&mut self, doc_key: &str, units: &[Unit]) {
        self.teardown();

        let mut index = match self.provider.create(INDEX_NAME) {
            Ok(index) => index,
            Err(e) => {
                warn!("index creation failed, semantic retrieval disabled: {e}");
                return;
            }
        };

        let mut texts = Vec::new();
        let mut metadatas = Vec::new();
        let mut ids = Vec::new();

        for unit in units {
            let chunks = chunk_words(
                &unit.text,
                chunking::DEFAULT_CHUNK_WORDS,
                chunking::DEFAULT_CHUNK_OVERLAP,
            );
            for (ordinal, chunk) in chunks.into_iter().enumerate() {
                ids.push(chunk_id(doc_key, unit.index, ordinal));
                metadatas.push(ChunkMeta {
                    unit_index: unit.index,
                    label: unit.label.clone(),
                });
                texts.push(chunk);
            }
        }

        if !texts.is_empty() {
            let submitted = texts.len();
            if let Err(e) = index.add(texts, metadatas, ids) {
                warn!("chunk submission failed, abandoning index: {e}");
                return;
            }
            debug!(chunks = submitted, "semantic index built");
        } else {
            debug!("no chunks produced, index left empty");
        }

        self.index = Some(index);
    }
}
