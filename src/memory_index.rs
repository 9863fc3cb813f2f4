//! In-process embedding index for use without an external service.
//!
//! [`MemoryIndexService`] implements the embedding-index contract with
//! hashed bag-of-words embeddings and brute-force cosine ranking. It is not
//! a substitute for a real ANN service on large corpora, but it gives the
//! processor a working retrieval path out of the box and keeps the full
//! pipeline testable without network or model downloads.

use std::{
    collections::HashMap,
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    sync::{Arc, Mutex},
};

use crate::{
    error::{Error, Result},
    index::{ChunkMeta, EmbeddingIndex, EmbeddingIndexProvider},
};

/// Dimensionality of the hashed bag-of-words embedding space.
pub const EMBEDDING_DIM: usize = 256;

struct StoredChunk {
    text: String,
    embedding: Vec<f32>,
}

type Collections = Arc<Mutex<HashMap<String, Vec<StoredChunk>>>>;

/// In-memory implementation of [`EmbeddingIndexProvider`].
///
/// Index handles share the provider's state, so `delete` invalidates
/// outstanding handles the same way an external service would.
pub struct MemoryIndexService {
    collections: Collections,
}

impl MemoryIndexService {
    pub fn new() -> Self {
        Self {
            collections: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Default for MemoryIndexService {
    fn default() -> Self {
        Self::new()
    }
}

impl EmbeddingIndexProvider for MemoryIndexService {
    fn create(&self, name: &str) -> Result<Box<dyn EmbeddingIndex>> {
        let mut collections = lock(&self.collections, Error::IndexBuild)?;
        collections.insert(name.to_string(), Vec::new());
        Ok(Box::new(MemoryIndex {
            name: name.to_string(),
            collections: Arc::clone(&self.collections),
        }))
    }

    fn delete(&self, name: &str) -> Result<()> {
        let mut collections = lock(&self.collections, Error::Teardown)?;
        collections
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| Error::Teardown(format!("no index named {name:?}")))
    }
}

/// Handle to one named collection inside a [`MemoryIndexService`].
pub struct MemoryIndex {
    name: String,
    collections: Collections,
}

impl EmbeddingIndex for MemoryIndex {
    fn add(
        &mut self,
        texts: Vec<String>,
        metadatas: Vec<ChunkMeta>,
        ids: Vec<String>,
    ) -> Result<()> {
        if texts.len() != metadatas.len() || texts.len() != ids.len() {
            return Err(Error::IndexBuild(
                "texts, metadatas, and ids must have equal length".to_string(),
            ));
        }

        let mut collections = lock(&self.collections, Error::IndexBuild)?;
        let chunks = collections
            .get_mut(&self.name)
            .ok_or_else(|| Error::IndexBuild(format!("index {:?} was deleted", self.name)))?;

        // Ids and metadata are validated for shape but not retained; the
        // query surface returns chunk texts only.
        for text in texts {
            let embedding = embed(&text);
            chunks.push(StoredChunk { text, embedding });
        }
        Ok(())
    }

    fn query(&self, query: &str, k: usize) -> Result<Vec<String>> {
        let collections = lock(&self.collections, Error::IndexQuery)?;
        let chunks = collections
            .get(&self.name)
            .ok_or_else(|| Error::IndexQuery(format!("index {:?} was deleted", self.name)))?;

        let query_embedding = embed(query);
        let mut scored: Vec<(f32, &StoredChunk)> = chunks
            .iter()
            .map(|c| (cosine_similarity(&query_embedding, &c.embedding), c))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        Ok(scored
            .into_iter()
            .take(k)
            .map(|(_, c)| c.text.clone())
            .collect())
    }

    fn count(&self) -> Result<usize> {
        let collections = lock(&self.collections, Error::IndexQuery)?;
        collections
            .get(&self.name)
            .map(Vec::len)
            .ok_or_else(|| Error::IndexQuery(format!("index {:?} was deleted", self.name)))
    }
}

fn lock<'a>(
    collections: &'a Collections,
    make_err: fn(String) -> Error,
) -> Result<std::sync::MutexGuard<'a, HashMap<String, Vec<StoredChunk>>>> {
    collections
        .lock()
        .map_err(|_| make_err("index lock poisoned".to_string()))
}

/// Embed text as token counts hashed into a fixed number of buckets.
fn embed(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0f32; EMBEDDING_DIM];
    for token in text.split_whitespace() {
        let token: String = token
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();
        if token.is_empty() {
            continue;
        }
        let mut hasher = DefaultHasher::new();
        token.hash(&mut hasher);
        vector[(hasher.finish() % EMBEDDING_DIM as u64) as usize] += 1.0;
    }
    vector
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
