//! The vector index adapter: embedding provider + store backend.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use crate::document::{Chunk, ScoredChunk};
use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::vectorstore::VectorStore;

/// Composes an [`EmbeddingProvider`] with a [`VectorStore`] backend and a
/// collection name. The rest of the system reads and writes chunks only
/// through this adapter and never touches storage directly.
pub struct VectorIndex {
    embedder: Arc<dyn EmbeddingProvider>,
    backend: Arc<dyn VectorStore>,
    collection: String,
}

impl VectorIndex {
    /// Open (or initialize) the named collection on the backend.
    ///
    /// Idempotent: reattaches to an existing collection without data loss.
    pub async fn open(
        embedder: Arc<dyn EmbeddingProvider>,
        backend: Arc<dyn VectorStore>,
        collection: impl Into<String>,
    ) -> Result<Self> {
        let collection = collection.into();
        backend.create_collection(&collection, embedder.dimensions()).await?;
        Ok(Self { embedder, backend, collection })
    }

    /// The collection this index reads and writes.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Embed the chunks' text in one batch and append them to the store.
    ///
    /// Callers are expected to bound batch sizes; this method embeds the
    /// whole slice in a single provider call.
    pub async fn add(&self, mut chunks: Vec<Chunk>) -> Result<()> {
        if chunks.is_empty() {
            return Ok(());
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
            chunk.embedding = embedding;
        }

        self.backend.add(&self.collection, &chunks).await
    }

    /// Total number of stored chunks.
    pub async fn count(&self) -> Result<usize> {
        self.backend.count(&self.collection).await
    }

    /// Embed the query and return the `k` nearest chunks with their native
    /// cosine distances, nearest first.
    pub async fn search_with_distance(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        let embedding = self.embedder.embed(query).await?;
        let results = self.backend.search(&self.collection, &embedding, k).await?;
        debug!(k, returned = results.len(), "similarity search");
        Ok(results)
    }

    /// The set of distinct source files present in the index, computed by
    /// scanning all stored metadata.
    pub async fn source_files(&self) -> Result<BTreeSet<String>> {
        let metadata = self.backend.list_metadata(&self.collection).await?;
        Ok(metadata.into_iter().map(|m| m.source_file).collect())
    }
}
