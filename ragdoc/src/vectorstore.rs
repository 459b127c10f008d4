//! Vector store trait for storing and searching chunk embeddings.

use async_trait::async_trait;

use crate::document::{Chunk, ChunkMetadata, ScoredChunk};
use crate::error::Result;

/// A storage backend for chunk embeddings with cosine-distance search.
///
/// Implementations manage named, append-only collections of [`Chunk`]s.
/// Chunks are never updated in place; the only way to rebuild is to delete
/// the collection's storage and ingest again.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Open or initialize a named collection. Idempotent: calling on an
    /// existing collection reattaches to it without data loss.
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()>;

    /// Append chunks to a collection. Chunks must have embeddings set.
    async fn add(&self, collection: &str, chunks: &[Chunk]) -> Result<()>;

    /// Total number of chunks stored in a collection.
    async fn count(&self, collection: &str) -> Result<usize>;

    /// Return the `k` nearest chunks to `embedding`, nearest first, each
    /// paired with its cosine distance.
    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredChunk>>;

    /// Metadata for every stored chunk, used to compute the set of files
    /// already ingested.
    async fn list_metadata(&self, collection: &str) -> Result<Vec<ChunkMetadata>>;
}

/// Cosine distance between two vectors: `1 − cos(a, b)`, in [0, 2].
///
/// Returns 1.0 (orthogonal) if either vector has zero magnitude.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_vectors_have_zero_distance() {
        let v = [0.6f32, 0.8];
        assert!(cosine_distance(&v, &v).abs() < 1e-6);
    }

    #[test]
    fn opposite_vectors_have_distance_two() {
        let a = [1.0f32, 0.0];
        let b = [-1.0f32, 0.0];
        assert!((cosine_distance(&a, &b) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn zero_vector_is_treated_as_orthogonal() {
        let a = [0.0f32, 0.0];
        let b = [1.0f32, 0.0];
        assert!((cosine_distance(&a, &b) - 1.0).abs() < 1e-6);
    }
}
