//! Similarity-threshold retrieval.
//!
//! [`SimilarityRetriever`] converts store-native cosine distances into
//! similarities, filters by a configured threshold, and applies a named
//! fallback policy when nothing clears the bar. It performs no mutation;
//! it is purely read-through to the vector index.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::document::ScoredChunk;
use crate::error::Result;
use crate::index::VectorIndex;

/// What to return when no candidate meets the similarity threshold.
///
/// Returning the best few candidates anyway trades answer groundedness for
/// availability: the answering stage always has some context to work with.
/// Callers that prefer a grounded "no relevant information" answer can opt
/// into [`FallbackPolicy::Empty`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackPolicy {
    /// Return the top `n` raw candidates (bounded by the requested `k`)
    /// regardless of threshold.
    BestAvailable(usize),
    /// Return no chunks.
    Empty,
}

impl Default for FallbackPolicy {
    fn default() -> Self {
        Self::BestAvailable(3)
    }
}

/// A narrow retrieval capability: ranked chunks for a query.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Return up to `k` chunks relevant to `query`, nearest first.
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>>;
}

/// Threshold-filtered retriever over a [`VectorIndex`].
pub struct SimilarityRetriever {
    index: Arc<VectorIndex>,
    threshold: f32,
    fallback: FallbackPolicy,
}

impl SimilarityRetriever {
    /// Create a retriever with the given similarity threshold in [0, 1]
    /// and the default fallback policy.
    pub fn new(index: Arc<VectorIndex>, threshold: f32) -> Self {
        Self { index, threshold, fallback: FallbackPolicy::default() }
    }

    /// Override the empty-result fallback policy.
    pub fn with_fallback(mut self, fallback: FallbackPolicy) -> Self {
        self.fallback = fallback;
        self
    }

    /// The configured similarity threshold.
    pub fn threshold(&self) -> f32 {
        self.threshold
    }
}

#[async_trait]
impl Retriever for SimilarityRetriever {
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>> {
        let raw = self.index.search_with_distance(query, k).await?;
        let raw_len = raw.len();

        // Nearest-first order is preserved; similarity = 1 − distance is
        // monotonically decreasing along the list.
        let filtered: Vec<ScoredChunk> =
            raw.iter().filter(|c| c.similarity() >= self.threshold).cloned().collect();

        if !filtered.is_empty() || raw.is_empty() {
            debug!(
                raw = raw_len,
                kept = filtered.len(),
                threshold = self.threshold,
                "retrieved chunks"
            );
            return Ok(filtered);
        }

        match self.fallback {
            FallbackPolicy::BestAvailable(n) => {
                let mut best = raw;
                best.truncate(n.min(k));
                debug!(
                    raw = raw_len,
                    kept = best.len(),
                    threshold = self.threshold,
                    "no chunk met threshold; returning best available"
                );
                Ok(best)
            }
            FallbackPolicy::Empty => {
                debug!(raw = raw_len, threshold = self.threshold, "no chunk met threshold");
                Ok(Vec::new())
            }
        }
    }
}
