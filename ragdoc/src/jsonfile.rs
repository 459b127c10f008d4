//! Persistent JSON-file vector store.
//!
//! Each collection is one JSON file, `{collection}.json`, inside the index
//! directory. The whole collection is held in memory behind a
//! `tokio::sync::RwLock`, loaded when the store is opened and rewritten on
//! every append. Search is exact brute-force cosine distance, which is
//! adequate at the corpus sizes this system targets.
//!
//! Single-writer, any-reader: no cross-process coordination is attempted.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::document::{Chunk, ChunkMetadata, ScoredChunk};
use crate::error::{RagError, Result};
use crate::vectorstore::{VectorStore, cosine_distance};

/// On-disk representation of one collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CollectionFile {
    dimensions: usize,
    chunks: Vec<Chunk>,
}

/// A [`VectorStore`] persisted as one JSON file per collection.
#[derive(Debug)]
pub struct JsonFileVectorStore {
    dir: PathBuf,
    collections: RwLock<HashMap<String, CollectionFile>>,
}

impl JsonFileVectorStore {
    /// Open a store rooted at `dir`, loading any collections already
    /// present. A missing directory is not an error; it is created on the
    /// first write, so probing an index location stays side-effect free.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::VectorStore`] if the directory exists but cannot
    /// be read, or an existing collection file is corrupt.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        if !dir.is_dir() {
            info!(dir = %dir.display(), "index directory absent; starting empty");
            return Ok(Self { dir, collections: RwLock::new(HashMap::new()) });
        }

        let mut collections = HashMap::new();
        for entry in std::fs::read_dir(&dir).map_err(|e| storage_error(&dir, e))? {
            let entry = entry.map_err(|e| storage_error(&dir, e))?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let data = std::fs::read_to_string(&path).map_err(|e| storage_error(&path, e))?;
            let collection: CollectionFile =
                serde_json::from_str(&data).map_err(|e| RagError::VectorStore {
                    backend: "JsonFile".to_string(),
                    message: format!("corrupt collection file {}: {e}", path.display()),
                })?;
            debug!(collection = name, chunks = collection.chunks.len(), "loaded collection");
            collections.insert(name.to_string(), collection);
        }

        info!(dir = %dir.display(), collections = collections.len(), "opened vector store");
        Ok(Self { dir, collections: RwLock::new(collections) })
    }

    fn collection_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    fn persist(&self, name: &str, collection: &CollectionFile) -> Result<()> {
        std::fs::create_dir_all(&self.dir).map_err(|e| storage_error(&self.dir, e))?;
        let path = self.collection_path(name);
        let data = serde_json::to_string(collection).map_err(|e| RagError::VectorStore {
            backend: "JsonFile".to_string(),
            message: format!("failed to serialize collection '{name}': {e}"),
        })?;
        std::fs::write(&path, data).map_err(|e| storage_error(&path, e))?;
        Ok(())
    }

    fn missing(collection: &str) -> RagError {
        RagError::VectorStore {
            backend: "JsonFile".to_string(),
            message: format!("collection '{collection}' does not exist"),
        }
    }
}

fn storage_error(path: &Path, e: std::io::Error) -> RagError {
    RagError::VectorStore {
        backend: "JsonFile".to_string(),
        message: format!("storage unavailable at {}: {e}", path.display()),
    }
}

#[async_trait]
impl VectorStore for JsonFileVectorStore {
    async fn create_collection(&self, name: &str, dimensions: usize) -> Result<()> {
        let mut collections = self.collections.write().await;
        if collections.contains_key(name) {
            // Reattach; existing data is preserved.
            return Ok(());
        }
        let collection = CollectionFile { dimensions, chunks: Vec::new() };
        self.persist(name, &collection)?;
        collections.insert(name.to_string(), collection);
        Ok(())
    }

    async fn add(&self, collection: &str, chunks: &[Chunk]) -> Result<()> {
        let mut collections = self.collections.write().await;
        let store = collections.get_mut(collection).ok_or_else(|| Self::missing(collection))?;
        store.chunks.extend(chunks.iter().cloned());
        let snapshot = store.clone();
        drop(collections);
        self.persist(collection, &snapshot)
    }

    async fn count(&self, collection: &str) -> Result<usize> {
        let collections = self.collections.read().await;
        let store = collections.get(collection).ok_or_else(|| Self::missing(collection))?;
        Ok(store.chunks.len())
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        k: usize,
    ) -> Result<Vec<ScoredChunk>> {
        let collections = self.collections.read().await;
        let store = collections.get(collection).ok_or_else(|| Self::missing(collection))?;

        let mut scored: Vec<ScoredChunk> = store
            .chunks
            .iter()
            .map(|chunk| ScoredChunk {
                chunk: chunk.clone(),
                distance: cosine_distance(&chunk.embedding, embedding),
            })
            .collect();

        scored.sort_by(|a, b| {
            a.distance.partial_cmp(&b.distance).unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(k);
        Ok(scored)
    }

    async fn list_metadata(&self, collection: &str) -> Result<Vec<ChunkMetadata>> {
        let collections = self.collections.read().await;
        let store = collections.get(collection).ok_or_else(|| Self::missing(collection))?;
        Ok(store.chunks.iter().map(|chunk| chunk.metadata.clone()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::FileType;

    fn chunk(id: &str, embedding: Vec<f32>) -> Chunk {
        Chunk {
            id: id.to_string(),
            text: format!("text of {id}"),
            embedding,
            metadata: ChunkMetadata {
                source_file: "a.pdf".to_string(),
                page: 0,
                file_type: FileType::Pdf,
            },
        }
    }

    #[tokio::test]
    async fn collections_survive_reopen() {
        let tmp = tempfile::tempdir().unwrap();

        {
            let store = JsonFileVectorStore::open(tmp.path()).unwrap();
            store.create_collection("docs", 2).await.unwrap();
            store
                .add("docs", &[chunk("a", vec![1.0, 0.0]), chunk("b", vec![0.0, 1.0])])
                .await
                .unwrap();
            assert_eq!(store.count("docs").await.unwrap(), 2);
        }

        let reopened = JsonFileVectorStore::open(tmp.path()).unwrap();
        assert_eq!(reopened.count("docs").await.unwrap(), 2);

        let results = reopened.search("docs", &[1.0, 0.0], 10).await.unwrap();
        assert_eq!(results[0].chunk.id, "a");
        assert!(results[0].distance < results[1].distance);
    }

    #[tokio::test]
    async fn create_collection_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileVectorStore::open(tmp.path()).unwrap();
        store.create_collection("docs", 2).await.unwrap();
        store.add("docs", &[chunk("a", vec![1.0, 0.0])]).await.unwrap();

        // Re-creating must not clobber existing data.
        store.create_collection("docs", 2).await.unwrap();
        assert_eq!(store.count("docs").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn search_on_empty_collection_returns_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileVectorStore::open(tmp.path()).unwrap();
        store.create_collection("docs", 2).await.unwrap();
        assert!(store.search("docs", &[1.0, 0.0], 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn metadata_listing_covers_all_chunks() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileVectorStore::open(tmp.path()).unwrap();
        store.create_collection("docs", 2).await.unwrap();
        store.add("docs", &[chunk("a", vec![1.0, 0.0]), chunk("b", vec![0.0, 1.0])]).await.unwrap();

        let metadata = store.list_metadata("docs").await.unwrap();
        assert_eq!(metadata.len(), 2);
        assert!(metadata.iter().all(|m| m.source_file == "a.pdf"));
    }
}
