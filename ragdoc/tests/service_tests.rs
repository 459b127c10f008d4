//! Service lifecycle: status checks, initialization, reinitialization,
//! and answering over injected collaborators.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use ragdoc::document::{Chunk, ChunkMetadata, FileType};
use ragdoc::embedding::EmbeddingProvider;
use ragdoc::jsonfile::JsonFileVectorStore;
use ragdoc::llm::LanguageModel;
use ragdoc::loader::DocumentLoader;
use ragdoc::service::RagService;
use ragdoc::{RagConfig, RagError};

struct MockEmbedder {
    dimensions: usize,
}

#[async_trait]
impl EmbeddingProvider for MockEmbedder {
    async fn embed(&self, text: &str) -> ragdoc::Result<Vec<f32>> {
        let hash = text.bytes().fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
        let mut emb = vec![0.0f32; self.dimensions];
        for (i, v) in emb.iter_mut().enumerate() {
            *v = ((hash.wrapping_add(i as u64)) as f32).sin();
        }
        Ok(emb)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

struct StubLlm;

#[async_trait]
impl LanguageModel for StubLlm {
    async fn generate(&self, _prompt: &str) -> ragdoc::Result<String> {
        Ok("a grounded answer".to_string())
    }

    fn model_name(&self) -> &str {
        "stub"
    }
}

struct StubLoader {
    calls: Mutex<usize>,
}

impl StubLoader {
    fn new() -> Self {
        Self { calls: Mutex::new(0) }
    }
}

impl DocumentLoader for StubLoader {
    fn load_and_split(&self, _docs_dir: &Path, files: &[String]) -> Vec<Chunk> {
        *self.calls.lock().unwrap() += 1;
        let mut chunks = Vec::new();
        for file in files {
            for i in 0..2 {
                let metadata = ChunkMetadata {
                    source_file: file.clone(),
                    page: i + 1,
                    file_type: FileType::Docx,
                };
                chunks.push(Chunk::new(format!("{file} chunk {i}"), metadata, 0));
            }
        }
        chunks
    }
}

fn test_config(docs_dir: PathBuf, index_dir: PathBuf) -> RagConfig {
    RagConfig::builder()
        .docs_dir(docs_dir)
        .index_dir(index_dir)
        .collection("all_docs")
        .build()
        .unwrap()
}

fn build_service(docs_dir: PathBuf, index_dir: PathBuf, loader: Arc<StubLoader>) -> RagService {
    let config = test_config(docs_dir, index_dir.clone());
    RagService::builder()
        .config(config)
        .embedder(Arc::new(MockEmbedder { dimensions: 8 }))
        .llm(Arc::new(StubLlm))
        .backend(Arc::new(JsonFileVectorStore::open(index_dir).unwrap()))
        .loader(loader)
        .build()
        .unwrap()
}

#[tokio::test]
async fn check_database_on_missing_directory_reports_not_found() {
    let tmp = tempfile::tempdir().unwrap();
    let service = build_service(
        tmp.path().join("documents"),
        tmp.path().join("missing_index"),
        Arc::new(StubLoader::new()),
    );

    let status = service.check_database().await;
    assert!(!status.exists);
    assert_eq!(status.detail, "Database not found");
}

#[tokio::test]
async fn ask_before_initialize_is_a_service_error() {
    let tmp = tempfile::tempdir().unwrap();
    let service = build_service(
        tmp.path().join("documents"),
        tmp.path().join("index"),
        Arc::new(StubLoader::new()),
    );

    let err = service.ask("anything").await.unwrap_err();
    assert!(matches!(err, RagError::Service(_)));
}

#[tokio::test]
async fn initialize_with_no_documents_reports_failure_without_panicking() {
    let tmp = tempfile::tempdir().unwrap();
    let service = build_service(
        tmp.path().join("documents"),
        tmp.path().join("index"),
        Arc::new(StubLoader::new()),
    );

    let err = service.initialize().await.unwrap_err();
    assert!(matches!(err, RagError::Service(_)));
    assert!(!service.is_ready().await);
    // The empty document directory was created for the next attempt.
    assert!(tmp.path().join("documents").is_dir());
}

#[tokio::test]
async fn initialize_ingests_and_answers() {
    let tmp = tempfile::tempdir().unwrap();
    let docs = tmp.path().join("documents");
    std::fs::create_dir_all(&docs).unwrap();
    std::fs::write(docs.join("handbook.docx"), b"placeholder").unwrap();

    let loader = Arc::new(StubLoader::new());
    let service = build_service(docs, tmp.path().join("index"), loader);

    let message = service.initialize().await.unwrap();
    assert_eq!(message, "System initialized successfully");
    assert!(service.is_ready().await);

    let status = service.check_database().await;
    assert!(status.exists);
    assert!(status.detail.contains("chunks from 1 files"));

    let answer = service.ask("What does the handbook say?").await.unwrap();
    assert_eq!(answer.text, "a grounded answer");
    assert!(!answer.sources.is_empty());
    assert!(answer.sources.iter().all(|s| s.source_file == "handbook.docx"));
}

#[tokio::test]
async fn reinitialize_swaps_the_engine_in_place() {
    let tmp = tempfile::tempdir().unwrap();
    let docs = tmp.path().join("documents");
    std::fs::create_dir_all(&docs).unwrap();
    std::fs::write(docs.join("a.docx"), b"placeholder").unwrap();

    let service = build_service(docs, tmp.path().join("index"), Arc::new(StubLoader::new()));

    service.initialize().await.unwrap();
    service.initialize().await.unwrap();
    assert!(service.is_ready().await);
    assert!(service.ask("still working?").await.is_ok());
}

#[tokio::test]
async fn persisted_index_is_reused_without_reingesting() {
    let tmp = tempfile::tempdir().unwrap();
    let docs = tmp.path().join("documents");
    let index_dir = tmp.path().join("index");
    std::fs::create_dir_all(&docs).unwrap();
    std::fs::write(docs.join("a.docx"), b"placeholder").unwrap();

    {
        let service =
            build_service(docs.clone(), index_dir.clone(), Arc::new(StubLoader::new()));
        service.initialize().await.unwrap();
    }

    // A fresh service over the same index directory attaches to the
    // existing data; the loader is never consulted.
    let loader = Arc::new(StubLoader::new());
    let service = build_service(docs, index_dir, loader.clone());

    let status = service.check_database().await;
    assert!(status.exists);

    service.initialize().await.unwrap();
    assert_eq!(*loader.calls.lock().unwrap(), 0);
    assert!(service.ask("q").await.is_ok());
}
