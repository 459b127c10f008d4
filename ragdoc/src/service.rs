//! The question-answering service object.
//!
//! [`RagService`] owns the wiring between collaborators and the lifecycle
//! of the query engine. Initialization builds a fresh engine (index +
//! retriever + answer service) and atomically swaps it behind an `RwLock`;
//! concurrent readers observe either the previous engine or the new fully
//! built one, never a partially constructed state.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::answer::{Answer, AnswerService};
use crate::config::RagConfig;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::index::VectorIndex;
use crate::ingest::{IngestReport, IngestionCoordinator};
use crate::jsonfile::JsonFileVectorStore;
use crate::llm::LanguageModel;
use crate::loader::{DocumentLoader, FsLoader};
use crate::ollama::{OllamaEmbeddingProvider, OllamaLanguageModel};
use crate::retriever::SimilarityRetriever;
use crate::vectorstore::VectorStore;

/// Index health as reported by [`RagService::check_database`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseStatus {
    /// Whether the index exists and holds at least one chunk.
    pub exists: bool,
    /// Human-readable detail, e.g. `"42 chunks from 3 files"`.
    pub detail: String,
}

/// A fully initialized query engine.
struct QaEngine {
    answerer: AnswerService,
}

/// Service object over the whole pipeline: ingestion, status checks, and
/// question answering. Construct via [`RagService::builder`] or
/// [`RagService::from_config`].
pub struct RagService {
    config: RagConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    llm: Arc<dyn LanguageModel>,
    backend: Arc<dyn VectorStore>,
    loader: Arc<dyn DocumentLoader>,
    engine: RwLock<Option<Arc<QaEngine>>>,
}

impl RagService {
    /// Create a new [`RagServiceBuilder`].
    pub fn builder() -> RagServiceBuilder {
        RagServiceBuilder::default()
    }

    /// Wire up the default collaborators from configuration: Ollama for
    /// embeddings and generation, a JSON-file store under `index_dir`.
    pub fn from_config(config: RagConfig) -> Result<Self> {
        let embedder = Arc::new(
            OllamaEmbeddingProvider::new(
                config.embedding_model.as_str(),
                config.embedding_dimensions,
            )
            .with_base_url(config.ollama_url.as_str()),
        );
        let llm = Arc::new(
            OllamaLanguageModel::new(config.llm.clone())
                .with_base_url(config.ollama_url.as_str()),
        );
        let backend = Arc::new(JsonFileVectorStore::open(&config.index_dir)?);
        Self::builder().config(config).embedder(embedder).llm(llm).backend(backend).build()
    }

    /// The service configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    async fn open_index(&self) -> Result<Arc<VectorIndex>> {
        let index = VectorIndex::open(
            self.embedder.clone(),
            self.backend.clone(),
            self.config.collection.clone(),
        )
        .await?;
        Ok(Arc::new(index))
    }

    /// Report index health without raising.
    ///
    /// Missing index directory yields `(false, "Database not found")`; an
    /// index with zero chunks yields `(false, "Database empty")`; anything
    /// that goes wrong while probing is folded into the detail string.
    pub async fn check_database(&self) -> DatabaseStatus {
        if !self.config.index_dir.exists() {
            return DatabaseStatus { exists: false, detail: "Database not found".to_string() };
        }

        let probe = async {
            let index = self.open_index().await?;
            let count = index.count().await?;
            let files = index.source_files().await?.len();
            Ok::<_, RagError>((count, files))
        };

        match probe.await {
            Ok((0, _)) => DatabaseStatus { exists: false, detail: "Database empty".to_string() },
            Ok((count, files)) => DatabaseStatus {
                exists: true,
                detail: format!("{count} chunks from {files} files"),
            },
            Err(e) => DatabaseStatus { exists: false, detail: format!("Error: {e}") },
        }
    }

    /// Run incremental ingestion over the configured document directory.
    ///
    /// Creates the document directory if it does not exist yet, so a fresh
    /// deployment reports "nothing to do" instead of failing.
    pub async fn ingest(&self) -> Result<IngestReport> {
        std::fs::create_dir_all(&self.config.docs_dir)?;
        let index = self.open_index().await?;
        let coordinator =
            IngestionCoordinator::new(self.loader.clone(), index, self.config.batch_size);
        coordinator.sync(&self.config.docs_dir).await
    }

    /// Initialize or reinitialize the query engine.
    ///
    /// If the index is missing or empty, ingestion runs first. On success
    /// the new engine replaces the old one in a single swap.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Service`] if ingestion finds nothing to index,
    /// and propagates storage failures.
    pub async fn initialize(&self) -> Result<String> {
        let status = self.check_database().await;

        if !status.exists {
            info!(detail = %status.detail, "database not ready; running setup");
            let report = self.ingest().await?;
            if !report.success() {
                return Err(RagError::Service(report.message()));
            }
        }

        let index = self.open_index().await?;
        if index.count().await? == 0 {
            return Err(RagError::Service("Database is empty after setup".to_string()));
        }

        let retriever =
            Arc::new(SimilarityRetriever::new(index, self.config.similarity_threshold));
        let answerer = AnswerService::new(
            retriever,
            self.llm.clone(),
            self.config.similarity_threshold,
            self.config.max_chunks,
        );

        *self.engine.write().await = Some(Arc::new(QaEngine { answerer }));
        info!("system initialized");
        Ok("System initialized successfully".to_string())
    }

    /// Answer a question through the initialized engine.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Service`] if [`initialize`](Self::initialize)
    /// has not succeeded yet; otherwise propagates collaborator failures.
    pub async fn ask(&self, question: &str) -> Result<Answer> {
        let engine = self.engine.read().await.clone();
        let engine = engine
            .ok_or_else(|| RagError::Service("system not initialized".to_string()))?;
        engine.answerer.ask(question).await
    }

    /// Whether the engine is initialized and ready to answer.
    pub async fn is_ready(&self) -> bool {
        self.engine.read().await.is_some()
    }
}

/// Builder for constructing a [`RagService`] with injected collaborators.
#[derive(Default)]
pub struct RagServiceBuilder {
    config: Option<RagConfig>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    llm: Option<Arc<dyn LanguageModel>>,
    backend: Option<Arc<dyn VectorStore>>,
    loader: Option<Arc<dyn DocumentLoader>>,
}

impl RagServiceBuilder {
    /// Set the service configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the language model.
    pub fn llm(mut self, llm: Arc<dyn LanguageModel>) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Set the vector store backend.
    pub fn backend(mut self, backend: Arc<dyn VectorStore>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Set the document loader. Defaults to [`FsLoader`] with the
    /// configured chunk size and overlap.
    pub fn loader(mut self, loader: Arc<dyn DocumentLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Build the [`RagService`], validating that all required collaborators
    /// are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if a required field is missing.
    pub fn build(self) -> Result<RagService> {
        let config =
            self.config.ok_or_else(|| RagError::Config("config is required".to_string()))?;
        let embedder =
            self.embedder.ok_or_else(|| RagError::Config("embedder is required".to_string()))?;
        let llm = self.llm.ok_or_else(|| RagError::Config("llm is required".to_string()))?;
        let backend =
            self.backend.ok_or_else(|| RagError::Config("backend is required".to_string()))?;
        let loader = self
            .loader
            .unwrap_or_else(|| Arc::new(FsLoader::new(config.chunk_size, config.chunk_overlap)));

        Ok(RagService {
            config,
            embedder,
            llm,
            backend,
            loader,
            engine: RwLock::new(None),
        })
    }
}
