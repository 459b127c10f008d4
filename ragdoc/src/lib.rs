//! Retrieval-augmented question answering over a local PDF/DOCX corpus.
//!
//! `ragdoc` ingests documents from a directory, splits them into
//! overlapping chunks, embeds them into a persistent vector index, and at
//! query time retrieves the chunks most similar to a question to ground a
//! language model's answer.
//!
//! The pipeline is composed from narrow traits so every collaborator can
//! be swapped: [`EmbeddingProvider`] and [`LanguageModel`] (Ollama-backed
//! by default), [`VectorStore`] (persistent JSON-file or in-memory), and
//! [`DocumentLoader`].
//!
//! # Example
//!
//! ```rust,ignore
//! use ragdoc::{RagConfig, RagService};
//!
//! let config = RagConfig::builder()
//!     .docs_dir("documents")
//!     .index_dir("instance")
//!     .build()?;
//! let service = RagService::from_config(config)?;
//!
//! service.initialize().await?;
//! let answer = service.ask("What is the refund policy?").await?;
//! println!("{}", answer.text);
//! for source in &answer.sources {
//!     println!("  {source}");
//! }
//! ```

pub mod answer;
pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod extract;
pub mod index;
pub mod ingest;
pub mod inmemory;
pub mod jsonfile;
pub mod llm;
pub mod loader;
pub mod ollama;
pub mod retriever;
pub mod scanner;
pub mod service;
pub mod vectorstore;

pub use answer::{Answer, AnswerService};
pub use chunking::TextSplitter;
pub use config::{LlmOptions, RagConfig, RagConfigBuilder};
pub use document::{Chunk, ChunkMetadata, Citation, FileType, ScoredChunk};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use index::VectorIndex;
pub use ingest::{IngestOutcome, IngestReport, IngestionCoordinator};
pub use inmemory::InMemoryVectorStore;
pub use jsonfile::JsonFileVectorStore;
pub use llm::LanguageModel;
pub use loader::{DocumentLoader, FsLoader};
pub use ollama::{OllamaEmbeddingProvider, OllamaLanguageModel};
pub use retriever::{FallbackPolicy, Retriever, SimilarityRetriever};
pub use scanner::scan_documents;
pub use service::{DatabaseStatus, RagService, RagServiceBuilder};
pub use vectorstore::VectorStore;
