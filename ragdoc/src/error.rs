//! Error types for the `ragdoc` crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while ingesting, retrieving, or answering.
#[derive(Debug, Error)]
pub enum RagError {
    /// A document or index directory does not exist.
    #[error("Directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the vector store backend.
    #[error("Vector store error ({backend}): {message}")]
    VectorStore {
        /// The vector store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred while calling the language model.
    #[error("Language model error ({model}): {message}")]
    Llm {
        /// The model that produced the error.
        model: String,
        /// A description of the failure.
        message: String,
    },

    /// Text extraction from a document failed.
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An error in the ingestion workflow.
    #[error("Ingestion error: {0}")]
    Ingestion(String),

    /// The service was used before initialization, or failed to initialize.
    #[error("Service error: {0}")]
    Service(String),

    /// An underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A convenience result type for ragdoc operations.
pub type Result<T> = std::result::Result<T, RagError>;
