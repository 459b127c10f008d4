//! Configuration for the document QA pipeline.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Default Ollama endpoint.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Generation options passed through to the language model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmOptions {
    /// Model identifier, e.g. `llama3.2:3b-instruct-q4_0`.
    pub model: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Context window size in tokens.
    pub num_ctx: u32,
    /// Maximum number of tokens to generate.
    pub num_predict: u32,
    /// CPU threads used for inference.
    pub num_thread: u32,
    /// Penalty applied to repeated tokens.
    pub repeat_penalty: f32,
    /// Vocabulary restricted to the top K next tokens.
    pub top_k: u32,
    /// Nucleus sampling cumulative-probability cutoff.
    pub top_p: f32,
}

impl Default for LlmOptions {
    fn default() -> Self {
        Self {
            model: "llama3.2:3b-instruct-q4_0".to_string(),
            temperature: 0.7,
            num_ctx: 512,
            num_predict: 500,
            num_thread: 4,
            repeat_penalty: 1.1,
            top_k: 3,
            top_p: 0.7,
        }
    }
}

/// Configuration parameters for ingestion, retrieval, and answering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RagConfig {
    /// Directory scanned for PDF/DOCX documents.
    pub docs_dir: PathBuf,
    /// Directory holding the persistent vector index.
    pub index_dir: PathBuf,
    /// Name of the index collection.
    pub collection: String,
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Characters of overlap between consecutive chunks.
    pub chunk_overlap: usize,
    /// Number of chunks written to the store per batch during ingestion.
    pub batch_size: usize,
    /// Minimum derived similarity a chunk must meet to be considered relevant.
    pub similarity_threshold: f32,
    /// Maximum candidate count fetched per query.
    pub max_chunks: usize,
    /// Base URL of the Ollama endpoint.
    pub ollama_url: String,
    /// Embedding model identifier.
    pub embedding_model: String,
    /// Dimensionality of the embedding model's output.
    pub embedding_dimensions: usize,
    /// Language model and its generation parameters.
    pub llm: LlmOptions,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            docs_dir: PathBuf::from("documents"),
            index_dir: PathBuf::from("instance"),
            collection: "all_docs".to_string(),
            chunk_size: 500,
            chunk_overlap: 100,
            batch_size: 50,
            similarity_threshold: 0.3,
            max_chunks: 5,
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            embedding_model: "all-minilm".to_string(),
            embedding_dimensions: 384,
            llm: LlmOptions::default(),
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a validated [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }

    /// Build a config from defaults plus `RAGDOC_*` environment overrides.
    ///
    /// Recognized variables: `RAGDOC_DOCS_DIR`, `RAGDOC_INDEX_DIR`,
    /// `RAGDOC_COLLECTION`, `RAGDOC_OLLAMA_URL`, `RAGDOC_EMBEDDING_MODEL`,
    /// `RAGDOC_LLM_MODEL`, `RAGDOC_SIMILARITY_THRESHOLD`, `RAGDOC_MAX_CHUNKS`.
    pub fn from_env() -> Result<Self> {
        let mut builder = Self::builder();
        if let Ok(dir) = std::env::var("RAGDOC_DOCS_DIR") {
            builder = builder.docs_dir(dir);
        }
        if let Ok(dir) = std::env::var("RAGDOC_INDEX_DIR") {
            builder = builder.index_dir(dir);
        }
        if let Ok(name) = std::env::var("RAGDOC_COLLECTION") {
            builder = builder.collection(name);
        }
        if let Ok(url) = std::env::var("RAGDOC_OLLAMA_URL") {
            builder = builder.ollama_url(url);
        }
        if let Ok(model) = std::env::var("RAGDOC_EMBEDDING_MODEL") {
            builder = builder.embedding_model(model);
        }
        if let Ok(model) = std::env::var("RAGDOC_LLM_MODEL") {
            builder = builder.llm_model(model);
        }
        if let Ok(value) = std::env::var("RAGDOC_SIMILARITY_THRESHOLD") {
            let threshold = value.parse::<f32>().map_err(|_| {
                RagError::Config(format!("RAGDOC_SIMILARITY_THRESHOLD is not a number: {value}"))
            })?;
            builder = builder.similarity_threshold(threshold);
        }
        if let Ok(value) = std::env::var("RAGDOC_MAX_CHUNKS") {
            let max = value.parse::<usize>().map_err(|_| {
                RagError::Config(format!("RAGDOC_MAX_CHUNKS is not an integer: {value}"))
            })?;
            builder = builder.max_chunks(max);
        }
        builder.build()
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the document directory.
    pub fn docs_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.docs_dir = dir.into();
        self
    }

    /// Set the index directory.
    pub fn index_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.index_dir = dir.into();
        self
    }

    /// Set the collection name.
    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.config.collection = name.into();
        self
    }

    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the ingestion write batch size.
    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.batch_size = size;
        self
    }

    /// Set the minimum similarity threshold for retrieval.
    pub fn similarity_threshold(mut self, threshold: f32) -> Self {
        self.config.similarity_threshold = threshold;
        self
    }

    /// Set the maximum candidate count per query.
    pub fn max_chunks(mut self, max: usize) -> Self {
        self.config.max_chunks = max;
        self
    }

    /// Set the Ollama base URL.
    pub fn ollama_url(mut self, url: impl Into<String>) -> Self {
        self.config.ollama_url = url.into();
        self
    }

    /// Set the embedding model identifier.
    pub fn embedding_model(mut self, model: impl Into<String>) -> Self {
        self.config.embedding_model = model.into();
        self
    }

    /// Set the embedding dimensionality.
    pub fn embedding_dimensions(mut self, dims: usize) -> Self {
        self.config.embedding_dimensions = dims;
        self
    }

    /// Set the language model identifier, keeping other generation options.
    pub fn llm_model(mut self, model: impl Into<String>) -> Self {
        self.config.llm.model = model.into();
        self
    }

    /// Replace the full set of language model options.
    pub fn llm_options(mut self, options: LlmOptions) -> Self {
        self.config.llm = options;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if:
    /// - `chunk_overlap >= chunk_size`
    /// - `max_chunks == 0`
    /// - `batch_size == 0`
    /// - `similarity_threshold` is outside [0, 1]
    pub fn build(self) -> Result<RagConfig> {
        let config = self.config;
        if config.chunk_overlap >= config.chunk_size {
            return Err(RagError::Config(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                config.chunk_overlap, config.chunk_size
            )));
        }
        if config.max_chunks == 0 {
            return Err(RagError::Config("max_chunks must be greater than zero".to_string()));
        }
        if config.batch_size == 0 {
            return Err(RagError::Config("batch_size must be greater than zero".to_string()));
        }
        if !(0.0..=1.0).contains(&config.similarity_threshold) {
            return Err(RagError::Config(format!(
                "similarity_threshold ({}) must be within [0, 1]",
                config.similarity_threshold
            )));
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        let config = RagConfig::builder().build().unwrap();
        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.chunk_overlap, 100);
        assert_eq!(config.batch_size, 50);
        assert_eq!(config.max_chunks, 5);
    }

    #[test]
    fn overlap_must_be_less_than_size() {
        let err = RagConfig::builder().chunk_size(100).chunk_overlap(100).build().unwrap_err();
        assert!(matches!(err, RagError::Config(_)));
    }

    #[test]
    fn threshold_must_be_in_unit_interval() {
        assert!(RagConfig::builder().similarity_threshold(1.5).build().is_err());
        assert!(RagConfig::builder().similarity_threshold(-0.1).build().is_err());
        assert!(RagConfig::builder().similarity_threshold(0.0).build().is_ok());
        assert!(RagConfig::builder().similarity_threshold(1.0).build().is_ok());
    }

    #[test]
    fn zero_counts_rejected() {
        assert!(RagConfig::builder().max_chunks(0).build().is_err());
        assert!(RagConfig::builder().batch_size(0).build().is_err());
    }
}
