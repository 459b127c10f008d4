//! Ollama-backed embedding and language model providers.
//!
//! Both providers call a local Ollama server over HTTP with `reqwest`:
//! `/api/embed` for embeddings and `/api/generate` (non-streaming) for
//! completions.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::{DEFAULT_OLLAMA_URL, LlmOptions};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::llm::LanguageModel;

/// An [`EmbeddingProvider`] backed by Ollama's `/api/embed` endpoint.
///
/// # Example
///
/// ```rust,ignore
/// use ragdoc::ollama::OllamaEmbeddingProvider;
///
/// let provider = OllamaEmbeddingProvider::new("all-minilm", 384);
/// let embedding = provider.embed("hello world").await?;
/// assert_eq!(embedding.len(), 384);
/// ```
pub struct OllamaEmbeddingProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
    dimensions: usize,
}

impl OllamaEmbeddingProvider {
    /// Create a provider for the given model against the default local
    /// Ollama endpoint.
    pub fn new(model: impl Into<String>, dimensions: usize) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            model: model.into(),
            dimensions,
        }
    }

    /// Override the Ollama base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn embedding_error(&self, message: impl Into<String>) -> RagError {
        RagError::Embedding { provider: format!("ollama/{}", self.model), message: message.into() }
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.embed_batch(&[text]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| self.embedding_error("server returned no embeddings"))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(model = %self.model, batch_size = texts.len(), "embedding batch");

        let request = EmbedRequest { model: &self.model, input: texts.to_vec() };
        let response = self
            .client
            .post(format!("{}/api/embed", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(model = %self.model, error = %e, "embedding request failed");
                self.embedding_error(format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(model = %self.model, %status, "embedding API error");
            return Err(self.embedding_error(format!("server returned {status}: {body}")));
        }

        let parsed: EmbedResponse = response
            .json()
            .await
            .map_err(|e| self.embedding_error(format!("failed to parse response: {e}")))?;

        if parsed.embeddings.len() != texts.len() {
            return Err(self.embedding_error(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                parsed.embeddings.len()
            )));
        }

        Ok(parsed.embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// A [`LanguageModel`] backed by Ollama's `/api/generate` endpoint.
///
/// Generation parameters come from [`LlmOptions`] and are passed through
/// in the request's `options` map. The request blocks until the full
/// completion is available (`stream: false`).
pub struct OllamaLanguageModel {
    client: reqwest::Client,
    base_url: String,
    options: LlmOptions,
}

impl OllamaLanguageModel {
    /// Create a model client against the default local Ollama endpoint.
    pub fn new(options: LlmOptions) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: DEFAULT_OLLAMA_URL.to_string(),
            options,
        }
    }

    /// Override the Ollama base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn llm_error(&self, message: impl Into<String>) -> RagError {
        RagError::Llm { model: self.options.model.clone(), message: message.into() }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_ctx: u32,
    num_predict: u32,
    num_thread: u32,
    repeat_penalty: f32,
    top_k: u32,
    top_p: f32,
}

impl From<&LlmOptions> for GenerateOptions {
    fn from(options: &LlmOptions) -> Self {
        Self {
            temperature: options.temperature,
            num_ctx: options.num_ctx,
            num_predict: options.num_predict,
            num_thread: options.num_thread,
            repeat_penalty: options.repeat_penalty,
            top_k: options.top_k,
            top_p: options.top_p,
        }
    }
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[async_trait]
impl LanguageModel for OllamaLanguageModel {
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!(model = %self.options.model, prompt_len = prompt.len(), "generating completion");

        let request = GenerateRequest {
            model: &self.options.model,
            prompt,
            stream: false,
            options: GenerateOptions::from(&self.options),
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(model = %self.options.model, error = %e, "generate request failed");
                self.llm_error(format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!(model = %self.options.model, %status, "generate API error");
            return Err(self.llm_error(format!("server returned {status}: {body}")));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| self.llm_error(format!("failed to parse response: {e}")))?;

        Ok(parsed.response)
    }

    fn model_name(&self) -> &str {
        &self.options.model
    }
}
