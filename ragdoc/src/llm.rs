//! Language model trait for answer generation.

use async_trait::async_trait;

use crate::error::Result;

/// A text-completion language model.
///
/// The answering stage fills a prompt template and treats the model's
/// output as the final answer string; no streaming or tool use.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate a completion for the given prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// The model identifier, for diagnostics.
    fn model_name(&self) -> &str;
}
