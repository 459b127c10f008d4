//! Grounded answer generation.

use std::sync::Arc;

use tracing::{debug, info};

use crate::document::Citation;
use crate::error::Result;
use crate::llm::LanguageModel;
use crate::retriever::Retriever;

/// Prompt template for grounded answering. `{threshold}` is interpolated
/// at construction; `{context}` and `{question}` per query.
const PROMPT_TEMPLATE: &str = "\
Analyze the provided context from multiple sources to answer the question. \
Provide a complete, well-structured answer in 2-3 paragraphs maximum. Be \
concise but thorough, and ensure you finish your complete thought.

Note: Only highly relevant context (similarity >= {threshold}) is provided below.

Context: {context}
Question: {question}

Complete Answer:";

/// An answer with the sources that grounded it.
#[derive(Debug, Clone)]
pub struct Answer {
    /// The language model's answer text.
    pub text: String,
    /// One citation per retrieved chunk, in retrieval order.
    pub sources: Vec<Citation>,
}

/// Composes retrieved chunks into a prompt and invokes the language model.
pub struct AnswerService {
    retriever: Arc<dyn Retriever>,
    llm: Arc<dyn LanguageModel>,
    threshold: f32,
    max_chunks: usize,
}

impl AnswerService {
    /// Create an answer service.
    ///
    /// `threshold` is only interpolated into the prompt for the model's
    /// benefit; the retriever owns the actual filtering.
    pub fn new(
        retriever: Arc<dyn Retriever>,
        llm: Arc<dyn LanguageModel>,
        threshold: f32,
        max_chunks: usize,
    ) -> Self {
        Self { retriever, llm, threshold, max_chunks }
    }

    /// Answer a question grounded in retrieved chunks.
    ///
    /// # Errors
    ///
    /// Propagates retrieval, embedding, and language model failures as
    /// [`crate::RagError`]; callers convert these into user-facing
    /// diagnostics rather than crashing.
    pub async fn ask(&self, question: &str) -> Result<Answer> {
        let chunks = self.retriever.retrieve(question, self.max_chunks).await?;
        debug!(question, chunks = chunks.len(), "retrieved context");

        let context = chunks.iter().map(|c| c.chunk.text.as_str()).collect::<Vec<_>>().join("\n\n");
        let prompt = PROMPT_TEMPLATE
            .replace("{threshold}", &self.threshold.to_string())
            .replace("{context}", &context)
            .replace("{question}", question);

        let text = self.llm.generate(&prompt).await?;
        let sources: Vec<Citation> = chunks.iter().map(|c| c.citation()).collect();

        info!(model = self.llm.model_name(), sources = sources.len(), "answered question");
        Ok(Answer { text, sources })
    }
}
