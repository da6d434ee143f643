//! Answer synthesis: prompt assembly and the single generation call.

use std::fmt::Write as _;
use std::sync::Arc;

use tracing::{error, info};

use crate::config::QaConfig;
use crate::document::{RetrievedChunk, TokenUsage};
use crate::error::{QaError, Result};
use crate::generation::{GenerationRequest, Generator};

/// Fixed system instruction for the generation capability.
///
/// Constrains the model to the supplied context, tells it to acknowledge
/// insufficient context rather than fabricate, and to cite paper sections
/// when relevant.
const SYSTEM_PROMPT: &str = "You are an expert assistant answering questions about a research paper.\n\
Your role is to answer questions using the excerpts from the paper provided as context.\n\
\n\
Guidelines:\n\
1. Base your answers primarily on the provided context\n\
2. Be precise and technical when appropriate\n\
3. If the context doesn't contain enough information to answer fully, acknowledge this\n\
4. Cite specific sections or concepts from the paper when relevant\n\
5. Explain complex concepts clearly\n\
6. If asked about something not covered by the context, clarify that your knowledge is limited to the paper's content";

/// The synthesized answer before the orchestrator attaches context snippets.
#[derive(Debug, Clone)]
pub struct SynthesizedAnswer {
    /// Generated answer text.
    pub text: String,
    /// Model identifier used for the call.
    pub model: String,
    /// Token usage reported by the capability.
    pub usage: TokenUsage,
}

/// Combines retrieved context and a question into one generation request.
///
/// Performs exactly one outbound generation call per invocation and never
/// retries; transport-level retry policy belongs to the [`Generator`]
/// implementation.
pub struct AnswerSynthesizer {
    generator: Arc<dyn Generator>,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl AnswerSynthesizer {
    /// Create a synthesizer over the given generator, taking model
    /// parameters from `config`.
    pub fn new(generator: Arc<dyn Generator>, config: &QaConfig) -> Self {
        Self {
            generator,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    /// Synthesize an answer to `question` from `context`.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::Pipeline`] when called with empty context — the
    /// orchestrator must short-circuit before reaching the synthesizer —
    /// and propagates [`QaError::Generation`] from the capability.
    pub async fn synthesize(
        &self,
        question: &str,
        context: &[RetrievedChunk],
    ) -> Result<SynthesizedAnswer> {
        if context.is_empty() {
            return Err(QaError::Pipeline(
                "answer synthesis invoked without context chunks".to_string(),
            ));
        }

        let request = GenerationRequest {
            system: SYSTEM_PROMPT.to_string(),
            user: build_user_message(question, context),
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        info!(model = %self.model, context_chunks = context.len(), "calling generation capability");
        let generation = self.generator.generate(&request).await.inspect_err(|e| {
            error!(error = %e, "generation call failed");
        })?;

        info!(answer_len = generation.text.len(), "generated answer");
        Ok(SynthesizedAnswer {
            text: generation.text,
            model: self.model.clone(),
            usage: generation.usage,
        })
    }
}

/// Label each context chunk and append the verbatim question.
fn build_user_message(question: &str, context: &[RetrievedChunk]) -> String {
    let mut message = String::from(
        "Based on the following excerpts from the paper, please answer the question.\n\nContext from the paper:\n",
    );
    for (i, chunk) in context.iter().enumerate() {
        let _ = write!(message, "[Context {}]:\n{}\n\n", i + 1, chunk.text);
    }
    let _ = write!(
        message,
        "Question: {question}\n\nPlease provide a comprehensive answer based on the context above."
    );
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn chunk(text: &str) -> RetrievedChunk {
        RetrievedChunk { text: text.to_string(), distance: 0.2, metadata: HashMap::new() }
    }

    #[test]
    fn user_message_labels_chunks_in_order() {
        let message =
            build_user_message("What is attention?", &[chunk("first"), chunk("second")]);
        let first = message.find("[Context 1]:\nfirst").unwrap();
        let second = message.find("[Context 2]:\nsecond").unwrap();
        assert!(first < second);
    }

    #[test]
    fn user_message_keeps_question_verbatim() {
        let message = build_user_message("Why  two  spaces?", &[chunk("ctx")]);
        assert!(message.contains("Question: Why  two  spaces?"));
    }
}
