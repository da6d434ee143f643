//! Generation capability trait for answer synthesis.

use async_trait::async_trait;

use crate::document::TokenUsage;
use crate::error::Result;

/// One request to the external generation capability.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// System instruction constraining the model.
    pub system: String,
    /// User message (context excerpts plus the question).
    pub user: String,
    /// Model identifier.
    pub model: String,
    /// Maximum output tokens.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

/// The generation capability's reply.
#[derive(Debug, Clone)]
pub struct Generation {
    /// Generated text.
    pub text: String,
    /// Token usage reported by the capability.
    pub usage: TokenUsage,
}

/// An external text-generation capability.
///
/// One invocation performs exactly one outbound call; retry policy, if any,
/// belongs to the implementation's transport, never to the pipeline.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate text for the given request.
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation>;
}
