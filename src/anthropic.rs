//! Anthropic generation client using the Messages API.
//!
//! This module is only available when the `anthropic` feature is enabled.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::document::TokenUsage;
use crate::error::{QaError, Result};
use crate::generation::{Generation, GenerationRequest, Generator};

/// The Anthropic Messages API endpoint.
const ANTHROPIC_MESSAGES_URL: &str = "https://api.anthropic.com/v1/messages";

/// API version header value required by the Messages API.
const ANTHROPIC_VERSION: &str = "2023-06-01";

/// A [`Generator`] backed by the Anthropic Messages API.
///
/// Uses `reqwest` to call `/v1/messages` directly. The model identifier,
/// token limit, and temperature come from each [`GenerationRequest`], so one
/// client serves any configured model.
///
/// # Example
///
/// ```rust,ignore
/// use paper_qa::anthropic::AnthropicGenerator;
///
/// let generator = AnthropicGenerator::from_env()?;
/// let generation = generator.generate(&request).await?;
/// ```
pub struct AnthropicGenerator {
    client: reqwest::Client,
    api_key: String,
}

impl AnthropicGenerator {
    /// Create a new generator with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(QaError::Generation {
                provider: "Anthropic".into(),
                message: "API key must not be empty".into(),
            });
        }

        Ok(Self { client: reqwest::Client::new(), api_key })
    }

    /// Create a new generator using the `ANTHROPIC_API_KEY` environment
    /// variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("ANTHROPIC_API_KEY").map_err(|_| QaError::Config(
            "ANTHROPIC_API_KEY environment variable not set".to_string(),
        ))?;
        Self::new(api_key)
    }
}

// ── Messages API request/response types ────────────────────────────

#[derive(Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    usage: Usage,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct Usage {
    input_tokens: u32,
    output_tokens: u32,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

// ── Generator implementation ───────────────────────────────────────

#[async_trait]
impl Generator for AnthropicGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<Generation> {
        debug!(
            provider = "Anthropic",
            model = %request.model,
            max_tokens = request.max_tokens,
            "sending messages request"
        );

        let body = MessagesRequest {
            model: &request.model,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            system: &request.system,
            messages: vec![Message { role: "user", content: &request.user }],
        };

        let response = self
            .client
            .post(ANTHROPIC_MESSAGES_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "Anthropic", error = %e, "request failed");
                QaError::Generation {
                    provider: "Anthropic".into(),
                    message: format!("request failed: {e}"),
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            error!(provider = "Anthropic", %status, "API error");
            return Err(QaError::Generation {
                provider: "Anthropic".into(),
                message: format!("API returned {status}: {detail}"),
            });
        }

        let messages_response: MessagesResponse = response.json().await.map_err(|e| {
            error!(provider = "Anthropic", error = %e, "failed to parse response");
            QaError::Generation {
                provider: "Anthropic".into(),
                message: format!("failed to parse response: {e}"),
            }
        })?;

        let text: String =
            messages_response.content.into_iter().map(|block| block.text).collect();
        if text.is_empty() {
            return Err(QaError::Generation {
                provider: "Anthropic".into(),
                message: "API returned no text content".into(),
            });
        }

        Ok(Generation {
            text,
            usage: TokenUsage {
                input_tokens: messages_response.usage.input_tokens,
                output_tokens: messages_response.usage.output_tokens,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_api_key_is_rejected() {
        assert!(AnthropicGenerator::new("").is_err());
    }
}
