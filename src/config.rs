//! Configuration for the question-answering pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{QaError, Result};

/// Configuration parameters for the pipeline.
///
/// Defaults match the reference deployment: 1000-character chunks with a
/// 200-character overlap, five retrieved chunks per question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QaConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
    /// Default number of chunks retrieved per question.
    pub top_k: usize,
    /// Model identifier passed to the generation capability.
    pub model: String,
    /// Maximum output tokens for a generation call.
    pub max_tokens: u32,
    /// Sampling temperature for generation.
    pub temperature: f32,
}

impl Default for QaConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            top_k: 5,
            model: "claude-3-haiku-20240307".to_string(),
            max_tokens: 4096,
            temperature: 0.7,
        }
    }
}

impl QaConfig {
    /// Create a new builder for constructing a [`QaConfig`].
    pub fn builder() -> QaConfigBuilder {
        QaConfigBuilder::default()
    }

    /// Build a config from environment variables, starting from defaults.
    ///
    /// Recognized variables: `QA_CHUNK_SIZE`, `QA_CHUNK_OVERLAP`, `QA_TOP_K`,
    /// `QA_MODEL`, `QA_MAX_TOKENS`, `QA_TEMPERATURE`. Unset variables keep
    /// their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::Config`] if a variable is set but unparseable, or
    /// if the resulting combination fails validation.
    pub fn from_env() -> Result<Self> {
        let mut builder = Self::builder();
        if let Some(v) = env_parse::<usize>("QA_CHUNK_SIZE")? {
            builder = builder.chunk_size(v);
        }
        if let Some(v) = env_parse::<usize>("QA_CHUNK_OVERLAP")? {
            builder = builder.chunk_overlap(v);
        }
        if let Some(v) = env_parse::<usize>("QA_TOP_K")? {
            builder = builder.top_k(v);
        }
        if let Ok(model) = std::env::var("QA_MODEL") {
            builder = builder.model(model);
        }
        if let Some(v) = env_parse::<u32>("QA_MAX_TOKENS")? {
            builder = builder.max_tokens(v);
        }
        if let Some(v) = env_parse::<f32>("QA_TEMPERATURE")? {
            builder = builder.temperature(v);
        }
        builder.build()
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| QaError::Config(format!("{name} has invalid value '{raw}'"))),
        Err(_) => Ok(None),
    }
}

/// Builder for constructing a validated [`QaConfig`].
#[derive(Debug, Clone, Default)]
pub struct QaConfigBuilder {
    config: QaConfig,
}

impl QaConfigBuilder {
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

    /// Set the default number of chunks retrieved per question.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the generation model identifier.
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    /// Set the maximum output tokens for generation.
    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.config.max_tokens = max_tokens;
        self
    }

    /// Set the sampling temperature for generation.
    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.temperature = temperature;
        self
    }

    /// Build the [`QaConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::Config`] if:
    /// - `chunk_size == 0`
    /// - `chunk_overlap >= chunk_size`
    /// - `top_k == 0`
    /// - `model` is empty
    pub fn build(self) -> Result<QaConfig> {
        if self.config.chunk_size == 0 {
            return Err(QaError::Config("chunk_size must be greater than zero".to_string()));
        }
        if self.config.chunk_overlap >= self.config.chunk_size {
            return Err(QaError::Config(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.config.chunk_overlap, self.config.chunk_size
            )));
        }
        if self.config.top_k == 0 {
            return Err(QaError::Config("top_k must be greater than zero".to_string()));
        }
        if self.config.model.is_empty() {
            return Err(QaError::Config("model must not be empty".to_string()));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_pass_validation() {
        let config = QaConfig::builder().build().unwrap();
        assert_eq!(config, QaConfig::default());
    }

    #[test]
    fn overlap_must_stay_below_chunk_size() {
        let err = QaConfig::builder().chunk_size(100).chunk_overlap(100).build().unwrap_err();
        assert!(matches!(err, QaError::Config(_)));
    }

    #[test]
    fn zero_top_k_is_rejected() {
        let err = QaConfig::builder().top_k(0).build().unwrap_err();
        assert!(matches!(err, QaError::Config(_)));
    }
}
