//! Error types for the `paper-qa` crate.

use thiserror::Error;

/// Errors that can occur in the retrieval-and-answer pipeline.
#[derive(Debug, Error)]
pub enum QaError {
    /// Missing or invalid configuration. Fatal at startup, not recoverable.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A malformed request was rejected before any capability call was made.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The document to index could not be obtained or held no usable text.
    #[error("Source error: {0}")]
    Source(String),

    /// `answer` was invoked against a vector index holding zero records.
    ///
    /// This is a caller-visible "index first" signal, distinct from a
    /// populated index returning no relevant results.
    #[error("Vector index is empty; index a document before asking questions")]
    EmptyIndex,

    /// The embedding provider failed.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The vector index backend failed.
    #[error("Vector index error ({backend}): {message}")]
    VectorStore {
        /// The vector index backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// The generation capability failed.
    #[error("Generation error ({provider}): {message}")]
    Generation {
        /// The generation provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error in pipeline orchestration itself.
    #[error("Pipeline error: {0}")]
    Pipeline(String),
}

/// A convenience result type for pipeline operations.
pub type Result<T> = std::result::Result<T, QaError>;
