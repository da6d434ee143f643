//! # paper-qa
//!
//! Retrieval-augmented question answering over a fixed document corpus.
//!
//! The crate implements the retrieval-and-answer pipeline: a document is
//! split into overlapping sentence-aligned chunks, embedded, and stored in a
//! vector index; a question is embedded, matched against the index, and the
//! retrieved context is handed to a generation model for answer synthesis.
//! The embedding provider, vector index, and generation model are trait
//! seams with production backends behind feature flags and an in-memory
//! index for development and tests.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use paper_qa::{InMemoryVectorIndex, QaConfig, QaPipeline};
//! use paper_qa::anthropic::AnthropicGenerator;
//! use paper_qa::openai::OpenAiEmbeddings;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), paper_qa::QaError> {
//!     let pipeline = QaPipeline::builder()
//!         .config(QaConfig::from_env()?)
//!         .embedding_provider(Arc::new(OpenAiEmbeddings::from_env()?))
//!         .vector_index(Arc::new(InMemoryVectorIndex::new()))
//!         .generator(Arc::new(AnthropicGenerator::from_env()?))
//!         .build()?;
//!
//!     pipeline.index(&std::fs::read_to_string("paper.txt").unwrap()).await?;
//!     let answer = pipeline.answer("What is multi-head attention?", None).await?;
//!     println!("{}", answer.answer);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature flags
//!
//! - `anthropic` — [`AnthropicGenerator`](anthropic::AnthropicGenerator),
//!   generation via the Anthropic Messages API
//! - `openai` — [`OpenAiEmbeddings`](openai::OpenAiEmbeddings), embeddings
//!   via the OpenAI API
//! - `qdrant` — [`QdrantVectorIndex`](qdrant::QdrantVectorIndex), persistent
//!   vector search via Qdrant
//! - `full` — all of the above

mod chunking;
mod config;
mod document;
mod embedding;
mod error;
mod generation;
mod inmemory;
mod pipeline;
mod retrieve;
mod synthesize;
mod vectorstore;

#[cfg(feature = "anthropic")]
pub mod anthropic;
#[cfg(feature = "openai")]
pub mod openai;
#[cfg(feature = "qdrant")]
pub mod qdrant;

pub use chunking::{Chunker, SentenceChunker};
pub use config::{QaConfig, QaConfigBuilder};
pub use document::{
    relevance_score, Answer, Chunk, ContextSnippet, IndexSummary, IndexedRecord, RetrievedChunk,
    TokenUsage, SNIPPET_CHARS,
};
pub use embedding::EmbeddingProvider;
pub use error::{QaError, Result};
pub use generation::{Generation, GenerationRequest, Generator};
pub use inmemory::InMemoryVectorIndex;
pub use pipeline::{
    QaPipeline, QaPipelineBuilder, NO_INFORMATION_ANSWER, QUESTION_MAX_CHARS, QUESTION_MIN_CHARS,
    TOP_K_MAX,
};
pub use retrieve::Retriever;
pub use synthesize::{AnswerSynthesizer, SynthesizedAnswer};
pub use vectorstore::VectorIndex;
