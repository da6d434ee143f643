//! Pipeline orchestrator wiring chunking, embedding, storage, retrieval,
//! and answer synthesis.
//!
//! [`QaPipeline`] is an explicitly constructed context object: build one at
//! startup via [`QaPipeline::builder()`], pass it to whatever serves
//! requests, and drop it on shutdown to release the external clients. There
//! is no process-global state, and `top_k` is always a per-call parameter —
//! never a mutated shared setting.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use paper_qa::{InMemoryVectorIndex, QaConfig, QaPipeline};
//!
//! let pipeline = QaPipeline::builder()
//!     .config(QaConfig::default())
//!     .embedding_provider(Arc::new(embedder))
//!     .vector_index(Arc::new(InMemoryVectorIndex::new()))
//!     .generator(Arc::new(generator))
//!     .build()?;
//!
//! pipeline.index(&document_text).await?;
//! let answer = pipeline.answer("What is multi-head attention?", None).await?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, warn};

use crate::chunking::{Chunker, SentenceChunker};
use crate::config::QaConfig;
use crate::document::{
    relevance_score, snippet_text, Answer, ContextSnippet, IndexSummary, IndexedRecord,
    TokenUsage,
};
use crate::embedding::EmbeddingProvider;
use crate::error::{QaError, Result};
use crate::generation::Generator;
use crate::retrieve::Retriever;
use crate::synthesize::AnswerSynthesizer;
use crate::vectorstore::VectorIndex;

/// Minimum question length in characters, after trimming.
pub const QUESTION_MIN_CHARS: usize = 5;
/// Maximum question length in characters, after trimming.
pub const QUESTION_MAX_CHARS: usize = 500;
/// Upper bound for a per-call `top_k` override.
pub const TOP_K_MAX: usize = 10;

/// Canned answer returned when a populated index yields no relevant chunks.
pub const NO_INFORMATION_ANSWER: &str =
    "I couldn't find relevant information in the paper to answer your question.";

/// The retrieval-and-answer pipeline.
///
/// Indexing runs chunk → batch-embed → reset → bulk-insert; answering runs
/// retrieve → synthesize, with an empty-retrieval short-circuit that skips
/// the generation call entirely.
///
/// Concurrent [`answer`](QaPipeline::answer) calls are safe (read-only). An
/// [`index`](QaPipeline::index) call racing an `answer` call is not: the
/// reset step can empty the collection mid-query and produce a spurious
/// no-information answer. The pipeline accepts this window rather than
/// serializing index/query access.
pub struct QaPipeline {
    config: QaConfig,
    chunker: Arc<dyn Chunker>,
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    retriever: Retriever,
    synthesizer: AnswerSynthesizer,
}

impl std::fmt::Debug for QaPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QaPipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl QaPipeline {
    /// Create a new [`QaPipelineBuilder`].
    pub fn builder() -> QaPipelineBuilder {
        QaPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &QaConfig {
        &self.config
    }

    /// Index a document: chunk → embed (one batched call) → reset the
    /// collection → bulk-insert with sequential ids.
    ///
    /// Re-indexing replaces the previous contents wholesale. Between the
    /// reset and the insert the collection is briefly empty; see the type
    /// docs for the concurrency hazard this implies.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::Source`] when the document text is empty or cleans
    /// down to nothing, and propagates embedding and vector index failures.
    pub async fn index(&self, document_text: &str) -> Result<IndexSummary> {
        if document_text.trim().is_empty() {
            return Err(QaError::Source("document text is empty".to_string()));
        }

        let chunks = self.chunker.chunk(document_text);
        if chunks.is_empty() {
            return Err(QaError::Source(
                "document contained no usable text after cleaning".to_string(),
            ));
        }
        let chunks_created = chunks.len();
        info!(chunks_created, "chunked document");

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != chunks.len() {
            return Err(QaError::Pipeline(format!(
                "embedding provider returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let records: Vec<IndexedRecord> = chunks
            .iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| {
                let mut metadata = HashMap::new();
                metadata.insert("chunk_index".to_string(), chunk.index.to_string());
                metadata.insert(
                    "overlap_with_previous".to_string(),
                    chunk.overlap_with_previous.to_string(),
                );
                IndexedRecord {
                    id: format!("chunk_{}", chunk.index),
                    text: chunk.text.clone(),
                    embedding,
                    metadata,
                }
            })
            .collect();

        self.index.reset().await?;
        self.index.upsert(&records).await?;

        let documents_indexed = self.index.count().await?;
        info!(chunks_created, documents_indexed, "indexed document");

        Ok(IndexSummary { chunks_created, documents_indexed })
    }

    /// Answer a question against the indexed document.
    ///
    /// `top_k` overrides the configured retrieval depth for this call only.
    /// A populated index that yields no relevant chunks produces the canned
    /// no-information [`Answer`] with zero generation calls.
    ///
    /// # Errors
    ///
    /// - [`QaError::Validation`] — malformed question or out-of-range
    ///   `top_k`, rejected before any capability call.
    /// - [`QaError::EmptyIndex`] — the index holds zero records; callers
    ///   should index first. Distinct from capability failures so clients
    ///   can decide whether to index or retry.
    /// - Embedding, vector index, and generation failures are propagated.
    pub async fn answer(&self, question: &str, top_k: Option<usize>) -> Result<Answer> {
        let question_chars = question.trim().chars().count();
        if question_chars < QUESTION_MIN_CHARS {
            return Err(QaError::Validation(format!(
                "question must be at least {QUESTION_MIN_CHARS} characters"
            )));
        }
        if question_chars > QUESTION_MAX_CHARS {
            return Err(QaError::Validation(format!(
                "question must be at most {QUESTION_MAX_CHARS} characters"
            )));
        }

        let top_k = top_k.unwrap_or(self.config.top_k);
        if top_k == 0 || top_k > TOP_K_MAX {
            return Err(QaError::Validation(format!(
                "top_k must be between 1 and {TOP_K_MAX}"
            )));
        }

        if self.index.count().await? == 0 {
            return Err(QaError::EmptyIndex);
        }

        let retrieved = self.retriever.retrieve(question, top_k).await?;
        if retrieved.is_empty() {
            warn!("no relevant context found; returning canned answer");
            return Ok(Answer {
                answer: NO_INFORMATION_ANSWER.to_string(),
                model: self.config.model.clone(),
                context_chunks_used: 0,
                context: Vec::new(),
                usage: TokenUsage::default(),
            });
        }

        let synthesized = self.synthesizer.synthesize(question, &retrieved).await?;

        let context: Vec<ContextSnippet> = retrieved
            .iter()
            .map(|chunk| ContextSnippet {
                text: snippet_text(&chunk.text),
                relevance_score: relevance_score(chunk.distance),
            })
            .collect();

        info!(context_chunks_used = retrieved.len(), "question answered");
        Ok(Answer {
            answer: synthesized.text,
            model: synthesized.model,
            context_chunks_used: retrieved.len(),
            context,
            usage: synthesized.usage,
        })
    }

    /// Whether the index holds at least one record.
    pub async fn is_ready(&self) -> Result<bool> {
        Ok(self.index.count().await? > 0)
    }

    /// Number of records currently held by the vector index.
    pub async fn document_count(&self) -> Result<usize> {
        self.index.count().await
    }
}

/// Builder for constructing a [`QaPipeline`].
///
/// The embedding provider, vector index, and generator are required; the
/// chunker defaults to a [`SentenceChunker`] parameterized from the config.
#[derive(Default)]
pub struct QaPipelineBuilder {
    config: Option<QaConfig>,
    chunker: Option<Arc<dyn Chunker>>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    index: Option<Arc<dyn VectorIndex>>,
    generator: Option<Arc<dyn Generator>>,
}

impl QaPipelineBuilder {
    /// Set the pipeline configuration. Defaults to [`QaConfig::default()`].
    pub fn config(mut self, config: QaConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Replace the default sentence chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the vector index backend.
    pub fn vector_index(mut self, index: Arc<dyn VectorIndex>) -> Self {
        self.index = Some(index);
        self
    }

    /// Set the generation capability.
    pub fn generator(mut self, generator: Arc<dyn Generator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Build the [`QaPipeline`], validating that all required parts are set.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::Config`] if the embedding provider, vector index,
    /// or generator is missing.
    pub fn build(self) -> Result<QaPipeline> {
        let config = self.config.unwrap_or_default();
        let embedder = self
            .embedder
            .ok_or_else(|| QaError::Config("embedding_provider is required".to_string()))?;
        let index =
            self.index.ok_or_else(|| QaError::Config("vector_index is required".to_string()))?;
        let generator =
            self.generator.ok_or_else(|| QaError::Config("generator is required".to_string()))?;
        let chunker = self.chunker.unwrap_or_else(|| {
            Arc::new(SentenceChunker::new(config.chunk_size, config.chunk_overlap))
        });

        let retriever = Retriever::new(Arc::clone(&embedder), Arc::clone(&index));
        let synthesizer = AnswerSynthesizer::new(generator, &config);

        Ok(QaPipeline { config, chunker, embedder, index, retriever, synthesizer })
    }
}
