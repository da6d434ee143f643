//! Query-side retrieval: embed the question, search the vector index.

use std::sync::Arc;

use tracing::{debug, info};

use crate::document::RetrievedChunk;
use crate::embedding::EmbeddingProvider;
use crate::error::Result;
use crate::vectorstore::VectorIndex;

/// Embeds a question and looks up its nearest records in the vector index.
///
/// Results pass through in the index's ranking order (ascending distance).
/// An empty result is a valid outcome, not an error; the orchestrator
/// decides how to react to it.
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
}

impl Retriever {
    /// Create a retriever over the given embedding provider and index.
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, index: Arc<dyn VectorIndex>) -> Self {
        Self { embedder, index }
    }

    /// Retrieve up to `top_k` chunks relevant to `question`.
    ///
    /// Performs exactly one embedding call and one index query. The index
    /// may return fewer than `top_k` results when it holds fewer records.
    ///
    /// # Errors
    ///
    /// Propagates [`QaError::Embedding`](crate::QaError::Embedding) and
    /// [`QaError::VectorStore`](crate::QaError::VectorStore) failures from
    /// the underlying capabilities.
    pub async fn retrieve(&self, question: &str, top_k: usize) -> Result<Vec<RetrievedChunk>> {
        debug!(question_len = question.len(), top_k, "embedding question");
        let query_embedding = self.embedder.embed(question).await?;

        let results = self.index.query(&query_embedding, top_k).await?;
        info!(result_count = results.len(), top_k, "retrieved context chunks");

        Ok(results)
    }
}
