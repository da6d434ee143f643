//! Embedding provider trait for mapping text to fixed-dimension vectors.

use async_trait::async_trait;

use crate::error::Result;

/// A provider that maps text to fixed-dimension embedding vectors.
///
/// All vectors produced by one configured provider share the same dimension,
/// reported by [`dimensions`](EmbeddingProvider::dimensions) and assumed
/// stable for the lifetime of the provider. The default
/// [`embed_batch`](EmbeddingProvider::embed_batch) calls
/// [`embed`](EmbeddingProvider::embed) sequentially; backends with native
/// batching should override it — the pipeline embeds all chunks of a document
/// through a single batch call.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of inputs.
    ///
    /// Order-preserving and one-to-one: output `i` embeds input `i`.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Return the dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;
}
