//! Vector index trait: persistence and nearest-neighbor search for records.

use async_trait::async_trait;

use crate::document::{IndexedRecord, RetrievedChunk};
use crate::error::Result;

/// A storage backend holding `(id, text, vector, metadata)` records and
/// supporting nearest-neighbor search by vector distance.
///
/// Results are ranked by ascending distance (most similar first). The
/// relevance scores derived downstream assume a cosine-like metric with
/// distances roughly bounded in `[0, 2]`; implementations using a different
/// metric should document how their distances map onto that range.
///
/// Implementations need no internal coordination beyond their own
/// consistency: the pipeline performs no concurrent writes, though
/// concurrent reads may race a [`reset`](VectorIndex::reset) (a documented
/// hazard of the reset-then-insert indexing sequence).
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Insert or replace records. Records must carry their embeddings.
    async fn upsert(&self, records: &[IndexedRecord]) -> Result<()>;

    /// Return up to `top_k` records nearest to `embedding`, ascending by
    /// distance. Fewer than `top_k` results is not an error; an empty
    /// collection yields an empty sequence.
    async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<RetrievedChunk>>;

    /// Number of records currently held.
    async fn count(&self) -> Result<usize>;

    /// Delete all records and start a fresh, empty collection generation
    /// with a non-overlapping id namespace. Idempotent on an empty
    /// collection.
    async fn reset(&self) -> Result<()>;
}
