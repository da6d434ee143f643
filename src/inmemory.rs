//! In-memory vector index using cosine distance.
//!
//! [`InMemoryVectorIndex`] keeps records in a `HashMap` behind a
//! `tokio::sync::RwLock`. It is the default backend for development and
//! tests; production deployments typically enable a persistent backend
//! instead.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{IndexedRecord, RetrievedChunk};
use crate::error::Result;
use crate::vectorstore::VectorIndex;

/// An in-memory [`VectorIndex`] ranking by cosine distance.
///
/// Each [`reset`](VectorIndex::reset) clears the records and bumps a
/// generation counter, so `(generation, id)` pairs never collide across
/// resets even though callers reuse sequential ids.
#[derive(Debug, Default)]
pub struct InMemoryVectorIndex {
    inner: RwLock<Collection>,
}

#[derive(Debug, Default)]
struct Collection {
    records: HashMap<String, IndexedRecord>,
    generation: u64,
}

impl InMemoryVectorIndex {
    /// Create a new empty index at generation zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current collection generation. Starts at zero and increments on
    /// every [`reset`](VectorIndex::reset).
    pub async fn generation(&self) -> u64 {
        self.inner.read().await.generation
    }
}

/// Cosine distance between two vectors: `1 - cosine_similarity`, giving a
/// range of `[0, 2]`. A zero-magnitude vector on either side yields the
/// neutral distance 1.0.
fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn upsert(&self, records: &[IndexedRecord]) -> Result<()> {
        let mut inner = self.inner.write().await;
        for record in records {
            inner.records.insert(record.id.clone(), record.clone());
        }
        Ok(())
    }

    async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<RetrievedChunk>> {
        let inner = self.inner.read().await;

        let mut ranked: Vec<RetrievedChunk> = inner
            .records
            .values()
            .map(|record| RetrievedChunk {
                text: record.text.clone(),
                distance: cosine_distance(&record.embedding, embedding),
                metadata: record.metadata.clone(),
            })
            .collect();

        ranked.sort_by(|a, b| {
            a.distance.partial_cmp(&b.distance).unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked.truncate(top_k);
        Ok(ranked)
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.inner.read().await.records.len())
    }

    async fn reset(&self) -> Result<()> {
        let mut inner = self.inner.write().await;
        inner.records.clear();
        inner.generation += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_vectors_have_zero_distance() {
        let d = cosine_distance(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0]);
        assert!(d.abs() < 1e-6);
    }

    #[test]
    fn opposite_vectors_have_distance_two() {
        let d = cosine_distance(&[1.0, 0.0], &[-1.0, 0.0]);
        assert!((d - 2.0).abs() < 1e-6);
    }

    #[test]
    fn zero_vector_gets_neutral_distance() {
        assert_eq!(cosine_distance(&[0.0, 0.0], &[1.0, 0.0]), 1.0);
    }
}
