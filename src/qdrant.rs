//! Qdrant vector index backend.
//!
//! Provides [`QdrantVectorIndex`], a [`VectorIndex`] over the
//! [qdrant-client](https://docs.rs/qdrant-client) gRPC API. Only available
//! when the `qdrant` feature is enabled.
//!
//! # Example
//!
//! ```rust,ignore
//! use paper_qa::qdrant::QdrantVectorIndex;
//!
//! let index = QdrantVectorIndex::new("http://localhost:6334", "paper", 1536)?;
//! index.ensure_collection().await?;
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use qdrant_client::qdrant::value::Kind;
use qdrant_client::qdrant::{
    CountPointsBuilder, CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder,
    UpsertPointsBuilder, Value as QdrantValue, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use tracing::debug;

use crate::document::{IndexedRecord, RetrievedChunk};
use crate::error::{QaError, Result};
use crate::vectorstore::VectorIndex;

/// A [`VectorIndex`] backed by a single cosine-metric Qdrant collection.
///
/// Record text and metadata live in the point payload. Qdrant reports a
/// cosine similarity score; the trait's distance is derived as `1 - score`,
/// which lands in the `[0, 2]` range the relevance formula assumes.
///
/// Qdrant point ids must be integers or UUIDs, so points are numbered by
/// their position in the upsert batch and the record id is kept in the
/// payload. The pipeline always resets before bulk-inserting, which keeps
/// positional ids unambiguous.
pub struct QdrantVectorIndex {
    client: Qdrant,
    collection: String,
    dimensions: usize,
}

impl QdrantVectorIndex {
    /// Create a new index over `collection` at the given Qdrant URL.
    ///
    /// `dimensions` must match the configured embedding provider. Call
    /// [`ensure_collection`](Self::ensure_collection) once before use.
    pub fn new(url: &str, collection: impl Into<String>, dimensions: usize) -> Result<Self> {
        let client = Qdrant::from_url(url).build().map_err(map_err)?;
        Ok(Self { client, collection: collection.into(), dimensions })
    }

    /// Create the collection if it does not exist yet.
    pub async fn ensure_collection(&self) -> Result<()> {
        let collections = self.client.list_collections().await.map_err(map_err)?;
        if collections.collections.iter().any(|c| c.name == self.collection) {
            debug!(collection = %self.collection, "qdrant collection already exists");
            return Ok(());
        }
        self.create_collection().await
    }

    async fn create_collection(&self) -> Result<()> {
        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection).vectors_config(
                    VectorParamsBuilder::new(self.dimensions as u64, Distance::Cosine),
                ),
            )
            .await
            .map_err(map_err)?;

        debug!(collection = %self.collection, dimensions = self.dimensions, "created qdrant collection");
        Ok(())
    }
}

fn map_err(e: qdrant_client::QdrantError) -> QaError {
    QaError::VectorStore { backend: "qdrant".to_string(), message: e.to_string() }
}

/// Extract a string from a Qdrant payload value.
fn extract_string(value: &QdrantValue) -> Option<String> {
    match &value.kind {
        Some(Kind::StringValue(s)) => Some(s.clone()),
        _ => None,
    }
}

#[async_trait]
impl VectorIndex for QdrantVectorIndex {
    async fn upsert(&self, records: &[IndexedRecord]) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let points: Vec<PointStruct> = records
            .iter()
            .enumerate()
            .map(|(position, record)| {
                let mut payload_map = serde_json::Map::new();
                payload_map
                    .insert("id".to_string(), serde_json::Value::String(record.id.clone()));
                payload_map
                    .insert("text".to_string(), serde_json::Value::String(record.text.clone()));
                let metadata_obj: serde_json::Map<String, serde_json::Value> = record
                    .metadata
                    .iter()
                    .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
                    .collect();
                payload_map.insert("metadata".to_string(), serde_json::Value::Object(metadata_obj));

                let payload =
                    Payload::try_from(serde_json::Value::Object(payload_map)).unwrap_or_default();

                PointStruct::new(position as u64, record.embedding.clone(), payload)
            })
            .collect();

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, points).wait(true))
            .await
            .map_err(map_err)?;

        debug!(collection = %self.collection, count = records.len(), "upserted records to qdrant");
        Ok(())
    }

    async fn query(&self, embedding: &[f32], top_k: usize) -> Result<Vec<RetrievedChunk>> {
        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, embedding.to_vec(), top_k as u64)
                    .with_payload(true),
            )
            .await
            .map_err(map_err)?;

        let results = response
            .result
            .into_iter()
            .map(|scored| {
                let text =
                    scored.payload.get("text").and_then(extract_string).unwrap_or_default();

                let metadata: HashMap<String, String> = scored
                    .payload
                    .get("metadata")
                    .and_then(|v| match &v.kind {
                        Some(Kind::StructValue(s)) => Some(
                            s.fields
                                .iter()
                                .filter_map(|(k, v)| extract_string(v).map(|s| (k.clone(), s)))
                                .collect(),
                        ),
                        _ => None,
                    })
                    .unwrap_or_default();

                RetrievedChunk { text, distance: 1.0 - scored.score, metadata }
            })
            .collect();

        Ok(results)
    }

    async fn count(&self) -> Result<usize> {
        let response = self
            .client
            .count(CountPointsBuilder::new(&self.collection).exact(true))
            .await
            .map_err(map_err)?;

        Ok(response.result.map(|r| r.count as usize).unwrap_or(0))
    }

    async fn reset(&self) -> Result<()> {
        let collections = self.client.list_collections().await.map_err(map_err)?;
        if collections.collections.iter().any(|c| c.name == self.collection) {
            self.client.delete_collection(&self.collection).await.map_err(map_err)?;
        }
        self.create_collection().await?;

        debug!(collection = %self.collection, "reset qdrant collection");
        Ok(())
    }
}
