//! In-process adapter with exact cosine search.
//!
//! Scores every stored vector on each query, so results are the true nearest
//! neighbours. Useful as a recall reference and for exercising the harness
//! without a running database.
//!
//! ## Example
//!
//! ```rust
//! use vecbench_adapters::{MemoryAdapter, Payload, VectorDb};
//!
//! # tokio_test::block_on(async {
//! let db = MemoryAdapter::new("memory");
//! db.setup(2).await.unwrap();
//! db.upsert(&[vec![1.0, 0.0], vec![0.0, 1.0]], &[Payload::new(), Payload::new()])
//!     .await
//!     .unwrap();
//!
//! let hits = db.search(&[1.0, 0.1], 1).await.unwrap();
//! assert_eq!(hits[0].id, "0");
//! # });
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::debug;

use crate::record::{record_id, scalar_metadata};
use crate::{check_lengths, AdapterError, Payload, SearchHit, VectorDb};

/// Exact-search adapter backed by process memory.
#[derive(Debug)]
pub struct MemoryAdapter {
    name: String,
    collection: RwLock<Option<Collection>>,
}

#[derive(Debug)]
struct Collection {
    dim: usize,
    records: Vec<StoredRecord>,
    positions: HashMap<String, usize>,
}

#[derive(Debug)]
struct StoredRecord {
    id: String,
    vector: Vec<f32>,
    payload: Payload,
}

impl MemoryAdapter {
    /// Create an adapter. No collection exists until [`VectorDb::setup`].
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            collection: RwLock::new(None),
        }
    }

    /// Number of stored records, or `None` before setup.
    pub fn record_count(&self) -> Option<usize> {
        self.collection.read().as_ref().map(|c| c.records.len())
    }
}

#[async_trait]
impl VectorDb for MemoryAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn setup(&self, dim: usize) -> Result<(), AdapterError> {
        *self.collection.write() = Some(Collection {
            dim,
            records: Vec::new(),
            positions: HashMap::new(),
        });
        debug!(adapter = %self.name, dim, "created in-memory collection");
        Ok(())
    }

    async fn upsert(&self, vectors: &[Vec<f32>], payloads: &[Payload]) -> Result<(), AdapterError> {
        check_lengths(vectors, payloads)?;

        let mut guard = self.collection.write();
        let collection = guard
            .as_mut()
            .ok_or_else(|| AdapterError::NotFound(self.name.clone()))?;

        if let Some(bad) = vectors.iter().find(|v| v.len() != collection.dim) {
            return Err(AdapterError::DimensionMismatch {
                expected: collection.dim,
                actual: bad.len(),
            });
        }

        for (i, (vector, payload)) in vectors.iter().zip(payloads).enumerate() {
            let record = StoredRecord {
                id: record_id(payload, i),
                vector: vector.clone(),
                payload: scalar_metadata(payload),
            };
            match collection.positions.get(&record.id) {
                Some(&pos) => collection.records[pos] = record,
                None => {
                    collection
                        .positions
                        .insert(record.id.clone(), collection.records.len());
                    collection.records.push(record);
                }
            }
        }
        Ok(())
    }

    async fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<SearchHit>, AdapterError> {
        let guard = self.collection.read();
        let collection = guard
            .as_ref()
            .ok_or_else(|| AdapterError::NotFound(self.name.clone()))?;

        if query.len() != collection.dim {
            return Err(AdapterError::DimensionMismatch {
                expected: collection.dim,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(f32, &StoredRecord)> = collection
            .records
            .iter()
            .map(|r| (cosine_similarity(query, &r.vector), r))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        Ok(scored
            .into_iter()
            .take(top_k)
            .map(|(score, r)| SearchHit::new(r.id.clone(), score).with_payload(r.payload.clone()))
            .collect())
    }

    async fn teardown(&self) {
        *self.collection.write() = None;
    }
}

/// Cosine similarity; zero vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        0.0
    } else {
        dot / denom
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload_with_id(id: &str) -> Payload {
        let mut p = Payload::new();
        p.insert("row_id".to_string(), json!(id));
        p
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[tokio::test]
    async fn test_search_orders_by_similarity() {
        let db = MemoryAdapter::new("memory");
        db.setup(2).await.unwrap();
        db.upsert(
            &[vec![1.0, 0.0], vec![0.7, 0.7], vec![0.0, 1.0]],
            &[payload_with_id("a"), payload_with_id("b"), payload_with_id("c")],
        )
        .await
        .unwrap();

        let hits = db.search(&[0.0, 1.0], 2).await.unwrap();
        let ids: Vec<&str> = hits.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b"]);
        assert!(hits[0].score > hits[1].score);
        assert_eq!(hits[0].payload["row_id"], json!("c"));
    }

    #[tokio::test]
    async fn test_upsert_replaces_existing_id() {
        let db = MemoryAdapter::new("memory");
        db.setup(2).await.unwrap();
        db.upsert(&[vec![1.0, 0.0]], &[payload_with_id("a")]).await.unwrap();
        db.upsert(&[vec![0.0, 1.0]], &[payload_with_id("a")]).await.unwrap();

        assert_eq!(db.record_count(), Some(1));
        let hits = db.search(&[0.0, 1.0], 1).await.unwrap();
        assert!((hits[0].score - 1.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_upsert_length_mismatch() {
        let db = MemoryAdapter::new("memory");
        db.setup(2).await.unwrap();
        let err = db
            .upsert(&[vec![1.0, 0.0], vec![0.0, 1.0]], &[Payload::new()])
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AdapterError::LengthMismatch {
                vectors: 2,
                payloads: 1
            }
        ));
    }

    #[tokio::test]
    async fn test_dimension_mismatch() {
        let db = MemoryAdapter::new("memory");
        db.setup(3).await.unwrap();
        let err = db.upsert(&[vec![1.0, 0.0]], &[Payload::new()]).await.unwrap_err();
        assert!(matches!(
            err,
            AdapterError::DimensionMismatch {
                expected: 3,
                actual: 2
            }
        ));
    }

    #[tokio::test]
    async fn test_dimension_mismatch_leaves_collection_unchanged() {
        let db = MemoryAdapter::new("memory");
        db.setup(2).await.unwrap();

        let err = db
            .upsert(
                &[vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0, 1.0]],
                &[Payload::new(), Payload::new(), Payload::new()],
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AdapterError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));
        assert_eq!(db.record_count(), Some(0));
    }

    #[tokio::test]
    async fn test_teardown_drops_collection() {
        let db = MemoryAdapter::new("memory");
        db.setup(2).await.unwrap();
        db.teardown().await;

        assert_eq!(db.record_count(), None);
        let err = db.search(&[1.0, 0.0], 1).await.unwrap_err();
        assert!(matches!(err, AdapterError::NotFound(_)));
    }
}
