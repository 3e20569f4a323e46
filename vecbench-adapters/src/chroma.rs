//! Chroma adapter using the v2 HTTP API.
//!
//! Chroma serves its API on the port the server was started with (the
//! benchmark compose setup maps it to 8001). Collections live under a tenant
//! and a database; the defaults match a fresh Chroma install.
//!
//! ## Calls Issued
//!
//! - `GET  /api/v2/heartbeat` on connect
//! - `DELETE`/`POST .../collections` on setup and teardown
//! - `GET  .../collections/{name}` to resolve the collection id
//! - `POST .../collections/{id}/upsert` (falling back to `/add`) per batch
//! - `POST .../collections/{id}/query` per search
//!
//! ## Example
//!
//! ```rust,no_run
//! use vecbench_adapters::chroma::ChromaAdapter;
//! use vecbench_adapters::VectorDb;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = ChromaAdapter::builder()
//!         .endpoint("http://localhost:8001")
//!         .collection("music_embeddings")
//!         .batch_size(500)
//!         .connect()
//!         .await?;
//!
//!     db.setup(384).await?;
//!     for hit in db.search(&vec![0.0; 384], 10).await? {
//!         println!("{} {:.3}", hit.id, hit.score);
//!     }
//!     db.teardown().await;
//!
//!     Ok(())
//! }
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::record::{record_document, record_id, scalar_metadata};
use crate::{check_lengths, AdapterError, Payload, SearchHit, VectorDb};

/// Default number of records sent per upsert request.
pub const DEFAULT_BATCH_SIZE: usize = 1000;

/// Chroma adapter holding one benchmark collection.
#[derive(Debug, Clone)]
pub struct ChromaAdapter {
    client: Client,
    name: String,
    endpoint: String,
    tenant: String,
    database: String,
    collection: String,
    batch_size: usize,
}

impl ChromaAdapter {
    /// Create a new builder for configuring the adapter.
    pub fn builder() -> ChromaAdapterBuilder {
        ChromaAdapterBuilder::default()
    }

    /// Name of the benchmark collection.
    pub fn collection_name(&self) -> &str {
        &self.collection
    }

    /// Check the server is reachable and speaks the v2 API.
    ///
    /// Returns the server's nanosecond heartbeat.
    pub async fn heartbeat(&self) -> Result<u64, AdapterError> {
        let url = format!("{}/api/v2/heartbeat", self.endpoint);
        let response = ensure_success(self.client.get(&url).send().await?).await?;

        let body: BTreeMap<String, Value> = response
            .json()
            .await
            .map_err(|e| AdapterError::Parse(e.to_string()))?;

        body.get("nanosecond heartbeat")
            .and_then(Value::as_u64)
            .ok_or_else(|| AdapterError::Connection("Chroma v2 heartbeat failed".to_string()))
    }

    fn collections_url(&self) -> String {
        format!(
            "{}/api/v2/tenants/{}/databases/{}/collections",
            self.endpoint,
            urlencoded(&self.tenant),
            urlencoded(&self.database)
        )
    }

    fn collection_url(&self, name_or_id: &str) -> String {
        format!("{}/{}", self.collections_url(), urlencoded(name_or_id))
    }

    async fn delete_collection(&self) -> Result<(), AdapterError> {
        let response = self
            .client
            .delete(self.collection_url(&self.collection))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(AdapterError::NotFound(self.collection.clone()));
        }
        ensure_success(response).await?;
        Ok(())
    }

    async fn create_collection(&self) -> Result<CollectionInfo, AdapterError> {
        let body = json!({
            "name": self.collection,
            "metadata": { "hnsw:space": "cosine" },
            "get_or_create": false,
        });

        let response = self
            .client
            .post(self.collections_url())
            .json(&body)
            .send()
            .await?;

        ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| AdapterError::Parse(e.to_string()))
    }

    async fn fetch_collection(&self) -> Result<CollectionInfo, AdapterError> {
        let response = self
            .client
            .get(self.collection_url(&self.collection))
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(AdapterError::NotFound(self.collection.clone()));
        }

        ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| AdapterError::Parse(e.to_string()))
    }

    async fn post_records(
        &self,
        collection_id: &str,
        operation: &str,
        batch: &RecordBatch<'_>,
    ) -> Result<(), AdapterError> {
        let url = format!("{}/{}", self.collection_url(collection_id), operation);
        let response = self.client.post(&url).json(batch).send().await?;
        ensure_success(response).await?;
        Ok(())
    }
}

#[async_trait]
impl VectorDb for ChromaAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    async fn setup(&self, _dim: usize) -> Result<(), AdapterError> {
        // Chroma infers dimensionality from the first insert.
        if let Err(e) = self.delete_collection().await {
            debug!(collection = %self.collection, error = %e, "no collection to drop");
        }

        let info = self.create_collection().await?;
        info!(collection = %info.name, id = %info.id, "created Chroma collection");
        Ok(())
    }

    async fn upsert(&self, vectors: &[Vec<f32>], payloads: &[Payload]) -> Result<(), AdapterError> {
        check_lengths(vectors, payloads)?;

        let collection = self.fetch_collection().await?;

        let ids: Vec<String> = payloads
            .iter()
            .enumerate()
            .map(|(i, p)| record_id(p, i))
            .collect();
        let documents: Vec<String> = payloads.iter().map(record_document).collect();
        let metadatas: Vec<Option<Payload>> = payloads
            .iter()
            .map(|p| Some(scalar_metadata(p)).filter(|m| !m.is_empty()))
            .collect();

        let batch_size = self.batch_size.max(1);
        for start in (0..vectors.len()).step_by(batch_size) {
            let end = (start + batch_size).min(vectors.len());
            let batch = RecordBatch {
                ids: &ids[start..end],
                embeddings: &vectors[start..end],
                documents: &documents[start..end],
                metadatas: &metadatas[start..end],
            };

            if let Err(e) = self.post_records(&collection.id, "upsert", &batch).await {
                warn!(
                    collection = %self.collection,
                    start,
                    end,
                    error = %e,
                    "upsert failed, retrying batch with add"
                );
                self.post_records(&collection.id, "add", &batch).await?;
            }
        }

        debug!(collection = %self.collection, records = vectors.len(), "upserted records");
        Ok(())
    }

    async fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<SearchHit>, AdapterError> {
        let collection = self.fetch_collection().await?;

        let body = json!({
            "query_embeddings": [query],
            "n_results": top_k,
            "include": ["documents", "metadatas", "distances"],
        });

        let url = format!("{}/query", self.collection_url(&collection.id));
        let response = self.client.post(&url).json(&body).send().await?;

        let result: QueryResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| AdapterError::Parse(e.to_string()))?;

        Ok(result.into_hits())
    }

    async fn teardown(&self) {
        if let Err(e) = self.delete_collection().await {
            warn!(collection = %self.collection, error = %e, "error during Chroma teardown");
        }
    }
}

/// Builder for ChromaAdapter.
#[derive(Debug, Default)]
pub struct ChromaAdapterBuilder {
    name: Option<String>,
    endpoint: Option<String>,
    tenant: Option<String>,
    database: Option<String>,
    collection: Option<String>,
    batch_size: Option<usize>,
    timeout: Option<Duration>,
}

impl ChromaAdapterBuilder {
    /// Set the name used in results documents (default: "chroma").
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the API endpoint (e.g., "http://localhost:8001").
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set the tenant (default: "default_tenant").
    pub fn tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    /// Set the database (default: "default_database").
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Set the benchmark collection name (default: "music_embeddings").
    pub fn collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = Some(collection.into());
        self
    }

    /// Set the number of records per upsert request (default: 1000).
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the adapter without contacting the server.
    pub fn build(self) -> Result<ChromaAdapter, AdapterError> {
        let timeout = self.timeout.unwrap_or(Duration::from_secs(10));

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AdapterError::Connection(format!("failed to build HTTP client: {}", e)))?;

        let endpoint = self
            .endpoint
            .unwrap_or_else(|| "http://localhost:8001".to_string());

        Ok(ChromaAdapter {
            client,
            name: self.name.unwrap_or_else(|| "chroma".to_string()),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            tenant: self.tenant.unwrap_or_else(|| "default_tenant".to_string()),
            database: self
                .database
                .unwrap_or_else(|| "default_database".to_string()),
            collection: self
                .collection
                .unwrap_or_else(|| "music_embeddings".to_string()),
            batch_size: self.batch_size.unwrap_or(DEFAULT_BATCH_SIZE),
        })
    }

    /// Build the adapter and verify the server answers a heartbeat.
    pub async fn connect(self) -> Result<ChromaAdapter, AdapterError> {
        let adapter = self.build()?;
        let beat = adapter.heartbeat().await?;
        debug!(endpoint = %adapter.endpoint, heartbeat = beat, "connected to Chroma");
        Ok(adapter)
    }
}

// URL encode a string for use in paths
fn urlencoded(s: &str) -> String {
    s.replace('%', "%25").replace('/', "%2F").replace(' ', "%20")
}

/// Turn an error status into an `AdapterError`, keeping the response body.
async fn ensure_success(response: Response) -> Result<Response, AdapterError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AdapterError::Http(format!(
        "API returned status {}: {}",
        status,
        body.trim()
    )))
}

/// Collection description returned by the collections endpoints.
#[derive(Debug, Deserialize)]
struct CollectionInfo {
    id: String,
    name: String,
}

/// Body of an upsert or add request.
#[derive(Debug, Serialize)]
struct RecordBatch<'a> {
    ids: &'a [String],
    embeddings: &'a [Vec<f32>],
    documents: &'a [String],
    metadatas: &'a [Option<Payload>],
}

/// Query results. Every field holds one inner list per query embedding.
#[derive(Debug, Default, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    ids: Vec<Vec<String>>,
    #[serde(default)]
    distances: Option<Vec<Vec<Option<f32>>>>,
    #[serde(default)]
    metadatas: Option<Vec<Vec<Option<Payload>>>>,
}

impl QueryResponse {
    /// Hits for the first (only) query embedding.
    fn into_hits(self) -> Vec<SearchHit> {
        let Some(ids) = self.ids.into_iter().next() else {
            return Vec::new();
        };
        let distances = self
            .distances
            .and_then(|d| d.into_iter().next())
            .unwrap_or_default();
        let mut metadatas = self
            .metadatas
            .and_then(|m| m.into_iter().next())
            .unwrap_or_default();

        ids.into_iter()
            .enumerate()
            .map(|(i, id)| {
                let distance = distances.get(i).copied().flatten().unwrap_or(1.0);
                let payload = metadatas
                    .get_mut(i)
                    .and_then(Option::take)
                    .unwrap_or_default();
                SearchHit::new(id, 1.0 - distance).with_payload(payload)
            })
            .collect()
    }
}
