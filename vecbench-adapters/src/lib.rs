//! # vecbench-adapters
//!
//! Adapters that drive a vector database through the operations a benchmark
//! needs: create a collection, load vectors, search, and clean up.
//!
//! Every adapter implements [`VectorDb`]. All indexing, distance computation
//! and persistence happen inside the database; adapters only translate calls.
//!
//! ## Supported Databases
//!
//! - **Chroma** (`chroma` feature, on by default) - talks to the Chroma v2
//!   HTTP API
//! - **Memory** - exact brute-force search in process, used as a recall
//!   baseline and for tests
//!
//! ## Quick Start (Chroma)
//!
//! ```rust,no_run
//! use vecbench_adapters::chroma::ChromaAdapter;
//! use vecbench_adapters::{Payload, VectorDb};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = ChromaAdapter::builder()
//!         .endpoint("http://localhost:8001")
//!         .collection("music_embeddings")
//!         .connect()
//!         .await?;
//!
//!     db.setup(3).await?;
//!     db.upsert(&[vec![0.1, 0.2, 0.3]], &[Payload::new()]).await?;
//!     let hits = db.search(&[0.1, 0.2, 0.3], 5).await?;
//!     println!("Found {} hits", hits.len());
//!     db.teardown().await;
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;

pub mod error;
pub mod memory;
pub mod record;

#[cfg(feature = "chroma")]
pub mod chroma;

pub use error::AdapterError;
pub use memory::MemoryAdapter;

// Re-export types for convenience
pub use vecbench_types::{Payload, SearchHit};

/// Operations a benchmark performs against a vector database.
///
/// Implementations hold a single benchmark collection. Calls are issued
/// sequentially by the runner.
#[async_trait]
pub trait VectorDb: Send + Sync {
    /// Short name used as the database key in results documents.
    fn name(&self) -> &str;

    /// Recreate the benchmark collection for vectors of `dim` dimensions.
    ///
    /// An existing collection is dropped first; failure to drop it is ignored.
    async fn setup(&self, dim: usize) -> Result<(), AdapterError>;

    /// Insert or replace records. `vectors` and `payloads` are parallel slices.
    async fn upsert(&self, vectors: &[Vec<f32>], payloads: &[Payload]) -> Result<(), AdapterError>;

    /// Return up to `top_k` nearest records for `query`, closest first.
    async fn search(&self, query: &[f32], top_k: usize) -> Result<Vec<SearchHit>, AdapterError>;

    /// Drop the benchmark collection. Failures are logged, not returned.
    async fn teardown(&self);

    /// Release client resources.
    async fn close(&self) -> Result<(), AdapterError> {
        Ok(())
    }
}

/// Reject upserts whose slices are not parallel.
pub(crate) fn check_lengths(vectors: &[Vec<f32>], payloads: &[Payload]) -> Result<(), AdapterError> {
    if vectors.len() != payloads.len() {
        return Err(AdapterError::LengthMismatch {
            vectors: vectors.len(),
            payloads: payloads.len(),
        });
    }
    Ok(())
}
