//! Benchmark workload: load a synthetic dataset into each database, search
//! it at several depths, and record ingest time, QPS, latency and recall.
//!
//! ## Flow
//!
//! ```text
//! BenchConfig
//!      │
//!      ▼
//! Dataset::generate() ──▶ ground truth (exact cosine)
//!      │
//!      ▼
//! for each database:  setup ─▶ upsert (timed) ─▶ search × k × queries ─▶ teardown
//!      │
//!      ▼
//! ResultsDocument  (one `k=<n>` block per depth, or `error`)
//! ```
//!
//! ## Example
//!
//! ```
//! use vecbench::{run_all, BenchConfig, DatabaseConfig};
//!
//! # tokio_test::block_on(async {
//! let config = BenchConfig {
//!     vectors: 200,
//!     queries: 5,
//!     dimensions: 16,
//!     k_values: vec![10],
//!     databases: vec![DatabaseConfig::Memory { name: None }],
//!     ..Default::default()
//! };
//!
//! let doc = run_all(&config).await.unwrap();
//! let memory = doc.get("memory").unwrap();
//! assert!(!memory.is_error());
//! assert_eq!(memory.k_values(), vec![10]);
//! # });
//! ```

mod dataset;
mod runner;

pub use dataset::Dataset;
pub use runner::{measure_searches, open_adapter, recall, run_all, run_database, SearchStats};
