//! # vecbench-types
//!
//! Shared types for vecbench. This crate defines the results document that a
//! benchmark run writes and the report renderer reads, plus the search hit
//! type every database adapter returns.
//!
//! ## Results Document
//!
//! The document is a flat JSON object. Every top-level key except `_config`
//! names a database. A database block either carries an `error` key (the run
//! failed) or one block per `k=<n>` search depth:
//!
//! ```json
//! {
//!   "_config": { "vectors": 10000, "dimensions": 384 },
//!   "chroma": {
//!     "k=10": {
//!       "ingest_time_sec": 4.2,
//!       "avg_qps": 512.0,
//!       "avg_query_latency_sec": 0.0019,
//!       "avg_recall_at_10": 0.97
//!     }
//!   },
//!   "qdrant": { "error": "connection refused" }
//! }
//! ```
//!
//! ## Example
//!
//! ```rust
//! use vecbench_types::{KRun, ResultsDocument};
//!
//! let mut doc = ResultsDocument::new();
//! doc.insert_run("chroma", 10, KRun::new(4.2, 512.0, 0.0019).with_recall(10, 0.97))
//!     .unwrap();
//! doc.insert_error("qdrant", "connection refused");
//!
//! let chroma = doc.get("chroma").unwrap();
//! let runs = chroma.runs().unwrap();
//! assert_eq!(runs[&10].recall_at(10), Some(0.97));
//! assert!(doc.get("qdrant").unwrap().is_error());
//! ```

mod error;
mod hit;
mod label;
mod results;

pub use error::TypesError;
pub use hit::{Payload, SearchHit};
pub use label::{k_label, parse_k_label, recall_key, K_PREFIX};
pub use results::{DatabaseReport, KRun, ResultsDocument};
