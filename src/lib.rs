//! # vecbench
//!
//! A benchmarking harness for vector databases.
//!
//! The crate runs a fixed workload against one or more databases through the
//! [`VectorDb`](vecbench_adapters::VectorDb) adapters, records the results as
//! a JSON document, and renders that document as PNG charts.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                           vecbench                           │
//! │  ┌─────────┐    ┌──────────┐    ┌──────────┐    ┌─────────┐  │
//! │  │ config  │───▶│  bench   │───▶│ results  │───▶│ report  │  │
//! │  │ (TOML,  │    │ (runner) │    │  .json   │    │ (PNG)   │  │
//! │  │  env)   │    └────┬─────┘    └──────────┘    └─────────┘  │
//! │  └─────────┘         │                                       │
//! │                      ▼                                       │
//! │               ┌─────────────┐                                │
//! │               │  adapters   │◀── MemoryAdapter | ChromaAdapter│
//! │               └─────────────┘                                │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`config`]**: layered run settings ([`BenchConfig`])
//! - **[`bench`]**: synthetic dataset, timing and recall scoring
//! - **[`report`]**: aggregation across databases and chart rendering
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Benchmark the configured databases and plot the results
//! vecbench run --config bench.toml --output results.json --plot charts/run1
//!
//! # Plot an existing results file
//! vecbench plot results.json charts/run1
//! ```
//!
//! ### As a library
//!
//! ```
//! use vecbench::report::summarize;
//! use vecbench_types::ResultsDocument;
//!
//! let doc = ResultsDocument::from_json_str(r#"{
//!     "memory": {
//!         "k=10": { "ingest_time_sec": 0.5, "avg_qps": 900.0,
//!                   "avg_query_latency_sec": 0.001, "avg_recall_at_10": 1.0 }
//!     }
//! }"#).unwrap();
//!
//! let summary = summarize(&doc).unwrap();
//! assert_eq!(summary.k_values, vec![10]);
//! ```

pub mod bench;
pub mod config;
pub mod report;

pub use bench::{run_all, Dataset};
pub use config::{BenchConfig, DatabaseConfig};
pub use report::{load_metrics, render_report, BenchmarkSummary, ChartPaths, ChartTheme};
