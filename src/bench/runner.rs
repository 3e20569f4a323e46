//! Drives adapters through the benchmark workload and collects metrics.

use std::collections::{BTreeMap, HashSet};
use std::time::{Duration, Instant};

use anyhow::Result;
use serde_json::json;
use tracing::{info, warn};
use vecbench_adapters::{AdapterError, MemoryAdapter, VectorDb};
use vecbench_types::{KRun, ResultsDocument};

use super::Dataset;
use crate::config::{BenchConfig, DatabaseConfig};

/// Measurements for one search depth, before ingest time is attached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchStats {
    pub avg_qps: f64,
    pub avg_latency_sec: f64,
    pub avg_recall: f64,
}

/// Run the full workload against one database.
///
/// The collection is torn down and the client closed even when a
/// measurement fails.
pub async fn run_database(
    db: &dyn VectorDb,
    dataset: &Dataset,
    k_values: &[usize],
) -> Result<BTreeMap<usize, KRun>, AdapterError> {
    db.setup(dataset.dimensions).await?;

    let measured = measure(db, dataset, k_values).await;

    db.teardown().await;
    db.close().await?;

    measured
}

async fn measure(
    db: &dyn VectorDb,
    dataset: &Dataset,
    k_values: &[usize],
) -> Result<BTreeMap<usize, KRun>, AdapterError> {
    let start = Instant::now();
    db.upsert(&dataset.vectors, &dataset.payloads).await?;
    let ingest_time_sec = start.elapsed().as_secs_f64();
    info!(
        database = db.name(),
        vectors = dataset.len(),
        seconds = ingest_time_sec,
        "ingest complete"
    );

    let max_k = k_values.iter().copied().max().unwrap_or(0);
    let truth = dataset.ground_truth(max_k);

    let mut runs = BTreeMap::new();
    for &k in k_values {
        let stats = measure_searches(db, &dataset.queries, &truth, k).await?;
        info!(
            database = db.name(),
            k,
            qps = stats.avg_qps,
            recall = stats.avg_recall,
            "search pass complete"
        );
        runs.insert(
            k,
            KRun::new(ingest_time_sec, stats.avg_qps, stats.avg_latency_sec)
                .with_recall(k, stats.avg_recall),
        );
    }
    Ok(runs)
}

/// Issue every query at depth `k` and score the hits against `truth`.
pub async fn measure_searches(
    db: &dyn VectorDb,
    queries: &[Vec<f32>],
    truth: &[Vec<String>],
    k: usize,
) -> Result<SearchStats, AdapterError> {
    if queries.is_empty() {
        return Ok(SearchStats {
            avg_qps: 0.0,
            avg_latency_sec: 0.0,
            avg_recall: 0.0,
        });
    }

    let mut total = Duration::ZERO;
    let mut recall_sum = 0.0;

    for (query, expected) in queries.iter().zip(truth) {
        let start = Instant::now();
        let hits = db.search(query, k).await?;
        total += start.elapsed();

        let returned: HashSet<&str> = hits.iter().map(|h| h.id.as_str()).collect();
        recall_sum += recall(&returned, &expected[..expected.len().min(k)], k);
    }

    let n = queries.len() as f64;
    let secs = total.as_secs_f64();
    Ok(SearchStats {
        avg_qps: if secs > 0.0 { n / secs } else { 0.0 },
        avg_latency_sec: secs / n,
        avg_recall: recall_sum / n,
    })
}

/// Number of `expected` ids present in `returned`, divided by `k`.
///
/// When the collection holds fewer than `k` records the result stays below 1.
pub fn recall(returned: &HashSet<&str>, expected: &[String], k: usize) -> f64 {
    if k == 0 {
        return 0.0;
    }
    let found = expected
        .iter()
        .filter(|id| returned.contains(id.as_str()))
        .count();
    found as f64 / k as f64
}

/// Create the adapter for a configured database.
pub async fn open_adapter(config: &DatabaseConfig) -> Result<Box<dyn VectorDb>, AdapterError> {
    match config {
        DatabaseConfig::Memory { .. } => Ok(Box::new(MemoryAdapter::new(config.name()))),
        #[cfg(feature = "chroma")]
        DatabaseConfig::Chroma(c) => {
            let adapter = vecbench_adapters::chroma::ChromaAdapter::builder()
                .name(config.name())
                .endpoint(&c.endpoint)
                .tenant(&c.tenant)
                .database(&c.database)
                .collection(&c.collection)
                .batch_size(c.batch_size)
                .timeout(Duration::from_secs(c.timeout_secs))
                .connect()
                .await?;
            Ok(Box::new(adapter))
        }
    }
}

/// Run every configured database and collect a results document.
///
/// A database that fails is recorded with an `error` entry and the run moves
/// on to the next one.
pub async fn run_all(config: &BenchConfig) -> Result<ResultsDocument> {
    config.validate()?;

    info!(
        vectors = config.vectors,
        queries = config.queries,
        dimensions = config.dimensions,
        "generating dataset"
    );
    let dataset = Dataset::generate(config.vectors, config.queries, config.dimensions, config.seed);
    let k_values = config.sorted_k_values();

    let mut doc = ResultsDocument::new();
    doc.set_config(json!({
        "vectors": config.vectors,
        "queries": config.queries,
        "dimensions": config.dimensions,
        "seed": config.seed,
        "k_values": k_values,
        "databases": config.databases.iter().map(DatabaseConfig::name).collect::<Vec<_>>(),
    }));

    for db_config in &config.databases {
        let name = db_config.name();
        info!(database = name, "benchmarking");

        let outcome = match open_adapter(db_config).await {
            Ok(db) => run_database(db.as_ref(), &dataset, &k_values).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(runs) => {
                for (k, run) in runs {
                    doc.insert_run(name, k, run)?;
                }
            }
            Err(e) => {
                warn!(database = name, error = %e, "benchmark failed");
                doc.insert_error(name, e.to_string());
            }
        }
    }

    Ok(doc)
}
