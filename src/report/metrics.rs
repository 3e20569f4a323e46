//! Aggregation of a results document into chartable figures.
//!
//! Databases report heterogeneous blocks: some failed outright, some were
//! measured at different sets of k. Aggregation keeps what can be compared
//! and drops the rest with a warning.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::warn;
use vecbench_types::{KRun, ResultsDocument};

/// Depth whose recall is shown in the bar chart.
pub const RECALL_K: usize = 50;

/// Figures for one database.
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseSummary {
    pub name: String,
    /// Ingest time in seconds, read from the smallest-k block.
    pub ingest_time_sec: f64,
    /// Mean of `avg_qps` over every k the database reported.
    pub avg_qps: f64,
    /// Recall@50, or the best available stand-in. NaN when none exists.
    pub recall_at_50: f64,
    /// Mean query latency in seconds for each common k, in order.
    pub latency_sec: Vec<f64>,
}

impl DatabaseSummary {
    /// Mean latency across the common k values, in milliseconds. Zero when
    /// there are no common k values.
    pub fn avg_latency_ms(&self) -> f64 {
        if self.latency_sec.is_empty() {
            return 0.0;
        }
        mean(&self.latency_sec) * 1000.0
    }
}

/// Everything the charts need.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkSummary {
    /// k values every included database reported, ascending.
    pub k_values: Vec<usize>,
    /// Included databases, in name order.
    pub databases: Vec<DatabaseSummary>,
}

impl BenchmarkSummary {
    /// Names of the included databases.
    pub fn database_names(&self) -> Vec<&str> {
        self.databases.iter().map(|d| d.name.as_str()).collect()
    }

    /// Look up a database by name.
    pub fn get(&self, name: &str) -> Option<&DatabaseSummary> {
        self.databases.iter().find(|d| d.name == name)
    }
}

/// Load a results file and aggregate it.
pub fn load_metrics(path: &Path) -> Result<BenchmarkSummary> {
    let doc = ResultsDocument::load(path)
        .with_context(|| format!("failed to load metrics from {}", path.display()))?;
    summarize(&doc)
}

/// Aggregate a results document.
///
/// Fails when no database has usable results.
pub fn summarize(doc: &ResultsDocument) -> Result<BenchmarkSummary> {
    let mut usable: Vec<(&str, BTreeMap<usize, KRun>)> = Vec::new();

    for (name, report) in doc.iter() {
        if report.is_error() {
            warn!(database = %name, "skipping {}: contains error data", name);
            continue;
        }
        let runs = report
            .runs()
            .with_context(|| format!("invalid results for {}", name))?;
        if runs.is_empty() {
            warn!(database = %name, "skipping {}: no k= entries found", name);
            continue;
        }
        usable.push((name.as_str(), runs));
    }

    if usable.is_empty() {
        bail!("No valid database results found");
    }

    let k_values = common_k_values(usable.iter().map(|(_, runs)| runs));

    let databases = usable
        .iter()
        .map(|(name, runs)| summarize_database(name, runs, &k_values))
        .collect();

    Ok(BenchmarkSummary {
        k_values,
        databases,
    })
}

/// Sorted intersection of the k values of every database.
fn common_k_values<'a>(runs: impl Iterator<Item = &'a BTreeMap<usize, KRun>>) -> Vec<usize> {
    let mut common: Option<BTreeSet<usize>> = None;
    for db_runs in runs {
        let ks: BTreeSet<usize> = db_runs.keys().copied().collect();
        common = Some(match common {
            None => ks,
            Some(acc) => acc.intersection(&ks).copied().collect(),
        });
    }
    common.unwrap_or_default().into_iter().collect()
}

fn summarize_database(
    name: &str,
    runs: &BTreeMap<usize, KRun>,
    k_values: &[usize],
) -> DatabaseSummary {
    // Ingest is repeated in every block; any one will do.
    let ingest_time_sec = runs
        .values()
        .next()
        .map(|r| r.ingest_time_sec)
        .unwrap_or(f64::NAN);

    let qps: Vec<f64> = runs.values().map(|r| r.avg_qps).collect();

    let latency_sec = k_values
        .iter()
        .filter_map(|k| runs.get(k))
        .map(|r| r.avg_query_latency_sec)
        .collect();

    DatabaseSummary {
        name: name.to_string(),
        ingest_time_sec,
        avg_qps: mean(&qps),
        recall_at_50: headline_recall(runs),
        latency_sec,
    }
}

/// Recall@50 from the `k=50` block; otherwise the first recall field of the
/// largest-k block; otherwise NaN.
fn headline_recall(runs: &BTreeMap<usize, KRun>) -> f64 {
    runs.get(&RECALL_K)
        .and_then(|r| r.recall_at(RECALL_K))
        .or_else(|| runs.values().next_back().and_then(KRun::any_recall))
        .unwrap_or(f64::NAN)
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn doc(json: &str) -> ResultsDocument {
        ResultsDocument::from_json_str(json).unwrap()
    }

    fn sample() -> ResultsDocument {
        doc(r#"{
            "_config": { "vectors": 1000 },
            "chroma": {
                "k=10": { "ingest_time_sec": 3.0, "avg_qps": 100.0,
                          "avg_query_latency_sec": 0.010, "avg_recall_at_10": 0.99 },
                "k=50": { "ingest_time_sec": 3.0, "avg_qps": 50.0,
                          "avg_query_latency_sec": 0.020, "avg_recall_at_50": 0.90 },
                "k=100": { "ingest_time_sec": 3.0, "avg_qps": 30.0,
                           "avg_query_latency_sec": 0.030, "avg_recall_at_100": 0.85 }
            },
            "qdrant": {
                "k=10": { "ingest_time_sec": 1.5, "avg_qps": 400.0,
                          "avg_query_latency_sec": 0.002, "avg_recall_at_10": 0.97 },
                "k=100": { "ingest_time_sec": 1.5, "avg_qps": 200.0,
                           "avg_query_latency_sec": 0.004, "recall_at_100": 0.80 }
            },
            "weaviate": { "error": "container failed to start" }
        }"#)
    }

    #[test]
    fn test_skips_error_databases() {
        let summary = summarize(&sample()).unwrap();
        assert_eq!(summary.database_names(), vec!["chroma", "qdrant"]);
    }

    #[test]
    fn test_common_k_values_are_intersection() {
        let summary = summarize(&sample()).unwrap();
        assert_eq!(summary.k_values, vec![10, 100]);

        let chroma = summary.get("chroma").unwrap();
        assert_eq!(chroma.latency_sec, vec![0.010, 0.030]);
        let qdrant = summary.get("qdrant").unwrap();
        assert_eq!(qdrant.latency_sec, vec![0.002, 0.004]);
    }

    #[test]
    fn test_per_database_figures() {
        let summary = summarize(&sample()).unwrap();

        let chroma = summary.get("chroma").unwrap();
        assert_eq!(chroma.ingest_time_sec, 3.0);
        assert!((chroma.avg_qps - 60.0).abs() < 1e-9);
        assert_eq!(chroma.recall_at_50, 0.90);
        assert!((chroma.avg_latency_ms() - 20.0).abs() < 1e-9);

        let qdrant = summary.get("qdrant").unwrap();
        assert_eq!(qdrant.ingest_time_sec, 1.5);
        assert!((qdrant.avg_qps - 300.0).abs() < 1e-9);
        // no k=50: falls back to the largest k's recall field
        assert_eq!(qdrant.recall_at_50, 0.80);
    }

    #[test]
    fn test_recall_is_nan_without_recall_fields() {
        let summary = summarize(&doc(r#"{
            "db": { "k=5": { "ingest_time_sec": 1.0, "avg_qps": 2.0,
                             "avg_query_latency_sec": 0.5 } }
        }"#))
        .unwrap();
        assert!(summary.databases[0].recall_at_50.is_nan());
    }

    #[test]
    fn test_disjoint_k_values_leave_empty_latency() {
        let summary = summarize(&doc(r#"{
            "a": { "k=5": { "ingest_time_sec": 1.0, "avg_qps": 2.0,
                            "avg_query_latency_sec": 0.5 } },
            "b": { "k=7": { "ingest_time_sec": 1.0, "avg_qps": 2.0,
                            "avg_query_latency_sec": 0.5 } }
        }"#))
        .unwrap();
        assert!(summary.k_values.is_empty());
        assert!(summary.databases.iter().all(|d| d.latency_sec.is_empty()));
        assert_eq!(summary.databases[0].avg_latency_ms(), 0.0);
    }

    #[test]
    fn test_database_without_k_entries_is_skipped() {
        let summary = summarize(&doc(r#"{
            "empty": { "notes": "never ran" },
            "ok": { "k=5": { "ingest_time_sec": 1.0, "avg_qps": 2.0,
                             "avg_query_latency_sec": 0.5 } }
        }"#))
        .unwrap();
        assert_eq!(summary.database_names(), vec!["ok"]);
        assert_eq!(summary.k_values, vec![5]);
    }

    #[test]
    fn test_no_valid_databases() {
        let err = summarize(&doc(r#"{
            "_config": {},
            "a": { "error": "boom" }
        }"#))
        .unwrap_err();
        assert_eq!(err.to_string(), "No valid database results found");
    }

    #[test]
    fn test_load_metrics_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", sample().to_json_pretty().unwrap()).unwrap();

        let summary = load_metrics(file.path()).unwrap();
        assert_eq!(summary.databases.len(), 2);
    }

    #[test]
    fn test_load_metrics_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid json").unwrap();

        let err = load_metrics(file.path()).unwrap_err();
        assert!(err.to_string().contains("failed to load metrics"));
    }
}
