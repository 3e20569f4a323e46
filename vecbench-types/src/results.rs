//! Results document - aggregated benchmark metrics per database and search depth.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::{k_label, parse_k_label, recall_key, TypesError};

/// The complete results file of one benchmark run.
///
/// Databases are keyed by name. The `_config` entry is kept aside and never
/// treated as a database.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultsDocument {
    /// Run parameters, free-form.
    #[serde(rename = "_config", default, skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,

    /// Per-database blocks, keyed by database name.
    #[serde(flatten)]
    pub databases: BTreeMap<String, DatabaseReport>,
}

impl ResultsDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a document from a JSON string.
    pub fn from_json_str(content: &str) -> Result<Self, TypesError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load a document from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TypesError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| TypesError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, TypesError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the document to a JSON file, replacing any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), TypesError> {
        let path = path.as_ref();
        let json = self.to_json_pretty()?;
        fs::write(path, json).map_err(|source| TypesError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Record the run parameters.
    pub fn set_config(&mut self, config: Value) {
        self.config = Some(config);
    }

    /// Record the results for one database at one search depth.
    pub fn insert_run(
        &mut self,
        database: impl Into<String>,
        k: usize,
        run: KRun,
    ) -> Result<(), TypesError> {
        let value = serde_json::to_value(run)?;
        self.databases
            .entry(database.into())
            .or_default()
            .entries
            .insert(k_label(k), value);
        Ok(())
    }

    /// Mark a database as failed. Any runs already recorded are kept, but
    /// consumers skip the whole block.
    pub fn insert_error(&mut self, database: impl Into<String>, message: impl Into<String>) {
        self.databases.entry(database.into()).or_default().error =
            Some(Value::String(message.into()));
    }

    /// Get the block for a database.
    pub fn get(&self, database: &str) -> Option<&DatabaseReport> {
        self.databases.get(database)
    }

    /// Names of all databases in the document, in key order.
    pub fn database_names(&self) -> impl Iterator<Item = &str> {
        self.databases.keys().map(String::as_str)
    }

    /// Iterate over all database blocks.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &DatabaseReport)> {
        self.databases.iter()
    }

    /// Number of databases in the document.
    pub fn len(&self) -> usize {
        self.databases.len()
    }

    /// Check if the document has no databases.
    pub fn is_empty(&self) -> bool {
        self.databases.is_empty()
    }
}

/// Everything recorded for one database.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseReport {
    /// Present when the run failed. Any value counts, including `null`.
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub error: Option<Value>,

    /// All other keys. Per-k blocks use `k=<n>` keys; anything else is
    /// carried through untouched.
    #[serde(flatten)]
    pub entries: Map<String, Value>,
}

impl DatabaseReport {
    /// Whether this database reported an error instead of results.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// The error as a display string.
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|e| match e {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    /// Search depths with a `k=<n>` block, ascending.
    pub fn k_values(&self) -> Vec<usize> {
        let mut ks: Vec<usize> = self.entries.keys().filter_map(|key| parse_k_label(key)).collect();
        ks.sort_unstable();
        ks.dedup();
        ks
    }

    /// Whether there is at least one `k=<n>` block.
    pub fn has_runs(&self) -> bool {
        self.entries.keys().any(|key| parse_k_label(key).is_some())
    }

    /// Parse every `k=<n>` block, keyed by k.
    pub fn runs(&self) -> Result<BTreeMap<usize, KRun>, TypesError> {
        let mut runs = BTreeMap::new();
        for (label, value) in &self.entries {
            let Some(k) = parse_k_label(label) else {
                continue;
            };
            let run = serde_json::from_value(value.clone()).map_err(|source| {
                TypesError::InvalidRun {
                    label: label.clone(),
                    source,
                }
            })?;
            runs.insert(k, run);
        }
        Ok(runs)
    }
}

/// Metrics for one database at one search depth.
///
/// Ingest time is the same for every k of a run; it is repeated in each
/// block so every block is self-contained.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KRun {
    /// Wall-clock seconds spent loading all vectors.
    pub ingest_time_sec: f64,

    /// Queries per second at this depth.
    pub avg_qps: f64,

    /// Mean per-query latency in seconds.
    pub avg_query_latency_sec: f64,

    /// Recall fields (`avg_recall_at_<k>`) and any other extra metrics.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl KRun {
    /// Create a run block without recall figures.
    pub fn new(ingest_time_sec: f64, avg_qps: f64, avg_query_latency_sec: f64) -> Self {
        Self {
            ingest_time_sec,
            avg_qps,
            avg_query_latency_sec,
            extra: BTreeMap::new(),
        }
    }

    /// Record recall@k under its conventional field name.
    pub fn with_recall(mut self, k: usize, recall: f64) -> Self {
        self.extra.insert(recall_key(k), Value::from(recall));
        self
    }

    /// Recall@k from the conventional field, if present and numeric.
    pub fn recall_at(&self, k: usize) -> Option<f64> {
        self.extra.get(&recall_key(k)).and_then(Value::as_f64)
    }

    /// The first field whose name mentions recall, if numeric.
    ///
    /// Fields are visited in alphabetical key order, not the order they
    /// appeared in the source JSON. Only the first such field is considered.
    pub fn any_recall(&self) -> Option<f64> {
        self.extra
            .iter()
            .find(|(key, _)| key.contains("recall"))
            .and_then(|(_, value)| value.as_f64())
    }
}

fn deserialize_present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::NamedTempFile;

    fn sample_json() -> &'static str {
        r#"{
            "_config": { "vectors": 1000 },
            "chroma": {
                "k=10": {
                    "ingest_time_sec": 2.5,
                    "avg_qps": 400,
                    "avg_query_latency_sec": 0.0025,
                    "avg_recall_at_10": 0.99
                },
                "k=50": {
                    "ingest_time_sec": 2.5,
                    "avg_qps": 300.0,
                    "avg_query_latency_sec": 0.0033,
                    "avg_recall_at_50": 0.95
                },
                "notes": "warm cache"
            },
            "broken": { "error": "connection refused" }
        }"#
    }

    #[test]
    fn test_parse_document() {
        let doc = ResultsDocument::from_json_str(sample_json()).unwrap();

        assert_eq!(doc.len(), 2);
        assert_eq!(doc.config, Some(json!({ "vectors": 1000 })));
        assert_eq!(doc.database_names().collect::<Vec<_>>(), vec!["broken", "chroma"]);

        let chroma = doc.get("chroma").unwrap();
        assert!(!chroma.is_error());
        assert_eq!(chroma.k_values(), vec![10, 50]);

        let runs = chroma.runs().unwrap();
        assert_eq!(runs[&10].avg_qps, 400.0);
        assert_eq!(runs[&50].recall_at(50), Some(0.95));
        assert_eq!(runs[&50].recall_at(10), None);
    }

    #[test]
    fn test_error_block() {
        let doc = ResultsDocument::from_json_str(sample_json()).unwrap();
        let broken = doc.get("broken").unwrap();
        assert!(broken.is_error());
        assert!(!broken.has_runs());
        assert_eq!(broken.error_message().as_deref(), Some("connection refused"));
    }

    #[test]
    fn test_null_error_still_counts() {
        let doc = ResultsDocument::from_json_str(r#"{ "db": { "error": null } }"#).unwrap();
        assert!(doc.get("db").unwrap().is_error());
    }

    #[test]
    fn test_invalid_run_block() {
        let doc = ResultsDocument::from_json_str(r#"{ "db": { "k=5": { "avg_qps": 1.0 } } }"#)
            .unwrap();
        let err = doc.get("db").unwrap().runs().unwrap_err();
        assert!(matches!(err, TypesError::InvalidRun { ref label, .. } if label == "k=5"));
    }

    #[test]
    fn test_any_recall_uses_first_recall_field() {
        let run: KRun = serde_json::from_value(json!({
            "ingest_time_sec": 1.0,
            "avg_qps": 1.0,
            "avg_query_latency_sec": 1.0,
            "p99_latency_sec": 0.5,
            "recall_at_20": 0.8
        }))
        .unwrap();
        assert_eq!(run.any_recall(), Some(0.8));
        assert_eq!(KRun::new(1.0, 1.0, 1.0).any_recall(), None);
    }

    #[test]
    fn test_any_recall_follows_key_order() {
        let run: KRun = serde_json::from_value(json!({
            "ingest_time_sec": 1.0,
            "avg_qps": 1.0,
            "avg_query_latency_sec": 1.0,
            "recall_at_100": 0.7,
            "avg_recall_at_100": 0.9
        }))
        .unwrap();
        assert_eq!(run.any_recall(), Some(0.9));
    }

    #[test]
    fn test_builder_api_and_save() {
        let mut doc = ResultsDocument::new();
        doc.set_config(json!({ "seed": 42 }));
        doc.insert_run("memory", 10, KRun::new(0.1, 1000.0, 0.001).with_recall(10, 1.0))
            .unwrap();
        doc.insert_error("chroma", "timeout");

        let file = NamedTempFile::new().unwrap();
        doc.save(file.path()).unwrap();

        let loaded = ResultsDocument::load(file.path()).unwrap();
        assert_eq!(loaded, doc);

        let raw: Value = serde_json::from_str(&std::fs::read_to_string(file.path()).unwrap())
            .unwrap();
        assert_eq!(raw["memory"]["k=10"]["avg_recall_at_10"], json!(1.0));
        assert_eq!(raw["chroma"]["error"], json!("timeout"));
        assert_eq!(raw["_config"]["seed"], json!(42));
    }

    #[test]
    fn test_load_missing_file() {
        let err = ResultsDocument::load("/nonexistent/results.json").unwrap_err();
        assert!(matches!(err, TypesError::Io { .. }));
    }
}
