//! Benchmark run configuration.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! `VECBENCH_*` environment variables (`__` separates nested keys, lists are
//! comma separated).
//!
//! ```toml
//! vectors = 10000
//! queries = 100
//! dimensions = 384
//! k_values = [10, 50, 100]
//! output = "results.json"
//!
//! [[databases]]
//! kind = "memory"
//!
//! [[databases]]
//! kind = "chroma"
//! endpoint = "http://localhost:8001"
//! collection = "music_embeddings"
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File, Map};
use serde::{Deserialize, Serialize};

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "VECBENCH";

/// Parameters of one benchmark run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Number of vectors loaded into each database.
    pub vectors: usize,
    /// Number of query vectors.
    pub queries: usize,
    /// Vector dimensionality.
    pub dimensions: usize,
    /// Seed for the synthetic dataset.
    pub seed: u64,
    /// Search depths to measure.
    pub k_values: Vec<usize>,
    /// Where the results document is written.
    pub output: PathBuf,
    /// Databases under test, run in order.
    pub databases: Vec<DatabaseConfig>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            vectors: 10_000,
            queries: 100,
            dimensions: 384,
            seed: 42,
            k_values: vec![10, 50, 100],
            output: PathBuf::from("results.json"),
            databases: default_databases(),
        }
    }
}

#[cfg(feature = "chroma")]
fn default_databases() -> Vec<DatabaseConfig> {
    vec![
        DatabaseConfig::Memory { name: None },
        DatabaseConfig::Chroma(ChromaConfig::default()),
    ]
}

#[cfg(not(feature = "chroma"))]
fn default_databases() -> Vec<DatabaseConfig> {
    vec![DatabaseConfig::Memory { name: None }]
}

impl BenchConfig {
    /// Load configuration, reading `path` if given.
    ///
    /// A path that is given but missing is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Like [`BenchConfig::load`], but reads overrides from `env` instead of
    /// the process environment when given.
    fn load_with_env(path: Option<&Path>, env: Option<Map<String, String>>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let config: Self = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("k_values")
                    .try_parsing(true)
                    .source(env),
            )
            .build()
            .context("failed to read benchmark configuration")?
            .try_deserialize()
            .context("invalid benchmark configuration")?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings that cannot produce a meaningful run.
    pub fn validate(&self) -> Result<()> {
        if self.dimensions == 0 {
            bail!("dimensions must be greater than zero");
        }
        if self.vectors == 0 {
            bail!("vectors must be greater than zero");
        }
        if self.k_values.is_empty() {
            bail!("k_values must list at least one search depth");
        }
        if self.k_values.contains(&0) {
            bail!("k_values must be greater than zero");
        }
        if self.databases.is_empty() {
            bail!("no databases configured");
        }
        Ok(())
    }

    /// Search depths in ascending order without duplicates.
    pub fn sorted_k_values(&self) -> Vec<usize> {
        let mut ks = self.k_values.clone();
        ks.sort_unstable();
        ks.dedup();
        ks
    }
}

/// One database under test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DatabaseConfig {
    /// Exact in-process search, the recall reference.
    Memory {
        #[serde(default)]
        name: Option<String>,
    },
    /// Chroma over its v2 HTTP API.
    #[cfg(feature = "chroma")]
    Chroma(ChromaConfig),
}

impl DatabaseConfig {
    /// Key used for this database in the results document.
    pub fn name(&self) -> &str {
        match self {
            DatabaseConfig::Memory { name } => name.as_deref().unwrap_or("memory"),
            #[cfg(feature = "chroma")]
            DatabaseConfig::Chroma(c) => c.name.as_deref().unwrap_or("chroma"),
        }
    }
}

/// Connection settings for a Chroma server.
#[cfg(feature = "chroma")]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChromaConfig {
    pub name: Option<String>,
    pub endpoint: String,
    pub tenant: String,
    pub database: String,
    pub collection: String,
    pub batch_size: usize,
    pub timeout_secs: u64,
}

#[cfg(feature = "chroma")]
impl Default for ChromaConfig {
    fn default() -> Self {
        Self {
            name: None,
            endpoint: "http://localhost:8001".to_string(),
            tenant: "default_tenant".to_string(),
            database: "default_database".to_string(),
            collection: "music_embeddings".to_string(),
            batch_size: vecbench_adapters::chroma::DEFAULT_BATCH_SIZE,
            timeout_secs: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn write_toml(content: &str) -> tempfile::NamedTempFile {
        let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = BenchConfig::default();
        assert_eq!(config.vectors, 10_000);
        assert_eq!(config.k_values, vec![10, 50, 100]);
        assert_eq!(config.databases[0].name(), "memory");
        assert!(config.validate().is_ok());
    }

    fn env(vars: &[(&str, &str)]) -> Option<Map<String, String>> {
        Some(
            vars.iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_env_overrides_with_single_underscore_prefix() {
        let config = BenchConfig::load_with_env(
            None,
            env(&[
                ("VECBENCH_VECTORS", "5000"),
                ("VECBENCH_K_VALUES", "10,100"),
            ]),
        )
        .unwrap();

        assert_eq!(config.vectors, 5000);
        assert_eq!(config.k_values, vec![10, 100]);
        assert_eq!(config.queries, 100);
    }

    #[test]
    fn test_env_overrides_file() {
        let file = write_toml(
            r#"
            vectors = 500
            queries = 5
            "#,
        );

        let config =
            BenchConfig::load_with_env(Some(file.path()), env(&[("VECBENCH_QUERIES", "7")]))
                .unwrap();

        assert_eq!(config.vectors, 500);
        assert_eq!(config.queries, 7);
    }

    #[test]
    fn test_load_from_file() {
        let file = write_toml(
            r#"
            vectors = 500
            queries = 5
            dimensions = 8
            k_values = [50, 10, 10]

            [[databases]]
            kind = "memory"
            name = "baseline"
            "#,
        );

        let config = BenchConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.vectors, 500);
        assert_eq!(config.queries, 5);
        assert_eq!(config.dimensions, 8);
        assert_eq!(config.seed, 42);
        assert_eq!(config.sorted_k_values(), vec![10, 50]);
        assert_eq!(config.databases.len(), 1);
        assert_eq!(config.databases[0].name(), "baseline");
    }

    #[cfg(feature = "chroma")]
    #[test]
    fn test_load_chroma_entry() {
        let file = write_toml(
            r#"
            [[databases]]
            kind = "chroma"
            endpoint = "http://chroma:8000"
            batch_size = 200
            "#,
        );

        let config = BenchConfig::load(Some(file.path())).unwrap();
        match &config.databases[0] {
            DatabaseConfig::Chroma(c) => {
                assert_eq!(c.endpoint, "http://chroma:8000");
                assert_eq!(c.batch_size, 200);
                assert_eq!(c.collection, "music_embeddings");
            }
            other => panic!("unexpected database config: {:?}", other),
        }
        assert_eq!(config.databases[0].name(), "chroma");
    }

    #[test]
    fn test_missing_file_is_error() {
        assert!(BenchConfig::load(Some(Path::new("/nonexistent/bench.toml"))).is_err());
    }

    #[test]
    fn test_validate_rejects_zero_k() {
        let config = BenchConfig {
            k_values: vec![0, 10],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
