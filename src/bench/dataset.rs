//! Synthetic benchmark dataset with exact ground truth.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;
use vecbench_adapters::memory::cosine_similarity;
use vecbench_adapters::Payload;

/// Vectors to load, queries to issue, and their payloads.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub dimensions: usize,
    pub vectors: Vec<Vec<f32>>,
    pub payloads: Vec<Payload>,
    pub queries: Vec<Vec<f32>>,
}

impl Dataset {
    /// Generate uniform random vectors in `[-1, 1)`.
    ///
    /// The same seed always yields the same dataset.
    pub fn generate(count: usize, queries: usize, dimensions: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);

        let vectors: Vec<Vec<f32>> = (0..count)
            .map(|_| random_vector(&mut rng, dimensions))
            .collect();
        let queries: Vec<Vec<f32>> = (0..queries)
            .map(|_| random_vector(&mut rng, dimensions))
            .collect();
        let payloads = (0..count).map(payload_for).collect();

        Self {
            dimensions,
            vectors,
            payloads,
            queries,
        }
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Whether the dataset holds no vectors.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Exact top-`k` record ids for every query, by cosine similarity.
    ///
    /// Ids match what the adapters derive from the payloads (`row_id`).
    /// Ties keep insertion order.
    pub fn ground_truth(&self, k: usize) -> Vec<Vec<String>> {
        self.queries
            .iter()
            .map(|query| {
                let mut scored: Vec<(usize, f32)> = self
                    .vectors
                    .iter()
                    .enumerate()
                    .map(|(i, v)| (i, cosine_similarity(query, v)))
                    .collect();
                scored.sort_by(|a, b| b.1.total_cmp(&a.1));
                scored.iter().take(k).map(|(i, _)| i.to_string()).collect()
            })
            .collect()
    }
}

fn random_vector(rng: &mut StdRng, dimensions: usize) -> Vec<f32> {
    (0..dimensions).map(|_| rng.gen::<f32>() * 2.0 - 1.0).collect()
}

fn payload_for(row: usize) -> Payload {
    let mut payload = Payload::new();
    payload.insert("row_id".to_string(), json!(row));
    payload.insert("track".to_string(), json!(format!("track-{}", row)));
    payload.insert("text".to_string(), json!(format!("Track: track-{}", row)));
    payload
}
