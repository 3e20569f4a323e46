//! Search results returned by database adapters.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Arbitrary per-record metadata stored alongside a vector.
pub type Payload = Map<String, Value>;

/// A single nearest-neighbour hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Record id as stored in the database.
    pub id: String,

    /// Similarity score, higher is closer. For cosine space this is
    /// `1 - distance`.
    pub score: f32,

    /// Metadata stored with the record, empty if the database returned none.
    #[serde(default)]
    pub payload: Payload,
}

impl SearchHit {
    /// Create a hit with an empty payload.
    pub fn new(id: impl Into<String>, score: f32) -> Self {
        Self {
            id: id.into(),
            score,
            payload: Payload::new(),
        }
    }

    /// Attach a payload.
    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hit_payload_defaults_to_empty() {
        let hit: SearchHit = serde_json::from_value(json!({ "id": "7", "score": 0.5 })).unwrap();
        assert_eq!(hit.id, "7");
        assert!(hit.payload.is_empty());
    }
}
