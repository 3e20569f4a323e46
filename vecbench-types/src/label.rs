//! Helpers for the `k=<n>` keys and recall field names.

/// Prefix of every per-k block key.
pub const K_PREFIX: &str = "k=";

/// Format the block key for a search depth, e.g. `k=50`.
pub fn k_label(k: usize) -> String {
    format!("{}{}", K_PREFIX, k)
}

/// Parse a block key such as `k=50`.
///
/// Returns `None` for keys that are not per-k blocks, including keys with the
/// prefix but a non-numeric depth.
pub fn parse_k_label(label: &str) -> Option<usize> {
    label.strip_prefix(K_PREFIX)?.trim().parse().ok()
}

/// Name of the recall field written for a search depth, e.g. `avg_recall_at_50`.
pub fn recall_key(k: usize) -> String {
    format!("avg_recall_at_{}", k)
}
