//! Canonical JSON and digests for comparing validation results.
//!
//! Re-validating the same configuration pair must yield the same action set.
//! [`actions_digest`] reduces an action list to a SHA-256 hex string that is
//! independent of production order, so pipelines can compare two runs
//! without diffing reports.

use sha2::{Digest, Sha256};

use crate::domain::action::RequiredAction;

/// Recursively sort JSON object keys using UTF-16 code unit ordering (RFC 8785 §3.2.3).
fn sort_keys_utf16(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut keys: Vec<_> = map.keys().collect();
            keys.sort_by(|a, b| a.encode_utf16().cmp(b.encode_utf16()));

            let mut sorted = serde_json::Map::new();
            for key in keys {
                if let Some(v) = map.get(key) {
                    sorted.insert(key.to_string(), sort_keys_utf16(v));
                }
            }
            serde_json::Value::Object(sorted)
        }
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.iter().map(sort_keys_utf16).collect())
        }
        other => other.clone(),
    }
}

/// Compact JSON with object keys in canonical order.
pub fn canonical_json(value: &serde_json::Value) -> Result<String, serde_json::Error> {
    serde_json::to_string(&sort_keys_utf16(value))
}

/// SHA-256 hex digest of the canonical JSON of `value`.
pub fn compute_digest(value: &serde_json::Value) -> Result<String, serde_json::Error> {
    let canonical = canonical_json(value)?;
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Order-independent digest of an action list.
///
/// Actions are sorted by message, then by their canonical form, before
/// hashing; services inside each action are already kept sorted.
pub fn actions_digest(actions: &[RequiredAction]) -> Result<String, serde_json::Error> {
    let mut values = actions
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;
    values.sort_by_cached_key(|v| {
        (
            v.get("message")
                .and_then(|m| m.as_str())
                .unwrap_or_default()
                .to_string(),
            canonical_json(v).unwrap_or_default(),
        )
    });
    compute_digest(&serde_json::Value::Array(values))
}
