//! Content-addressed cache keys for plugin instances.
//!
//! Centralising key construction guarantees that identical
//! `(name, configuration)` pairs always map to the same instance,
//! irrespective of how the caller ordered its configuration keys.

use serde_json::Value;
use sha2::{Digest, Sha256};

/// Number of hex characters kept from the digest. Short enough to read in
/// logs, long enough that collisions are negligible for a process-local
/// cache. Not used for security.
const KEY_LENGTH: usize = 16;

/// Compute a deterministic cache key for a plugin instance from its
/// normalized name and configuration.
///
/// Object keys are sorted recursively before hashing, so two deep-equal
/// configurations produce the same key regardless of insertion order.
pub fn instance_key(name: &str, config: &Value) -> String {
    let payload = serde_json::json!({
        "config": canonicalize(config),
        "name": name,
    });

    let mut hasher = Sha256::new();
    // Value serialization cannot fail: object keys are strings by
    // construction and Value holds no non-finite numbers.
    hasher.update(payload.to_string().as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..KEY_LENGTH].to_string()
}

/// Recursively rebuild a JSON value with all object keys sorted. Array
/// order is preserved; elements are canonicalized in place.
fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = serde_json::Map::new();
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_length() {
        let key = instance_key("telegram", &json!({"chat_id": "123"}));
        assert_eq!(key.len(), KEY_LENGTH);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_key_order_independence() {
        let mut a = serde_json::Map::new();
        a.insert("token".into(), json!("t"));
        a.insert("chat_id".into(), json!("123"));
        a.insert("nested".into(), json!({"b": 2, "a": 1}));

        let mut b = serde_json::Map::new();
        b.insert("nested".into(), json!({"a": 1, "b": 2}));
        b.insert("chat_id".into(), json!("123"));
        b.insert("token".into(), json!("t"));

        assert_eq!(
            instance_key("telegram", &Value::Object(a)),
            instance_key("telegram", &Value::Object(b))
        );
    }

    #[test]
    fn test_key_value_sensitivity() {
        let base = json!({"chat_id": "123", "token": "t"});
        let changed = json!({"chat_id": "124", "token": "t"});
        assert_ne!(
            instance_key("telegram", &base),
            instance_key("telegram", &changed)
        );
    }

    #[test]
    fn test_key_name_sensitivity() {
        let config = json!({});
        assert_ne!(
            instance_key("telegram", &config),
            instance_key("notion", &config)
        );
    }

    #[test]
    fn test_array_order_is_significant() {
        assert_ne!(
            instance_key("rss", &json!({"feeds": ["a", "b"]})),
            instance_key("rss", &json!({"feeds": ["b", "a"]}))
        );
    }

    #[test]
    fn test_nested_arrays_canonicalized_elementwise() {
        let a = json!({"rules": [{"x": 1, "y": 2}]});
        let b = json!({"rules": [{"y": 2, "x": 1}]});
        assert_eq!(instance_key("ai", &a), instance_key("ai", &b));
    }
}
