//! Result caching.
//!
//! Model calls dominate the cost of a run, so extraction and verification
//! results are cached under deterministic composite keys. The store is a
//! trait; the in-tree implementation is in-memory and safe to share across
//! concurrent batch workers.

use dashmap::DashMap;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Key/value store for pipeline results.
pub trait CacheStore: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn put(&self, key: &str, value: Value);
}

/// Deterministic composite cache key: `kind:hex(sha256(parts))`.
///
/// Parts are joined with a separator that cannot occur in text, so distinct
/// part lists never collide.
pub fn cache_key(kind: &str, parts: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_bytes());
        hasher.update([0x1f]);
    }
    format!("{kind}:{}", hex::encode(hasher.finalize()))
}

/// Concurrent in-memory cache store.
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CacheStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn put(&self, key: &str, value: Value) {
        self.entries.insert(key.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_deterministic_and_distinct() {
        let a = cache_key("verify", &["claim text", "3"]);
        let b = cache_key("verify", &["claim text", "3"]);
        let c = cache_key("verify", &["claim text", "4"]);
        let d = cache_key("claims", &["claim text", "3"]);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_ne!(a, d);
        assert!(a.starts_with("verify:"));
    }

    #[test]
    fn joined_parts_do_not_collide() {
        let a = cache_key("k", &["ab", "c"]);
        let b = cache_key("k", &["a", "bc"]);
        assert_ne!(a, b);
    }

    #[test]
    fn memory_store_round_trip() {
        let store = MemoryStore::new();
        assert!(store.get("missing").is_none());

        store.put("key", serde_json::json!({"n": 1}));
        assert_eq!(store.get("key").unwrap()["n"], 1);
        assert_eq!(store.len(), 1);
    }
}
