//! Instance cache — live plugin instances keyed by content-addressed keys.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::RwLock;

use curator_core::traits::PluginInstance;

/// A cached, initialized plugin instance and its bookkeeping.
#[derive(Clone)]
pub struct InstanceRecord {
    /// The live plugin instance.
    pub instance: Arc<PluginInstance>,
    /// The configuration the instance was initialized with.
    pub source_config: Value,
    /// When the instance was constructed and initialized.
    pub loaded_at: DateTime<Utc>,
    /// Consecutive auth failures recorded for this key.
    pub auth_failures: u32,
    /// Normalized name of the remote the instance came from.
    pub remote_name: String,
}

impl std::fmt::Debug for InstanceRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstanceRecord")
            .field("kind", &self.instance.kind())
            .field("loaded_at", &self.loaded_at)
            .field("auth_failures", &self.auth_failures)
            .field("remote_name", &self.remote_name)
            .finish()
    }
}

/// Cache of live plugin instances.
///
/// Unbounded by design: the surrounding system has a small, stable plugin
/// set. Callers needing bounded memory must wrap it.
///
/// Auth failures are accounted per key even before any instance exists,
/// so the circuit breaker also covers configurations whose construction
/// never succeeded.
#[derive(Debug, Default)]
pub struct InstanceCache {
    /// Cache key → live instance record.
    records: RwLock<HashMap<String, InstanceRecord>>,
    /// Cache key → consecutive auth-failure count.
    failures: RwLock<HashMap<String, u32>>,
}

impl InstanceCache {
    /// Creates a new empty instance cache.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            failures: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the record for a key, if present.
    pub async fn get(&self, key: &str) -> Option<InstanceRecord> {
        let records = self.records.read().await;
        records.get(key).cloned()
    }

    /// Stores a record under a key, replacing any previous record.
    pub async fn put(&self, key: &str, record: InstanceRecord) {
        let mut records = self.records.write().await;
        records.insert(key.to_string(), record);
    }

    /// Removes the record for a key.
    pub async fn remove(&self, key: &str) -> Option<InstanceRecord> {
        let mut records = self.records.write().await;
        records.remove(key)
    }

    /// Removes every record originating from the given remote, returning
    /// how many were dropped. Failure counters for those keys reset too.
    pub async fn remove_by_remote(&self, remote_name: &str) -> usize {
        let mut records = self.records.write().await;
        let keys: Vec<String> = records
            .iter()
            .filter(|(_, r)| r.remote_name == remote_name)
            .map(|(k, _)| k.clone())
            .collect();
        for key in &keys {
            records.remove(key);
        }
        drop(records);

        let mut failures = self.failures.write().await;
        for key in &keys {
            failures.remove(key);
        }
        keys.len()
    }

    /// Takes every record out of the cache, leaving it empty. Failure
    /// counters are cleared as well, re-arming any open breaker.
    pub async fn drain(&self) -> Vec<(String, InstanceRecord)> {
        let mut records = self.records.write().await;
        let drained: Vec<(String, InstanceRecord)> = records.drain().collect();
        drop(records);

        let mut failures = self.failures.write().await;
        failures.clear();
        drained
    }

    /// Drops all records and failure counters.
    pub async fn clear(&self) {
        let _ = self.drain().await;
    }

    /// Records one auth failure for a key and returns the new count. Any
    /// live record for the key is updated in step.
    pub async fn record_failure(&self, key: &str) -> u32 {
        let mut failures = self.failures.write().await;
        let count = failures.entry(key.to_string()).or_insert(0);
        *count += 1;
        let count = *count;
        drop(failures);

        let mut records = self.records.write().await;
        if let Some(record) = records.get_mut(key) {
            record.auth_failures = count;
        }
        count
    }

    /// Returns the consecutive auth-failure count for a key.
    pub async fn failures(&self, key: &str) -> u32 {
        let failures = self.failures.read().await;
        failures.get(key).copied().unwrap_or(0)
    }

    /// Resets the auth-failure count for a key after a successful
    /// construction.
    pub async fn reset_failures(&self, key: &str) {
        let mut failures = self.failures.write().await;
        failures.remove(key);
    }

    /// Returns the number of live instances.
    pub async fn len(&self) -> usize {
        let records = self.records.read().await;
        records.len()
    }

    /// Whether the cache holds no instances.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
