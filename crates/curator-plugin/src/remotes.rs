//! Remote registry — tracks known plugin sources and their load status.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use curator_core::traits::PluginConstructor;
use curator_core::types::RemoteLocator;

/// Load status of a remote plugin source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteStatus {
    /// The remote is known and usable (or not yet loaded).
    Active,
    /// A resolve is in progress.
    Loading,
    /// The last resolve attempt failed. Retried on next use, not terminal.
    Failed,
}

/// State of one remote plugin source, keyed by normalized name.
#[derive(Clone)]
pub struct RemoteEntry {
    /// The locator announced to the module loader.
    pub locator: RemoteLocator,
    /// When the module was last successfully resolved.
    pub loaded_at: Option<DateTime<Utc>>,
    /// The resolved constructible module, once loaded.
    pub constructor: Option<Arc<dyn PluginConstructor>>,
    /// Current load status.
    pub status: RemoteStatus,
    /// Message of the last resolve failure, if any.
    pub last_error: Option<String>,
}

impl std::fmt::Debug for RemoteEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteEntry")
            .field("locator", &self.locator)
            .field("loaded_at", &self.loaded_at)
            .field("resolved", &self.constructor.is_some())
            .field("status", &self.status)
            .field("last_error", &self.last_error)
            .finish()
    }
}

/// Registry of all known remote plugin sources.
///
/// One entry per normalized remote name. Entries are created on first
/// reference, mutated by the module resolver, and destroyed only on full
/// teardown or explicit plugin reload.
#[derive(Debug, Default)]
pub struct RemoteRegistry {
    /// Normalized remote name → entry.
    entries: RwLock<HashMap<String, RemoteEntry>>,
}

impl RemoteRegistry {
    /// Creates a new empty remote registry.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Ensures an entry exists for the given normalized name. A new entry
    /// starts `Active` with no resolved constructor.
    pub async fn ensure(&self, name: &str, url: &str) {
        let mut entries = self.entries.write().await;
        entries.entry(name.to_string()).or_insert_with(|| {
            debug!(remote = %name, url = %url, "Registering remote plugin source");
            RemoteEntry {
                locator: RemoteLocator::new(name, url),
                loaded_at: None,
                constructor: None,
                status: RemoteStatus::Active,
                last_error: None,
            }
        });
    }

    /// Returns the complete current locator set, used to (re)announce the
    /// dynamic loading subsystem before resolving any single entry.
    pub async fn locators(&self) -> Vec<RemoteLocator> {
        let entries = self.entries.read().await;
        entries.values().map(|e| e.locator.clone()).collect()
    }

    /// Returns the resolved constructor for a remote, if loaded.
    pub async fn constructor_for(&self, name: &str) -> Option<Arc<dyn PluginConstructor>> {
        let entries = self.entries.read().await;
        entries.get(name).and_then(|e| e.constructor.clone())
    }

    /// Returns the current status of a remote.
    pub async fn status(&self, name: &str) -> Option<RemoteStatus> {
        let entries = self.entries.read().await;
        entries.get(name).map(|e| e.status)
    }

    /// Returns the last resolve failure message of a remote.
    pub async fn last_error(&self, name: &str) -> Option<String> {
        let entries = self.entries.read().await;
        entries.get(name).and_then(|e| e.last_error.clone())
    }

    /// Returns the entry URL of a remote.
    pub async fn url(&self, name: &str) -> Option<String> {
        let entries = self.entries.read().await;
        entries.get(name).map(|e| e.locator.entry.clone())
    }

    /// Marks a remote as loading.
    pub async fn mark_loading(&self, name: &str) {
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get_mut(name) {
            entry.status = RemoteStatus::Loading;
        }
    }

    /// Stores a successfully resolved constructor: status returns to
    /// `Active`, the load time is stamped, and any previous error clears.
    pub async fn mark_active(&self, name: &str, constructor: Arc<dyn PluginConstructor>) {
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get_mut(name) {
            entry.constructor = Some(constructor);
            entry.loaded_at = Some(Utc::now());
            entry.status = RemoteStatus::Active;
            entry.last_error = None;
        }
    }

    /// Records a resolve failure. The entry survives for a future attempt.
    pub async fn mark_failed(&self, name: &str, message: impl Into<String>) {
        let mut entries = self.entries.write().await;
        if let Some(entry) = entries.get_mut(name) {
            entry.status = RemoteStatus::Failed;
            entry.last_error = Some(message.into());
        }
    }

    /// Removes a single remote, forcing a fresh resolve on next use.
    pub async fn remove(&self, name: &str) -> bool {
        let mut entries = self.entries.write().await;
        entries.remove(name).is_some()
    }

    /// Drops all entries. Used on full teardown.
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        entries.clear();
    }

    /// Returns the number of known remotes.
    pub async fn len(&self) -> usize {
        let entries = self.entries.read().await;
        entries.len()
    }

    /// Whether the registry is empty.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
