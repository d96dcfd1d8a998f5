//! Module resolver — turns a registered remote into a constructible module.

use std::sync::Arc;

use tracing::debug;

use curator_core::error::PluginError;
use curator_core::result::PluginResult;
use curator_core::traits::{ModuleLoader, PluginConstructor};

use crate::remotes::RemoteRegistry;

/// Resolves remote registry entries through the injected dynamic module
/// loader, updating entry status as it goes.
pub struct ModuleResolver {
    /// The dynamic loading capability.
    loader: Arc<dyn ModuleLoader>,
}

impl ModuleResolver {
    /// Creates a new resolver over the given loader.
    pub fn new(loader: Arc<dyn ModuleLoader>) -> Self {
        Self { loader }
    }

    /// Resolves the named remote to its constructible module.
    ///
    /// The complete current locator set is announced to the loader before
    /// every fetch, so a source added after others were already loaded is
    /// never silently missing from the loading subsystem.
    ///
    /// On success the entry becomes `Active` with the constructor stored;
    /// on failure it becomes `Failed` with the error recorded, and the
    /// entry survives for a future attempt.
    pub async fn resolve(
        &self,
        registry: &RemoteRegistry,
        name: &str,
    ) -> PluginResult<Arc<dyn PluginConstructor>> {
        let url = registry.url(name).await.unwrap_or_default();
        registry.mark_loading(name).await;

        match self.fetch(registry, name, &url).await {
            Ok(constructor) => {
                registry.mark_active(name, constructor.clone()).await;
                debug!(
                    remote = %name,
                    known_remotes = registry.len().await,
                    "Resolved remote module"
                );
                Ok(constructor)
            }
            Err(err) => {
                registry.mark_failed(name, err.to_string()).await;
                Err(err)
            }
        }
    }

    async fn fetch(
        &self,
        registry: &RemoteRegistry,
        name: &str,
        url: &str,
    ) -> PluginResult<Arc<dyn PluginConstructor>> {
        let locators = registry.locators().await;
        self.loader.announce(&locators).await.map_err(|e| {
            PluginError::RemoteResolution {
                name: name.to_string(),
                url: url.to_string(),
                source: Some(Box::new(e)),
            }
        })?;

        match self.loader.fetch(name).await {
            Ok(Some(constructor)) => Ok(constructor),
            Ok(None) => Err(PluginError::RemoteResolution {
                name: name.to_string(),
                url: url.to_string(),
                source: Some("plugin module not found".into()),
            }),
            Err(e) => Err(PluginError::RemoteResolution {
                name: name.to_string(),
                url: url.to_string(),
                source: Some(Box::new(e)),
            }),
        }
    }
}

impl std::fmt::Debug for ModuleResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleResolver").finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use curator_core::traits::PluginInstance;
    use curator_core::types::RemoteLocator;

    use crate::remotes::RemoteStatus;

    struct NeverConstructs;

    impl PluginConstructor for NeverConstructs {
        fn construct(&self) -> PluginInstance {
            unreachable!("resolver tests never construct")
        }
    }

    /// Loader that records announced locator sets and serves one module.
    struct RecordingLoader {
        announced: Mutex<Vec<Vec<String>>>,
        fetches: AtomicUsize,
        known: String,
    }

    impl RecordingLoader {
        fn new(known: &str) -> Self {
            Self {
                announced: Mutex::new(Vec::new()),
                fetches: AtomicUsize::new(0),
                known: known.to_string(),
            }
        }
    }

    #[async_trait]
    impl ModuleLoader for RecordingLoader {
        async fn announce(&self, remotes: &[RemoteLocator]) -> PluginResult<()> {
            let mut names: Vec<String> = remotes.iter().map(|r| r.name.clone()).collect();
            names.sort();
            self.announced.lock().unwrap().push(names);
            Ok(())
        }

        async fn fetch(&self, name: &str) -> PluginResult<Option<Arc<dyn PluginConstructor>>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if name == self.known {
                Ok(Some(Arc::new(NeverConstructs)))
            } else {
                Ok(None)
            }
        }
    }

    #[tokio::test]
    async fn test_resolve_announces_full_locator_set() {
        let loader = Arc::new(RecordingLoader::new("late"));
        let resolver = ModuleResolver::new(loader.clone());
        let registry = RemoteRegistry::new();

        registry.ensure("early", "https://e/entry.js").await;
        registry.ensure("late", "https://l/entry.js").await;

        resolver.resolve(&registry, "late").await.unwrap();

        let announced = loader.announced.lock().unwrap();
        assert_eq!(announced.len(), 1);
        assert_eq!(announced[0], vec!["early", "late"]);
    }

    #[tokio::test]
    async fn test_resolve_success_updates_entry() {
        let loader = Arc::new(RecordingLoader::new("telegram"));
        let resolver = ModuleResolver::new(loader);
        let registry = RemoteRegistry::new();
        registry.ensure("telegram", "https://t/entry.js").await;

        resolver.resolve(&registry, "telegram").await.unwrap();

        assert_eq!(
            registry.status("telegram").await,
            Some(RemoteStatus::Active)
        );
        assert!(registry.constructor_for("telegram").await.is_some());
        assert!(registry.last_error("telegram").await.is_none());
    }

    #[tokio::test]
    async fn test_missing_module_marks_failed_but_entry_survives() {
        let loader = Arc::new(RecordingLoader::new("other"));
        let resolver = ModuleResolver::new(loader);
        let registry = RemoteRegistry::new();
        registry.ensure("missing", "https://m/entry.js").await;

        let err = resolver.resolve(&registry, "missing").await.unwrap_err();
        assert!(matches!(err, PluginError::RemoteResolution { .. }));

        assert_eq!(registry.status("missing").await, Some(RemoteStatus::Failed));
        assert!(registry.last_error("missing").await.is_some());
        // Not evicted: a later resolve can retry.
        assert_eq!(registry.len().await, 1);
    }
}
