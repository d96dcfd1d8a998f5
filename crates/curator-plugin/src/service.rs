//! Plugin lifecycle manager — cache-or-construct orchestration for all
//! plugin instances.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use curator_core::config::plugins::PluginsConfig;
use curator_core::error::{PluginError, ShutdownFailure};
use curator_core::result::PluginResult;
use curator_core::traits::{ModuleLoader, PluginDirectory, PluginInstance};
use curator_core::types::{PluginKind, normalized_remote_name};

use crate::instances::{InstanceCache, InstanceRecord};
use crate::keys::instance_key;
use crate::remotes::{RemoteRegistry, RemoteStatus};
use crate::resolver::ModuleResolver;
use crate::retry::{RetryDecision, RetryPolicy};

/// Manages the complete lifecycle of plugins: remote resolution, instance
/// construction and initialization with retry, per-configuration caching,
/// auth-failure circuit breaking, and graceful shutdown fan-out.
///
/// All state is owned by the service instance; multiple services coexist
/// without interference.
pub struct PluginService {
    /// Maps logical plugin names to remote source locations.
    directory: Arc<dyn PluginDirectory>,
    /// Resolves registered remotes through the dynamic module loader.
    resolver: ModuleResolver,
    /// Known remote plugin sources.
    remotes: RemoteRegistry,
    /// Live plugin instances and auth-failure accounting.
    instances: InstanceCache,
    /// Per-key in-flight construction locks, so concurrent requests for
    /// one uncached key await a single construction.
    loads: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    /// Delays between initialization retries.
    policy: RetryPolicy,
    /// Consecutive auth failures after which a key is disabled.
    max_auth_failures: u32,
}

impl PluginService {
    /// Creates a new plugin service.
    pub fn new(
        config: &PluginsConfig,
        directory: Arc<dyn PluginDirectory>,
        loader: Arc<dyn ModuleLoader>,
    ) -> Self {
        Self {
            directory,
            resolver: ModuleResolver::new(loader),
            remotes: RemoteRegistry::new(),
            instances: InstanceCache::new(),
            loads: Mutex::new(HashMap::new()),
            policy: RetryPolicy::from_millis(&config.retry_delays_ms),
            max_auth_failures: config.max_auth_failures,
        }
    }

    /// Gets or creates a plugin instance for the given name, kind, and
    /// configuration.
    ///
    /// Identical `(name, configuration)` pairs share one cached instance.
    /// A new instance is constructed and initialized with retry/backoff;
    /// repeated initialization failures open the circuit breaker for the
    /// key until the cache is cleared.
    pub async fn get_plugin<C: Serialize>(
        &self,
        name: &str,
        kind: PluginKind,
        config: &C,
    ) -> PluginResult<Arc<PluginInstance>> {
        let source = self
            .directory
            .lookup(name)
            .ok_or_else(|| PluginError::UnknownPlugin {
                name: name.to_string(),
            })?;
        source.validate()?;

        // Configuration problems surface before any network interaction.
        let config = serde_json::to_value(config)?;

        let normalized = normalized_remote_name(name);
        let key = instance_key(&normalized, &config);

        if let Some(instance) = self.cached(name, &key).await? {
            return Ok(instance);
        }

        // Serialize concurrent constructions of the same key; whoever
        // loses the race finds the winner's instance on the re-check.
        let lock = self.key_lock(&key).await;
        let _guard = lock.lock().await;
        if let Some(instance) = self.cached(name, &key).await? {
            return Ok(instance);
        }

        self.remotes.ensure(&normalized, &source.url).await;
        self.construct_with_retries(name, &normalized, kind, &key, &config)
            .await
    }

    /// Shuts down every cached instance, then clears all state.
    ///
    /// Shutdown failures are collected, never short-circuited: each
    /// remaining instance is still attempted, and a single aggregate
    /// error reports every failure afterwards.
    pub async fn cleanup(&self) -> PluginResult<()> {
        let mut failures = Vec::new();

        for (key, record) in self.instances.drain().await {
            if let Err(e) = record.instance.shutdown().await {
                error!(key = %key, remote = %record.remote_name, error = %e, "Plugin shutdown failed");
                failures.push(ShutdownFailure {
                    key,
                    message: e.to_string(),
                });
            }
        }

        self.remotes.clear().await;
        self.loads.lock().await.clear();

        if failures.is_empty() {
            Ok(())
        } else {
            Err(PluginError::Shutdown { failures })
        }
    }

    /// Drops all cached instances and failure counters without touching
    /// resolved remotes. Re-arms any open breaker.
    pub async fn clear_instances(&self) {
        self.instances.clear().await;
        self.loads.lock().await.clear();
    }

    /// Drops every instance originating from the plugin's remote and
    /// evicts the remote entry, forcing a fresh resolve on next use.
    /// Returns the number of instances dropped.
    pub async fn reload_plugin(&self, name: &str) -> usize {
        let normalized = normalized_remote_name(name);
        let dropped = self.instances.remove_by_remote(&normalized).await;
        self.remotes.remove(&normalized).await;
        info!(plugin = %name, dropped, "Plugin reloaded");
        dropped
    }

    /// Returns the number of live cached instances.
    pub async fn instance_count(&self) -> usize {
        self.instances.len().await
    }

    /// Breaker check followed by cache lookup for a key.
    async fn cached(&self, name: &str, key: &str) -> PluginResult<Option<Arc<PluginInstance>>> {
        let failures = self.instances.failures(key).await;
        if failures >= self.max_auth_failures {
            return Err(PluginError::Disabled {
                name: name.to_string(),
                failures,
            });
        }
        Ok(self.instances.get(key).await.map(|record| record.instance))
    }

    /// Returns the in-flight construction lock for a key.
    async fn key_lock(&self, key: &str) -> Arc<Mutex<()>> {
        let mut loads = self.loads.lock().await;
        loads.entry(key.to_string()).or_default().clone()
    }

    /// Construct and initialize a new instance, retrying per policy.
    async fn construct_with_retries(
        &self,
        name: &str,
        normalized: &str,
        kind: PluginKind,
        key: &str,
        config: &Value,
    ) -> PluginResult<Arc<PluginInstance>> {
        let mut attempt = 0;
        loop {
            match self.try_construct(name, normalized, kind, config).await {
                Ok(instance) => {
                    self.instances.reset_failures(key).await;
                    self.instances
                        .put(
                            key,
                            InstanceRecord {
                                instance: instance.clone(),
                                source_config: config.clone(),
                                loaded_at: Utc::now(),
                                auth_failures: 0,
                                remote_name: normalized.to_string(),
                            },
                        )
                        .await;
                    debug!(plugin = %name, key = %key, "Plugin instance cached");
                    return Ok(instance);
                }
                Err(err) => {
                    // Only initialization failures count toward the
                    // breaker; a flaky module fetch must not permanently
                    // disable a plugin.
                    if matches!(&err, PluginError::Execution { .. }) {
                        let failures = self.instances.record_failure(key).await;
                        if failures >= self.max_auth_failures {
                            error!(plugin = %name, failures, "Plugin disabled due to auth failures");
                            return Err(PluginError::Disabled {
                                name: name.to_string(),
                                failures,
                            });
                        }
                    }

                    match self.policy.decide(attempt) {
                        RetryDecision::RetryAfter(delay) => {
                            warn!(
                                plugin = %name,
                                attempt,
                                delay_ms = delay.as_millis() as u64,
                                error = %err,
                                "Plugin initialization failed, retrying"
                            );
                            tokio::time::sleep(delay).await;
                            attempt += 1;
                        }
                        RetryDecision::GiveUp => {
                            error!(plugin = %name, error = %err, "Plugin initialization failed");
                            return Err(err);
                        }
                    }
                }
            }
        }
    }

    /// One resolve → construct → initialize → validate pass.
    async fn try_construct(
        &self,
        name: &str,
        normalized: &str,
        kind: PluginKind,
        config: &Value,
    ) -> PluginResult<Arc<PluginInstance>> {
        let constructor = match self.remotes.constructor_for(normalized).await {
            Some(constructor) => constructor,
            None => self.resolver.resolve(&self.remotes, normalized).await?,
        };

        if self.remotes.status(normalized).await == Some(RemoteStatus::Failed) {
            let message = self
                .remotes
                .last_error(normalized)
                .await
                .unwrap_or_else(|| "module loading failed".to_string());
            return Err(PluginError::RemoteResolution {
                name: normalized.to_string(),
                url: self.remotes.url(normalized).await.unwrap_or_default(),
                source: Some(message.into()),
            });
        }

        let mut instance = constructor.construct();
        instance.initialize(config).await.map_err(|e| {
            PluginError::execution_with_source(name, "initialize", e)
        })?;

        if instance.kind() != kind {
            // The instance already initialized; give its shutdown hook a
            // chance to release resources before it is dropped.
            if let Err(e) = instance.shutdown().await {
                warn!(plugin = %name, error = %e, "Rejected plugin instance failed to shutdown");
            }
            return Err(PluginError::Interface {
                name: name.to_string(),
                expected: kind,
            });
        }

        Ok(Arc::new(instance))
    }
}

impl std::fmt::Debug for PluginService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginService")
            .field("policy", &self.policy)
            .field("max_auth_failures", &self.max_auth_failures)
            .finish()
    }
}
