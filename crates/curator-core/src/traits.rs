//! The plugin object contract and collaborator capability traits.
//!
//! The host never duck-types a loaded object: a constructor hands back a
//! [`PluginInstance`] sum type, so method presence is enforced at compile
//! time and only the declared kind is checked at runtime.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::PluginError;
use crate::result::PluginResult;
use crate::types::{PluginKind, PluginSource, RemoteLocator};

/// A plugin that maps content to content.
#[async_trait]
pub trait Transformer: Send + Sync {
    /// Initialize the plugin with its caller-supplied configuration.
    /// Called exactly once, before the instance is cached or served.
    async fn initialize(&mut self, config: &Value) -> PluginResult<()>;

    /// Transform the input content.
    async fn transform(&self, input: Value) -> PluginResult<Value>;

    /// Shut down the plugin. Called during host cleanup.
    async fn shutdown(&self) -> PluginResult<()> {
        Ok(())
    }
}

/// A plugin that publishes content to an external channel.
#[async_trait]
pub trait Distributor: Send + Sync {
    /// Initialize the plugin with its caller-supplied configuration.
    /// Called exactly once, before the instance is cached or served.
    async fn initialize(&mut self, config: &Value) -> PluginResult<()>;

    /// Distribute the input content.
    async fn distribute(&self, input: Value) -> PluginResult<()>;

    /// Shut down the plugin. Called during host cleanup.
    async fn shutdown(&self) -> PluginResult<()> {
        Ok(())
    }
}

/// A live plugin object of either kind.
///
/// Invoking an operation the instance's kind does not support returns
/// [`PluginError::Interface`] instead of panicking.
pub enum PluginInstance {
    /// A transformer plugin.
    Transformer(Box<dyn Transformer>),
    /// A distributor plugin.
    Distributor(Box<dyn Distributor>),
}

impl PluginInstance {
    /// The kind of this instance.
    pub fn kind(&self) -> PluginKind {
        match self {
            Self::Transformer(_) => PluginKind::Transformer,
            Self::Distributor(_) => PluginKind::Distributor,
        }
    }

    /// Initialize the underlying plugin.
    pub async fn initialize(&mut self, config: &Value) -> PluginResult<()> {
        match self {
            Self::Transformer(plugin) => plugin.initialize(config).await,
            Self::Distributor(plugin) => plugin.initialize(config).await,
        }
    }

    /// Shut down the underlying plugin.
    pub async fn shutdown(&self) -> PluginResult<()> {
        match self {
            Self::Transformer(plugin) => plugin.shutdown().await,
            Self::Distributor(plugin) => plugin.shutdown().await,
        }
    }

    /// Transform input content. Fails with [`PluginError::Interface`] for
    /// distributor instances.
    pub async fn transform(&self, input: Value) -> PluginResult<Value> {
        match self {
            Self::Transformer(plugin) => plugin.transform(input).await,
            Self::Distributor(_) => Err(PluginError::Interface {
                name: self.kind().to_string(),
                expected: PluginKind::Transformer,
            }),
        }
    }

    /// Distribute input content. Fails with [`PluginError::Interface`] for
    /// transformer instances.
    pub async fn distribute(&self, input: Value) -> PluginResult<()> {
        match self {
            Self::Distributor(plugin) => plugin.distribute(input).await,
            Self::Transformer(_) => Err(PluginError::Interface {
                name: self.kind().to_string(),
                expected: PluginKind::Distributor,
            }),
        }
    }
}

impl std::fmt::Debug for PluginInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginInstance")
            .field("kind", &self.kind())
            .finish()
    }
}

/// A constructible plugin module, as produced by the dynamic module
/// loader for a resolved remote.
pub trait PluginConstructor: Send + Sync {
    /// Construct a fresh, uninitialized plugin instance.
    fn construct(&self) -> PluginInstance;
}

impl std::fmt::Debug for dyn PluginConstructor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginConstructor").finish()
    }
}

/// The dynamic module loading capability.
///
/// The mechanics of how plugin code physically becomes available (dynamic
/// library, subprocess, fetched bundle) live behind this trait; the host
/// only does locator bookkeeping and retry.
#[async_trait]
pub trait ModuleLoader: Send + Sync {
    /// Announce the complete current set of remote locators. Called
    /// before every fetch so a late-added source is never missed.
    async fn announce(&self, remotes: &[RemoteLocator]) -> PluginResult<()>;

    /// Fetch the constructible module for a previously announced remote.
    /// Returns `Ok(None)` when the remote exposes no plugin module.
    async fn fetch(&self, name: &str) -> PluginResult<Option<Arc<dyn PluginConstructor>>>;
}

/// Maps a logical plugin name to its remote source location.
pub trait PluginDirectory: Send + Sync {
    /// Look up the source for a plugin name, if known.
    fn lookup(&self, name: &str) -> Option<PluginSource>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    #[async_trait]
    impl Transformer for Echo {
        async fn initialize(&mut self, _config: &Value) -> PluginResult<()> {
            Ok(())
        }

        async fn transform(&self, input: Value) -> PluginResult<Value> {
            Ok(input)
        }
    }

    #[tokio::test]
    async fn test_kind_mismatch_is_interface_error() {
        let instance = PluginInstance::Transformer(Box::new(Echo));
        let err = instance.distribute(Value::Null).await.unwrap_err();
        assert!(matches!(err, PluginError::Interface { .. }));
    }

    #[tokio::test]
    async fn test_transform_passthrough() {
        let instance = PluginInstance::Transformer(Box::new(Echo));
        let out = instance
            .transform(serde_json::json!({"input": "hi"}))
            .await
            .unwrap();
        assert_eq!(out, serde_json::json!({"input": "hi"}));
    }
}
