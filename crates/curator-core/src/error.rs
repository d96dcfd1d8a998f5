//! Unified plugin error taxonomy for the Curator host.
//!
//! All host components map their failures into [`PluginError`] for
//! consistent propagation through the ? operator. Callers always see one
//! taxonomy regardless of which stage of the plugin lifecycle failed.

use thiserror::Error;

use crate::types::PluginKind;

/// Boxed error type carried as an underlying cause.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A single instance that failed to shut down cleanly during cleanup.
#[derive(Debug, Clone)]
pub struct ShutdownFailure {
    /// Cache key of the failed instance.
    pub key: String,
    /// The shutdown error message.
    pub message: String,
}

impl std::fmt::Display for ShutdownFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.key, self.message)
    }
}

/// The unified error type used throughout the Curator plugin host.
#[derive(Debug, Error)]
pub enum PluginError {
    /// The requested plugin name is not present in the plugin directory.
    #[error("plugin '{name}' not found in the plugin directory")]
    UnknownPlugin {
        /// The logical plugin name as requested by the caller.
        name: String,
    },

    /// The plugin configuration could not be canonically serialized, or a
    /// plugin source location is invalid.
    #[error("invalid plugin configuration: {message}")]
    Config {
        /// Description of what made the configuration unusable.
        message: String,
    },

    /// The remote module could not be fetched or contained no
    /// constructible plugin.
    #[error("failed to resolve remote module '{name}' from {url}")]
    RemoteResolution {
        /// Normalized remote name.
        name: String,
        /// The remote entry URL.
        url: String,
        /// Underlying loader failure, when available.
        #[source]
        source: Option<BoxError>,
    },

    /// The loaded plugin is not of the kind the caller requested.
    #[error("plugin '{name}' does not implement the {expected} interface")]
    Interface {
        /// The logical plugin name.
        name: String,
        /// The kind the caller asked for.
        expected: PluginKind,
    },

    /// The auth-failure circuit breaker is open for this plugin
    /// configuration. Terminal until the instance cache is cleared.
    #[error("plugin '{name}' disabled after {failures} auth failures")]
    Disabled {
        /// The logical plugin name.
        name: String,
        /// The failure count that tripped the breaker.
        failures: u32,
    },

    /// A plugin operation (`initialize`, `transform`, `distribute`) failed.
    #[error("plugin '{name}' failed during {operation}")]
    Execution {
        /// The logical plugin name.
        name: String,
        /// The operation that failed.
        operation: String,
        /// Underlying plugin failure, when available.
        #[source]
        source: Option<BoxError>,
    },

    /// One or more instances failed to shut down during cleanup. Every
    /// shutdown was still attempted; this aggregates the failures.
    #[error("{} plugin instance(s) failed to shutdown properly", failures.len())]
    Shutdown {
        /// The individual shutdown failures, by cache key.
        failures: Vec<ShutdownFailure>,
    },

    /// Catch-all for failures that fit no other variant. Plugin
    /// implementations raise this from their lifecycle hooks when a more
    /// specific variant does not apply; the host surfaces it unchanged,
    /// never constructing it itself.
    #[error("plugin '{name}' failed: {message}")]
    Failed {
        /// The logical plugin name.
        name: String,
        /// Description of the last captured failure.
        message: String,
        /// Underlying cause, when available.
        #[source]
        source: Option<BoxError>,
    },
}

impl PluginError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an execution error for a named plugin operation.
    pub fn execution(name: impl Into<String>, operation: impl Into<String>) -> Self {
        Self::Execution {
            name: name.into(),
            operation: operation.into(),
            source: None,
        }
    }

    /// Create an execution error with an underlying cause.
    pub fn execution_with_source(
        name: impl Into<String>,
        operation: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Execution {
            name: name.into(),
            operation: operation.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Wrap an arbitrary failure for a named plugin. Intended for plugin
    /// implementations; host code maps failures into a specific variant.
    pub fn failed(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            name: name.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Whether this error is the open-breaker case, which is surfaced
    /// as-is and never wrapped.
    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Disabled { .. })
    }
}

impl From<serde_json::Error> for PluginError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config {
            message: format!("configuration is not JSON-serializable: {err}"),
        }
    }
}
