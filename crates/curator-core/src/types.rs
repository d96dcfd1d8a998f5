//! Shared types for the Curator plugin host.

use serde::{Deserialize, Serialize};

use crate::error::PluginError;

/// The kind of a plugin, declared by the caller when requesting an
/// instance and enforced against the loaded object at construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginKind {
    /// Maps content to content.
    Transformer,
    /// Publishes content to an external channel.
    Distributor,
}

impl std::fmt::Display for PluginKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transformer => write!(f, "transformer"),
            Self::Distributor => write!(f, "distributor"),
        }
    }
}

/// The remote source location of a plugin, as returned by the plugin
/// directory collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginSource {
    /// URL-like locator where the plugin's code is hosted.
    pub url: String,
}

impl PluginSource {
    /// Create a new plugin source.
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Validate that the source location is usable.
    ///
    /// The locator must be non-empty and carry a scheme (`scheme://...`).
    pub fn validate(&self) -> Result<(), PluginError> {
        if self.url.is_empty() {
            return Err(PluginError::config("plugin source URL is empty"));
        }
        let has_scheme = self
            .url
            .split_once("://")
            .is_some_and(|(scheme, rest)| !scheme.is_empty() && !rest.is_empty());
        if !has_scheme {
            return Err(PluginError::config(format!(
                "plugin source URL '{}' is not a valid URL",
                self.url
            )));
        }
        Ok(())
    }
}

/// A named, URL-addressed plugin source as announced to the dynamic
/// module loader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteLocator {
    /// Normalized remote name.
    pub name: String,
    /// URL of the remote entry point.
    pub entry: String,
}

impl RemoteLocator {
    /// Create a new remote locator.
    pub fn new(name: impl Into<String>, entry: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entry: entry.into(),
        }
    }
}

/// Normalize a plugin package name into a remote name.
///
/// Lowercases, strips the scope marker `@`, and replaces the scope
/// separator `/` with `_`:
///
/// - `@curator/telegram` → `curator_telegram`
/// - `@org/pkg-name` → `org_pkg-name`
/// - `simple-package` → `simple-package`
pub fn normalized_remote_name(package_name: &str) -> String {
    package_name
        .to_lowercase()
        .replacen('@', "", 1)
        .replacen('/', "_", 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_scoped_name() {
        assert_eq!(
            normalized_remote_name("@curator/telegram"),
            "curator_telegram"
        );
        assert_eq!(normalized_remote_name("@Org/Pkg-Name"), "org_pkg-name");
    }

    #[test]
    fn test_normalized_plain_name() {
        assert_eq!(normalized_remote_name("simple-package"), "simple-package");
    }

    #[test]
    fn test_source_validation() {
        assert!(PluginSource::new("https://plugins.example.com/entry.js")
            .validate()
            .is_ok());
        assert!(PluginSource::new("").validate().is_err());
        assert!(PluginSource::new("not-a-url").validate().is_err());
        assert!(PluginSource::new("://missing-scheme").validate().is_err());
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(PluginKind::Transformer.to_string(), "transformer");
        assert_eq!(PluginKind::Distributor.to_string(), "distributor");
    }
}
