//! Convenience result type alias for the Curator plugin host.

use crate::error::PluginError;

/// A specialized `Result` type for plugin host operations.
///
/// This is defined as a convenience so that every crate does not need to
/// write `Result<T, PluginError>` explicitly.
pub type PluginResult<T> = Result<T, PluginError>;
