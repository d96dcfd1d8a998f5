//! # curator-core
//!
//! Core crate for the Curator plugin host. Contains the plugin object
//! contract, collaborator capability traits, configuration schemas,
//! shared types, and the unified plugin error taxonomy.
//!
//! This crate has **no** internal dependencies on other Curator crates.

pub mod config;
pub mod error;
pub mod logging;
pub mod result;
pub mod traits;
pub mod types;

pub use error::PluginError;
pub use result::PluginResult;
