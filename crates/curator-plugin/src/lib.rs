//! # curator-plugin
//!
//! Plugin lifecycle management for the Curator content-curation pipeline.
//! Provides:
//!
//! - Content-addressed instance keys over `(name, configuration)`
//! - A remote registry tracking plugin sources and their load status
//! - A module resolver that announces the full locator set before every fetch
//! - An instance cache with per-key auth-failure accounting
//! - The [`PluginService`] orchestrator: cache-or-construct with
//!   retry/backoff, circuit breaking, and graceful shutdown fan-out

pub mod instances;
pub mod keys;
pub mod remotes;
pub mod resolver;
pub mod retry;
pub mod service;

pub use instances::{InstanceCache, InstanceRecord};
pub use keys::instance_key;
pub use remotes::{RemoteEntry, RemoteRegistry, RemoteStatus};
pub use resolver::ModuleResolver;
pub use retry::{RetryDecision, RetryPolicy};
pub use service::PluginService;
