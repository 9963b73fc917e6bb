//! Application state module
//!
//! Defines shared state accessible across all request handlers.

use std::sync::Arc;

use fixity_core::{MemoryStore, Registry};

use crate::config::Config;

/// Application state containing shared resources.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Registry services over the configured store
    pub registry: Registry,
    /// Page size used when a listing request omits `limit`
    pub default_page_limit: i64,
    /// Per-file size ceiling in bytes
    pub max_file_bytes: u64,
}

impl AppState {
    /// Build state from an already-opened registry.
    pub fn new(registry: Registry, config: &Config) -> Self {
        Self {
            registry: registry.with_max_file_bytes(config.max_file_bytes()),
            default_page_limit: config.default_page_limit,
            max_file_bytes: config.max_file_bytes(),
        }
    }

    /// State backed by a fresh in-memory store.
    pub fn in_memory(config: &Config) -> Self {
        Self::new(Registry::new(Arc::new(MemoryStore::new())), config)
    }
}
