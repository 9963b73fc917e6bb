//! Fixity Server Library - REST API components for the file-integrity registry
//!
//! This library exposes the server components for use in integration tests.
//! The main binary uses these same components.

pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod multipart;
pub mod openapi;
pub mod registry_store;
pub mod routes;
pub mod state;
pub mod validation;

pub use client::ClientHost;
pub use config::Config;
pub use error::ApiError;
pub use openapi::ApiDoc;
pub use registry_store::{
    open_store, PoolSettings, PostgresRegistryStore, SqliteRegistryStore, StoreError,
};
pub use routes::{create_router, create_router_with_config};
pub use state::AppState;
