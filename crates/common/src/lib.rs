//! Papershelf Common Library
//!
//! Shared code for the Papershelf server and ingestion tooling including:
//! - Configuration management
//! - Error types and handling
//! - Catalog store (entities, repository, schema bootstrap)
//! - Library service used by the API
//! - Metrics and tracing setup

pub mod config;
pub mod db;
pub mod errors;
pub mod metrics;
pub mod services;
pub mod telemetry;

// Re-export commonly used types
pub use config::AppConfig;
pub use db::{DbPool, Repository};
pub use errors::{AppError, Result};
pub use services::LibraryService;

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
