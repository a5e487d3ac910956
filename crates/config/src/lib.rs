//! Configuration management for postgen
//!
//! This crate handles:
//! - Configuration loading (`.postgen.toml` or an explicit file)
//! - Logging initialization

pub mod config;
pub mod logging;

// Re-export error types from core
pub use postgen_core::{Error, Result};

// Re-export main types
pub use config::{
    CONFIG_FILE_NAME, Config, DEFAULT_RESOLVER_COMMAND, PermissionsConfig, ResolverConfig,
};
