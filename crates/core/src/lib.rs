//! Core types and utilities for postgen
//!
//! This is the foundation crate that all other postgen crates depend on.
//! It provides:
//! - Path types (AbsPath, RelPath)
//! - Base error types
//!
//! This crate has no dependencies on other postgen crates.

pub mod error;
pub mod path;

pub use error::{Error, Result};
pub use path::{AbsPath, RelPath};
