//! Error types for the postgen CLI
//!
//! Only setup problems are errors. Step failures are reported through
//! `HookSummary` and never reach this type.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a postgen run
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum CommandError {
    /// The project root cannot be used
    #[error("Invalid project root {}", path.display())]
    InvalidRoot {
        /// Root as given on the command line
        path: PathBuf,
        /// Why it was rejected
        #[source]
        source: postgen_core::Error,
    },

    /// Configuration could not be loaded
    #[error("Failed to load configuration")]
    Config(#[source] postgen_core::Error),

    /// Logging could not be initialized
    #[error("Failed to initialize logging")]
    Logging(#[source] postgen_core::Error),
}
