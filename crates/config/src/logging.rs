//! Logging configuration for the postgen CLI
//!
//! Terminal output stays quiet by default (warnings only) so that a
//! successful hook run prints nothing. Optional file logging always
//! records at debug level.

use crate::Result;
use postgen_core::Error;
use std::path::Path;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the logging system
///
/// # Arguments
/// * `verbose` - Enable debug level logging on the terminal
/// * `log_file` - Optional path to append logs to
///
/// # Examples
/// ```ignore
/// // Quiet mode, warnings only
/// init(false, None)?;
///
/// // Verbose mode with debug level, also written to a file
/// init(true, Some(Path::new("postgen.log")))?;
/// ```
pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if verbose { "debug" } else { "warn" };

    // Allows overriding with RUST_LOG env var
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(format!(
            "postgen={level},postgen_engine={level},postgen_config={level}"
        ))
        .map_err(|e| Error::Message(format!("Invalid log filter: {e}")))?,
    };

    let stdout_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .without_time()
        .compact()
        .with_ansi(true)
        .with_filter(env_filter);

    // An unopenable log file drops only the file layer; reported once logging is up
    let mut file_error = None;
    let file_layer = match log_file.map(open_log_file).transpose() {
        Ok(Some(file)) => {
            let file_filter = EnvFilter::try_new("debug")
                .map_err(|e| Error::Message(format!("Invalid log filter: {e}")))?;

            Some(
                fmt::layer()
                    .with_writer(file)
                    .with_ansi(false)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .pretty()
                    .with_filter(file_filter),
            )
        }
        Ok(None) => None,
        Err(e) => {
            file_error = Some(e);
            None
        }
    };

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| Error::Message(format!("Failed to initialize logging: {e}")))?;

    if let (Some(e), Some(path)) = (file_error, log_file) {
        tracing::warn!(path = %path.display(), error = %e, "Cannot open log file, logging to terminal only");
    }

    Ok(())
}

fn open_log_file(path: &Path) -> std::io::Result<std::fs::File> {
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
}
