//! Dependency Resolver Invoker
//!
//! Runs the module's dependency-tidy command (`go mod tidy` by default)
//! in the project root. Output is captured, never streamed, and every
//! failure mode collapses into a [`ResolveOutcome`].

use postgen_config::ResolverConfig;
use postgen_core::AbsPath;
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Why dependency resolution did not succeed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveFailure {
    /// Command string is empty or cannot be split into words
    #[error("invalid resolver command: {reason}")]
    InvalidCommand { reason: String },

    /// Program is not on the search path
    #[error("command not found: {program}")]
    NotFound { program: String },

    /// Program was found but could not be started or waited on
    #[error("failed to run {program}: {reason}")]
    Launch { program: String, reason: String },

    /// Program ran and exited non-zero (or was killed by a signal)
    #[error("exited with {}", describe_exit(*code))]
    ExitStatus { code: Option<i32>, stderr: String },

    /// Program did not finish in time and was killed
    #[error("timed out after {seconds} seconds")]
    TimedOut { seconds: u64 },
}

fn describe_exit(code: Option<i32>) -> String {
    code.map_or_else(|| "no exit code (signal)".to_string(), |c| format!("status {c}"))
}

/// Result of one resolver invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveOutcome {
    /// The command exited with status 0
    Succeeded,
    /// Nothing was run (disabled by configuration or dry-run)
    Skipped,
    /// The command could not be run or failed
    Failed(ResolveFailure),
}

impl ResolveOutcome {
    /// Collapse to the success/failure signal reported to the caller
    ///
    /// `Skipped` counts as success: nothing was attempted that could fail.
    pub fn succeeded(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }

    /// The failure reason, if any
    pub fn failure(&self) -> Option<&ResolveFailure> {
        match self {
            Self::Failed(failure) => Some(failure),
            Self::Succeeded | Self::Skipped => None,
        }
    }
}

/// Best-effort runner for the dependency-tidy command
#[derive(Debug, Clone, Copy)]
pub struct ResolverInvoker<'a> {
    config: &'a ResolverConfig,
}

impl<'a> ResolverInvoker<'a> {
    /// Create an invoker for the given resolver settings
    pub fn new(config: &'a ResolverConfig) -> Self {
        Self { config }
    }

    /// Run the resolver with `root` as its working directory
    ///
    /// Blocks until the command exits, or until the configured timeout.
    #[tracing::instrument(skip(self, root), fields(root = %root, cmd = %self.config.command))]
    pub fn resolve(&self, root: &AbsPath) -> ResolveOutcome {
        if !self.config.enabled {
            tracing::debug!("Dependency resolution disabled");
            return ResolveOutcome::Skipped;
        }

        let start = std::time::Instant::now();
        match self.try_resolve(root) {
            Ok(()) => {
                tracing::debug!(
                    elapsed_ms = start.elapsed().as_millis(),
                    "Dependency resolution succeeded"
                );
                ResolveOutcome::Succeeded
            }
            Err(failure) => {
                if let ResolveFailure::ExitStatus { stderr, .. } = &failure
                    && !stderr.is_empty()
                {
                    tracing::debug!("Resolver stderr:\n{stderr}");
                }
                tracing::debug!(
                    elapsed_ms = start.elapsed().as_millis(),
                    error = %failure,
                    "Dependency resolution failed"
                );
                ResolveOutcome::Failed(failure)
            }
        }
    }

    fn try_resolve(&self, root: &AbsPath) -> Result<(), ResolveFailure> {
        let parts = shell_words::split(&self.config.command).map_err(|e| {
            ResolveFailure::InvalidCommand {
                reason: e.to_string(),
            }
        })?;

        let Some((program, args)) = parts.split_first() else {
            return Err(ResolveFailure::InvalidCommand {
                reason: "empty command".to_string(),
            });
        };

        let program_path = self.locate(program, root)?;
        tracing::debug!("Executing command: {} {:?}", program_path.display(), args);

        // Inherits parent env; both streams are captured so nothing reaches the console
        let mut expression = duct::cmd(program_path.as_path(), args)
            .dir(root.as_path())
            .stdout_capture()
            .stderr_capture()
            .unchecked();

        for (key, value) in &self.config.env {
            expression = expression.env(key, value);
        }

        let launch_failure = |e: std::io::Error| ResolveFailure::Launch {
            program: program.clone(),
            reason: e.to_string(),
        };

        let output = if self.config.timeout > 0 {
            let seconds = self.config.timeout;
            let handle = expression.start().map_err(launch_failure)?;

            match handle.wait_timeout(Duration::from_secs(seconds)) {
                Ok(Some(output)) => output.clone(),
                Ok(None) => {
                    if let Err(e) = handle.kill() {
                        tracing::warn!(error = %e, "Failed to kill timed out resolver");
                    }
                    return Err(ResolveFailure::TimedOut { seconds });
                }
                Err(e) => return Err(launch_failure(e)),
            }
        } else {
            expression.run().map_err(launch_failure)?
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            tracing::trace!("Resolver stdout:\n{}", stdout.trim_end());
        }

        if output.status.success() {
            Ok(())
        } else {
            Err(ResolveFailure::ExitStatus {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }

    /// Find the program on `PATH`, honoring a `PATH` override from config
    ///
    /// Relative paths containing a separator resolve against `root`.
    fn locate(&self, program: &str, root: &AbsPath) -> Result<PathBuf, ResolveFailure> {
        let search_path = self
            .config
            .env
            .get("PATH")
            .map(OsString::from)
            .or_else(|| std::env::var_os("PATH"));

        which::which_in(program, search_path, root.as_path()).map_err(|e| {
            tracing::debug!(program, error = %e, "Resolver program not found");
            ResolveFailure::NotFound {
                program: program.to_string(),
            }
        })
    }
}
