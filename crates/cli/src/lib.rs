//! Postgen CLI library
//!
//! The scaffolding tool runs `postgen` once, with no arguments, from the
//! root of the project it just generated. This library holds the argument
//! surface and the run logic so both can be tested without a subprocess.

pub mod error;
pub mod version;

use anyhow::Result;
use clap::Parser;
use postgen_config::Config;
use postgen_core::AbsPath;
use postgen_engine::{HookSummary, PostGenHook};
use std::path::PathBuf;
use std::process::ExitCode;

use error::CommandError;

/// Postgen - post-generation hook for Go project templates
#[derive(Parser, Debug)]
#[command(name = "postgen")]
#[command(about = "Finish a freshly generated project: make scripts executable and tidy dependencies")]
#[command(version, long_version = version::LONG_VERSION.as_str())]
#[command(long_about = "Finish a freshly generated project.

Runs two steps in order:
  1. Add the owner-execute bit to every *.sh file in the project
  2. Run `go mod tidy` in the project root (best effort)

If the second step fails, a single ERROR line is printed to stderr.
The exit status stays 0 unless --strict is given.")]
pub struct Cli {
    /// Root of the generated project
    #[arg(long, env = "POSTGEN_ROOT", value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Path to the config file (default: <root>/.postgen.toml if present)
    #[arg(short, long, env = "POSTGEN_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Dependency-tidy command to run instead of the configured one
    #[arg(long, value_name = "CMD")]
    pub resolver: Option<String>,

    /// Kill the resolver after this many seconds (0 = no limit)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Skip dependency resolution
    #[arg(long)]
    pub no_resolve: bool,

    /// Exit with status 1 when dependency resolution fails
    #[arg(long)]
    pub strict: bool,

    /// Show what would change without touching anything
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose output (shows DEBUG level logs)
    #[arg(short, long)]
    pub verbose: bool,

    /// Write logs to a file (useful for debugging)
    #[arg(long, env = "POSTGEN_LOG_FILE", value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Layer command-line flags over the loaded configuration
    pub fn apply_overrides(&self, config: &mut Config) {
        if let Some(command) = &self.resolver {
            config.resolver.command.clone_from(command);
        }
        if let Some(timeout) = self.timeout {
            config.resolver.timeout = timeout;
        }
        if self.no_resolve {
            config.resolver.enabled = false;
        }
        if self.strict {
            config.strict = true;
        }
    }
}

/// Run the hook and return the process exit status
pub fn run(cli: Cli) -> Result<ExitCode> {
    postgen_config::logging::init(cli.verbose, cli.log_file.as_deref())
        .map_err(CommandError::Logging)?;

    let root =
        AbsPath::existing_dir(&cli.root).map_err(|source| CommandError::InvalidRoot {
            path: cli.root.clone(),
            source,
        })?;

    let mut config =
        Config::discover(cli.config.as_deref(), root.as_path()).map_err(CommandError::Config)?;
    cli.apply_overrides(&mut config);
    tracing::debug!(?config, root = %root, "Resolved configuration");

    let summary = PostGenHook::new(&root, &config).dry_run(cli.dry_run).run();

    if cli.dry_run {
        print_dry_run(&summary, &config);
    }

    if summary.resolution_failed() {
        eprintln!("{}", diagnostic_line(&config.resolver.command));
    }

    Ok(exit_code(&summary, &config))
}

/// The single line written to stderr when dependency resolution fails
pub fn diagnostic_line(command: &str) -> String {
    format!("ERROR: {command} failed.")
}

/// Permission problems never affect the exit status; resolver failure
/// only does in strict mode.
pub fn exit_code(summary: &HookSummary, config: &Config) -> ExitCode {
    if config.strict && summary.resolution_failed() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn print_dry_run(summary: &HookSummary, config: &Config) {
    for path in &summary.permissions.updated {
        println!("would make executable: {path}");
    }
    if config.resolver.enabled {
        println!("would run: {}", config.resolver.command);
    }
}
