//! Configuration management
//!
//! Every field has a default, so a generated project without a
//! `.postgen.toml` behaves exactly like one with an empty file.
//!
//! ```toml
//! strict = false
//!
//! [permissions]
//! extensions = ["sh"]
//!
//! [resolver]
//! enabled = true
//! command = "go mod tidy"
//! timeout = 0
//! env = { GOFLAGS = "-mod=mod" }
//! ```

use crate::Result;
use indexmap::IndexMap;
use postgen_core::Error;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// File looked up in the project root when no config is given explicitly
pub const CONFIG_FILE_NAME: &str = ".postgen.toml";

/// Dependency-tidy command run by default
pub const DEFAULT_RESOLVER_COMMAND: &str = "go mod tidy";

/// Permission Normalizer settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionsConfig {
    /// File extensions (without the leading dot) treated as shell scripts
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

impl PermissionsConfig {
    /// Check whether a file name carries one of the configured extensions
    ///
    /// Matching mirrors `*.sh` globbing: the name must end in `.<ext>`,
    /// compared case-sensitively. A bare `.sh` (hidden file) also matches.
    ///
    /// ```
    /// use postgen_config::PermissionsConfig;
    ///
    /// let config = PermissionsConfig::default();
    /// assert!(config.matches("run.sh"));
    /// assert!(!config.matches("run.shell"));
    /// assert!(!config.matches("RUN.SH"));
    /// ```
    pub fn matches(&self, file_name: &str) -> bool {
        self.extensions.iter().any(|ext| {
            file_name
                .strip_suffix(ext.as_str())
                .is_some_and(|stem| stem.ends_with('.'))
        })
    }
}

impl Default for PermissionsConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
        }
    }
}

fn default_extensions() -> Vec<String> {
    vec!["sh".to_string()]
}

/// Dependency Resolver Invoker settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Run the resolver at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Command line, split with shell-word rules
    #[serde(default = "default_command")]
    pub command: String,

    /// Seconds to wait before killing the resolver (0 = wait forever)
    #[serde(default)]
    pub timeout: u64,

    /// Extra environment variables, added on top of the inherited environment
    #[serde(default)]
    pub env: IndexMap<String, String>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            command: default_command(),
            timeout: 0,
            env: IndexMap::new(),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_command() -> String {
    DEFAULT_RESOLVER_COMMAND.to_string()
}

/// Postgen configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Exit non-zero when dependency resolution fails
    #[serde(default)]
    pub strict: bool,

    /// Permission Normalizer section
    #[serde(default)]
    pub permissions: PermissionsConfig,

    /// Dependency Resolver Invoker section
    #[serde(default)]
    pub resolver: ResolverConfig,
}

impl Config {
    /// Load configuration from a file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or TOML parsing fails
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            message: format!("failed to read: {e}"),
        })?;

        Self::from_toml_str(&content, path)
    }

    /// Parse configuration from a TOML string
    ///
    /// `origin` is only used in error messages.
    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config {
            path: origin.to_path_buf(),
            message: format!("failed to parse: {e}"),
        })
    }

    /// Load `.postgen.toml` from the project root, falling back to defaults
    ///
    /// A discovered file that cannot be read or parsed is logged and
    /// ignored, so a broken file never blocks the hook.
    pub fn load_from_root(root: &Path) -> Self {
        let config_path = root.join(CONFIG_FILE_NAME);
        if !config_path.is_file() {
            tracing::debug!(path = %config_path.display(), "No config file, using defaults");
            return Self::default();
        }

        tracing::debug!(path = %config_path.display(), "Loading config file");
        Self::load(&config_path).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Ignoring config file, using defaults");
            Self::default()
        })
    }

    /// Load an explicitly requested file, or discover one in the project root
    ///
    /// Only an explicit path is fatal when missing or invalid.
    ///
    /// # Errors
    ///
    /// Returns error if the explicit file cannot be read or parsed
    pub fn discover(explicit: Option<&Path>, root: &Path) -> Result<Self> {
        match explicit {
            Some(path) => Self::load(path),
            None => Ok(Self::load_from_root(root)),
        }
    }
}
