//! Build metadata shown by `postgen --version`
//!
//! Values are emitted by `build.rs` through vergen and may be missing
//! when building outside a git checkout.

use std::fmt;
use std::sync::LazyLock;

/// Build information baked in at compile time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildInfo {
    /// Package version
    pub version: &'static str,
    /// Full git commit SHA
    pub git_sha: Option<&'static str>,
    /// RFC 3339 build timestamp
    pub build_date: Option<&'static str>,
    /// Rustc version used for the build
    pub rustc: Option<&'static str>,
}

impl BuildInfo {
    /// Collect the metadata for the running binary
    pub fn current() -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION"),
            git_sha: option_env!("VERGEN_GIT_SHA"),
            build_date: option_env!("VERGEN_BUILD_TIMESTAMP"),
            rustc: option_env!("VERGEN_RUSTC_SEMVER"),
        }
    }

    /// First seven characters of the commit SHA
    pub fn short_sha(&self) -> Option<&'static str> {
        self.git_sha.map(|sha| sha.get(..7).unwrap_or(sha))
    }
}

impl fmt::Display for BuildInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let unknown = "unknown";
        writeln!(
            f,
            "Version: {}, {}",
            self.version,
            self.git_sha.unwrap_or(unknown)
        )?;
        writeln!(f, "Build Date: {}", self.build_date.unwrap_or(unknown))?;
        write!(f, "Rust Version: {}", self.rustc.unwrap_or(unknown))
    }
}

/// Long version text for clap (`--version`)
pub static LONG_VERSION: LazyLock<String> = LazyLock::new(|| {
    let info = BuildInfo::current();
    match info.short_sha() {
        Some(sha) => format!("{} ({sha})\n{info}", info.version),
        None => format!("{}\n{info}", info.version),
    }
});
