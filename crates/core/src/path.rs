//! Type-safe path types
//!
//! - [`AbsPath`]: Absolute filesystem paths, used for the project root
//! - [`RelPath`]: Paths relative to the project root, used when reporting
//!
//! # Examples
//!
//! ```
//! use postgen_core::path::AbsPath;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let root = AbsPath::new("/work/my-service".into())?;
//! let script = AbsPath::new("/work/my-service/scripts/dev.sh".into())?;
//! let rel = script.strip_prefix(&root)?;
//! assert_eq!(rel.to_string(), "scripts/dev.sh");
//! # Ok(())
//! # }
//! ```

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// An absolute path on the filesystem
///
/// This type guarantees that the path is absolute (starts with `/` on Unix or a drive letter on Windows).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AbsPath(PathBuf);

impl AbsPath {
    /// Create a new `AbsPath` from a `PathBuf`
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not absolute.
    ///
    /// # Examples
    ///
    /// ```
    /// use postgen_core::path::AbsPath;
    ///
    /// assert!(AbsPath::new("/tmp/project".into()).is_ok());
    /// assert!(AbsPath::new("relative/path".into()).is_err());
    /// ```
    pub fn new(path: PathBuf) -> Result<Self> {
        if path.is_absolute() {
            Ok(AbsPath(path))
        } else {
            Err(Error::PathNotAbsolute { path })
        }
    }

    /// Resolve a path that may be relative against the current directory
    ///
    /// The path is made absolute lexically; symlinks are left as they are.
    pub fn resolve(path: &Path) -> Result<Self> {
        let absolute = std::path::absolute(path)?;
        Self::new(absolute)
    }

    /// Resolve a path and require that it names an existing directory
    ///
    /// Used for the project root handed over by the scaffolding tool.
    pub fn existing_dir(path: &Path) -> Result<Self> {
        let abs = Self::resolve(path)?;
        if abs.0.is_dir() {
            Ok(abs)
        } else {
            Err(Error::NotADirectory { path: abs.0 })
        }
    }

    /// Get the underlying `Path`
    pub fn as_path(&self) -> &Path {
        &self.0
    }

    /// Strip a base directory prefix to get a relative path
    ///
    /// # Errors
    ///
    /// Returns an error if `self` is not under `base`.
    pub fn strip_prefix(&self, base: &AbsPath) -> Result<RelPath> {
        self.0
            .strip_prefix(&base.0)
            .map(|p| RelPath(p.to_path_buf()))
            .map_err(|_| Error::InvalidPathPrefix {
                path: std::sync::Arc::new(self.as_path().to_path_buf()),
                base: std::sync::Arc::new(base.as_path().to_path_buf()),
            })
    }
}

/// A path relative to the project root
///
/// Only produced by [`AbsPath::strip_prefix`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RelPath(PathBuf);

impl std::fmt::Display for AbsPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

impl std::fmt::Display for RelPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}
