//! Permission Normalizer
//!
//! Walks the generated project and adds the owner-execute bit to every
//! regular file carrying a shell-script extension. Bits are only ever
//! added, and a file that already has the bit is not written at all.

use postgen_config::PermissionsConfig;
use postgen_core::{AbsPath, RelPath, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Owner-execute permission bit (`S_IXUSR`)
pub const OWNER_EXECUTE: u32 = 0o100;

/// A file or directory the sweep could not process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionFailure {
    /// Path that failed, absolute
    pub path: PathBuf,
    /// Underlying error message
    pub message: String,
}

/// Outcome of one permission sweep
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionReport {
    /// Scripts that gained the owner-execute bit (or would, in dry-run)
    pub updated: Vec<RelPath>,
    /// Scripts that already had it
    pub unchanged: Vec<RelPath>,
    /// Entries that could not be read or changed
    pub failures: Vec<PermissionFailure>,
}

impl PermissionReport {
    /// Number of matching scripts processed without error
    ///
    /// `failures` is counted separately since it also holds directories
    /// the walk could not enter.
    pub fn matched(&self) -> usize {
        self.updated.len() + self.unchanged.len()
    }

    /// True when every entry was processed without error
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn record_failure(&mut self, path: PathBuf, message: String) {
        tracing::warn!(path = %path.display(), error = %message, "Cannot update permissions");
        self.failures.push(PermissionFailure { path, message });
    }
}

/// Ensure every matching script under `root` is owner-executable
///
/// Symlinks are not followed, so link targets outside (or inside) the
/// tree are never modified and cycles cannot occur. Errors are recorded
/// per entry and never stop the sweep.
#[tracing::instrument(skip(root, config), fields(root = %root))]
pub fn normalize_permissions(
    root: &AbsPath,
    config: &PermissionsConfig,
    dry_run: bool,
) -> PermissionReport {
    let mut report = PermissionReport::default();

    for entry in WalkDir::new(root.as_path()).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let path = e
                    .path()
                    .map_or_else(|| root.as_path().to_path_buf(), Path::to_path_buf);
                report.record_failure(path, e.to_string());
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        if !config.matches(&entry.file_name().to_string_lossy()) {
            continue;
        }

        let rel = match relative_to(root, entry.path()) {
            Ok(rel) => rel,
            Err(e) => {
                report.record_failure(entry.path().to_path_buf(), e.to_string());
                continue;
            }
        };

        let mode = match entry.metadata() {
            Ok(metadata) => file_mode(&metadata),
            Err(e) => {
                report.record_failure(entry.path().to_path_buf(), e.to_string());
                continue;
            }
        };

        match ensure_owner_execute(entry.path(), mode, dry_run) {
            Ok(true) => {
                tracing::debug!(path = %rel, dry_run, "Added owner-execute bit");
                report.updated.push(rel);
            }
            Ok(false) => {
                tracing::trace!(path = %rel, "Already executable");
                report.unchanged.push(rel);
            }
            Err(e) => report.record_failure(entry.path().to_path_buf(), e.to_string()),
        }
    }

    tracing::debug!(
        updated = report.updated.len(),
        unchanged = report.unchanged.len(),
        failed = report.failures.len(),
        "Permission sweep finished"
    );

    report
}

fn relative_to(root: &AbsPath, path: &Path) -> Result<RelPath> {
    AbsPath::new(path.to_path_buf())?.strip_prefix(root)
}

#[cfg(unix)]
fn file_mode(metadata: &fs::Metadata) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    Some(metadata.permissions().mode())
}

#[cfg(not(unix))]
fn file_mode(_metadata: &fs::Metadata) -> Option<u32> {
    None
}

/// Returns whether the bit had to be added
#[cfg(unix)]
fn ensure_owner_execute(path: &Path, mode: Option<u32>, dry_run: bool) -> std::io::Result<bool> {
    use std::os::unix::fs::PermissionsExt;

    let Some(mode) = mode else {
        return Ok(false);
    };

    if mode & OWNER_EXECUTE != 0 {
        return Ok(false);
    }

    if !dry_run {
        // Strip file-type bits; chmod only takes permission and special bits
        let permissions = fs::Permissions::from_mode((mode & 0o7777) | OWNER_EXECUTE);
        fs::set_permissions(path, permissions)?;
    }

    Ok(true)
}

// No execute bit to set outside Unix
#[cfg(not(unix))]
fn ensure_owner_execute(_path: &Path, _mode: Option<u32>, _dry_run: bool) -> std::io::Result<bool> {
    Ok(false)
}

#[cfg(all(test, unix))]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    fn write_with_mode(root: &Path, rel: &str, mode: u32) -> PathBuf {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "#!/bin/sh\necho hi\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
        path
    }

    fn mode_of(path: &Path) -> u32 {
        fs::symlink_metadata(path).unwrap().permissions().mode() & 0o7777
    }

    fn project() -> (TempDir, AbsPath) {
        let temp = TempDir::new().unwrap();
        let root = AbsPath::new(temp.path().to_path_buf()).unwrap();
        (temp, root)
    }

    fn rel_strings(paths: &[RelPath]) -> Vec<String> {
        let mut out: Vec<String> = paths.iter().map(ToString::to_string).collect();
        out.sort();
        out
    }

    #[test]
    fn test_adds_execute_to_scripts_only() {
        let (temp, root) = project();
        let script = write_with_mode(temp.path(), "run.sh", 0o644);
        let notes = write_with_mode(temp.path(), "notes.txt", 0o644);

        let report = normalize_permissions(&root, &PermissionsConfig::default(), false);

        assert_eq!(mode_of(&script), 0o744);
        assert_eq!(mode_of(&notes), 0o644);
        assert_eq!(rel_strings(&report.updated), vec!["run.sh"]);
        assert!(report.unchanged.is_empty());
        assert!(report.is_clean());
    }

    #[test]
    fn test_preserves_existing_bits() {
        let (temp, root) = project();
        let group_read = write_with_mode(temp.path(), "a.sh", 0o640);
        let other_exec = write_with_mode(temp.path(), "b.sh", 0o605);
        let owner_only = write_with_mode(temp.path(), "c.sh", 0o600);

        normalize_permissions(&root, &PermissionsConfig::default(), false);

        assert_eq!(mode_of(&group_read), 0o740);
        assert_eq!(mode_of(&other_exec), 0o705);
        assert_eq!(mode_of(&owner_only), 0o700);
    }

    #[test]
    fn test_already_executable_is_unchanged() {
        let (temp, root) = project();
        let script = write_with_mode(temp.path(), "build.sh", 0o755);

        let report = normalize_permissions(&root, &PermissionsConfig::default(), false);

        assert_eq!(mode_of(&script), 0o755);
        assert!(report.updated.is_empty());
        assert_eq!(rel_strings(&report.unchanged), vec!["build.sh"]);
    }

    #[test]
    fn test_hidden_and_nested_directories() {
        let (temp, root) = project();
        let hidden = write_with_mode(temp.path(), ".github/scripts/release.sh", 0o644);
        let deep = write_with_mode(temp.path(), "a/b/c/d/e/deep.sh", 0o600);
        let dotfile = write_with_mode(temp.path(), "tools/.sh", 0o644);

        let report = normalize_permissions(&root, &PermissionsConfig::default(), false);

        assert_eq!(mode_of(&hidden), 0o744);
        assert_eq!(mode_of(&deep), 0o700);
        assert_eq!(mode_of(&dotfile), 0o744);
        assert_eq!(
            rel_strings(&report.updated),
            vec![".github/scripts/release.sh", "a/b/c/d/e/deep.sh", "tools/.sh"]
        );
    }

    #[test]
    fn test_ignores_directories_and_near_misses() {
        let (temp, root) = project();
        fs::create_dir_all(temp.path().join("vendor.sh")).unwrap();
        fs::set_permissions(
            temp.path().join("vendor.sh"),
            fs::Permissions::from_mode(0o755),
        )
        .unwrap();
        let zsh = write_with_mode(temp.path(), "env.zsh", 0o644);
        let backup = write_with_mode(temp.path(), "run.sh.bak", 0o644);
        let upper = write_with_mode(temp.path(), "RUN.SH", 0o644);

        let report = normalize_permissions(&root, &PermissionsConfig::default(), false);

        assert_eq!(report.matched(), 0);
        assert_eq!(mode_of(&zsh), 0o644);
        assert_eq!(mode_of(&backup), 0o644);
        assert_eq!(mode_of(&upper), 0o644);
    }

    #[test]
    fn test_symlinks_are_not_followed() {
        let (temp, root) = project();
        let target = write_with_mode(temp.path(), "target.txt", 0o644);
        std::os::unix::fs::symlink(&target, temp.path().join("link.sh")).unwrap();
        // A directory cycle must not hang the walk
        fs::create_dir_all(temp.path().join("loop")).unwrap();
        std::os::unix::fs::symlink(temp.path(), temp.path().join("loop/back")).unwrap();

        let report = normalize_permissions(&root, &PermissionsConfig::default(), false);

        assert_eq!(report.matched(), 0);
        assert_eq!(mode_of(&target), 0o644);
    }

    #[test]
    fn test_idempotent() {
        let (temp, root) = project();
        let a = write_with_mode(temp.path(), "a.sh", 0o644);
        let b = write_with_mode(temp.path(), "scripts/b.sh", 0o600);
        let config = PermissionsConfig::default();

        let first = normalize_permissions(&root, &config, false);
        let after_first = (mode_of(&a), mode_of(&b));
        let second = normalize_permissions(&root, &config, false);

        assert_eq!(first.updated.len(), 2);
        assert!(second.updated.is_empty());
        assert_eq!(second.unchanged.len(), 2);
        assert_eq!((mode_of(&a), mode_of(&b)), after_first);
    }

    #[test]
    fn test_dry_run_does_not_write() {
        let (temp, root) = project();
        let script = write_with_mode(temp.path(), "run.sh", 0o644);

        let report = normalize_permissions(&root, &PermissionsConfig::default(), true);

        assert_eq!(rel_strings(&report.updated), vec!["run.sh"]);
        assert_eq!(mode_of(&script), 0o644);
    }

    #[test]
    fn test_custom_extensions() {
        let (temp, root) = project();
        let bash = write_with_mode(temp.path(), "completion.bash", 0o644);
        let sh = write_with_mode(temp.path(), "run.sh", 0o644);
        let config = PermissionsConfig {
            extensions: vec!["bash".to_string()],
        };

        normalize_permissions(&root, &config, false);

        assert_eq!(mode_of(&bash), 0o744);
        assert_eq!(mode_of(&sh), 0o644);
    }

    #[test]
    fn test_unreadable_directory_does_not_stop_sweep() {
        let (temp, root) = project();
        let script = write_with_mode(temp.path(), "run.sh", 0o644);
        write_with_mode(temp.path(), "locked/inner.sh", 0o644);
        let locked = temp.path().join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

        // Mode bits do not restrict root
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let report = normalize_permissions(&root, &PermissionsConfig::default(), false);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        assert_eq!(mode_of(&script), 0o744);
        assert_eq!(rel_strings(&report.updated), vec!["run.sh"]);
        assert_eq!(report.matched(), 1);
        assert!(!report.is_clean());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].path, locked);
        assert_eq!(mode_of(&temp.path().join("locked/inner.sh")), 0o644);
    }

    #[test]
    fn test_empty_tree() {
        let (_temp, root) = project();
        let report = normalize_permissions(&root, &PermissionsConfig::default(), false);
        assert_eq!(report, PermissionReport::default());
    }
}
