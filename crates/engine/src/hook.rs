//! Post-generation hook sequence
//!
//! A fixed two-step run: normalize script permissions, then try to
//! resolve dependencies. The first step never gates the second.

use crate::permissions::{PermissionReport, normalize_permissions};
use crate::resolver::{ResolveOutcome, ResolverInvoker};
use postgen_config::Config;
use postgen_core::AbsPath;

/// What a hook run did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookSummary {
    /// Permission Normalizer outcome
    pub permissions: PermissionReport,
    /// Dependency Resolver Invoker outcome
    pub resolution: ResolveOutcome,
}

impl HookSummary {
    /// True when dependency resolution was attempted and failed
    pub fn resolution_failed(&self) -> bool {
        !self.resolution.succeeded()
    }
}

/// Runs both post-generation steps against one project root
///
/// # Examples
///
/// ```ignore
/// let root = AbsPath::existing_dir(Path::new("."))?;
/// let summary = PostGenHook::new(&root, &config).run();
/// if summary.resolution_failed() {
///     eprintln!("ERROR: go mod tidy failed.");
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PostGenHook<'a> {
    root: &'a AbsPath,
    config: &'a Config,
    dry_run: bool,
}

impl<'a> PostGenHook<'a> {
    /// Create a hook for `root` with the given configuration
    pub fn new(root: &'a AbsPath, config: &'a Config) -> Self {
        Self {
            root,
            config,
            dry_run: false,
        }
    }

    /// Report what would change without touching files or running the resolver
    #[must_use]
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Run permission normalization, then dependency resolution
    #[tracing::instrument(skip(self), fields(root = %self.root, dry_run = self.dry_run))]
    pub fn run(&self) -> HookSummary {
        let permissions = normalize_permissions(self.root, &self.config.permissions, self.dry_run);

        let resolution = if self.dry_run {
            tracing::debug!(cmd = %self.config.resolver.command, "Dry run, not resolving dependencies");
            ResolveOutcome::Skipped
        } else {
            ResolverInvoker::new(&self.config.resolver).resolve(self.root)
        };

        HookSummary {
            permissions,
            resolution,
        }
    }
}
