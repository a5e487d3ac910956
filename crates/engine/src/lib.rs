//! Post-generation engine for postgen
//!
//! Runs the two steps that polish a freshly generated project:
//!
//! - `permissions`: mark shell scripts owner-executable
//! - `resolver`: best-effort dependency tidy in the project root
//! - `hook`: the fixed two-step sequence tying them together
//!
//! Neither step returns an error. Failures are reported as data so the
//! caller can warn without aborting the scaffolding tool.

pub mod hook;
pub mod permissions;
pub mod resolver;

pub use hook::{HookSummary, PostGenHook};
pub use permissions::{OWNER_EXECUTE, PermissionFailure, PermissionReport, normalize_permissions};
pub use resolver::{ResolveFailure, ResolveOutcome, ResolverInvoker};
