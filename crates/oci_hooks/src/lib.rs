//! OCI hook definitions and the directory-backed hook catalog.
//!
//! This crate owns everything about *which* hooks exist and *when* they apply:
//!
//! - [`spec`]: the subset of the OCI runtime spec that hooks care about
//! - [`stage`]: the closed set of lifecycle stages a hook can attach to
//! - [`when`]: trigger predicates evaluated against a container spec
//! - [`definition`]: the on-disk hook file format and its validation
//! - [`catalog`]: a [`HookCatalog`] built from `hooks.d` style directories
//! - [`resolver`]: the [`HookResolver`] contract and the [`MatchSet`] it returns
//!
//! Consumers only need [`HookResolver`]: hand it a [`Spec`] and it answers
//! with the hooks that triggered, grouped by stage, or `None`.

pub mod catalog;
pub mod definition;
pub mod error;
pub mod resolver;
pub mod spec;
pub mod stage;
pub mod when;

pub use catalog::{CatalogOptions, DEFAULT_HOOKS_DIR, HookCatalog, OVERRIDE_HOOKS_DIR};
pub use definition::{HOOK_FILE_VERSION, HookDefinition};
pub use error::{CatalogError, HookFileError, ResolveError};
pub use resolver::{HookResolver, MatchSet};
pub use spec::{Hook, Hooks, Mount, Process, Spec};
pub use stage::Stage;
pub use when::{Condition, Trigger};
