//! The engine's output: hooks to append, per stage.

use oci_hooks::{Hook, Hooks, MatchSet, Stage};
use serde::Serialize;

/// Hooks to append to a container spec, grouped by stage.
///
/// Only constructible from a [`MatchSet`], so an adjustment always carries at
/// least one hook. It appends; it never removes or reorders what the spec
/// already holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpecAdjustment {
    hooks: Hooks,
}

impl SpecAdjustment {
    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    pub fn stage(&self, stage: Stage) -> &[Hook] {
        self.hooks.stage(stage)
    }

    /// Stages the adjustment touches, in execution order.
    pub fn stages(&self) -> Vec<Stage> {
        self.hooks.populated_stages()
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Always `false`; present for API symmetry with collections.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Apply to `existing`, appending after whatever is already there.
    pub fn apply_to(&self, existing: &mut Hooks) {
        existing.append(self.hooks.clone());
    }

    pub fn into_hooks(self) -> Hooks {
        self.hooks
    }
}

impl From<MatchSet> for SpecAdjustment {
    fn from(matched: MatchSet) -> Self {
        Self {
            hooks: matched.into_hooks(),
        }
    }
}
