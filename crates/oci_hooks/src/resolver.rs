//! The resolver contract consumed by hook injection.

use std::collections::BTreeMap;

use crate::error::ResolveError;
use crate::spec::{Hook, Hooks, Spec};
use crate::stage::Stage;

/// Answers which hooks apply to a container spec.
///
/// Implementations must be safe for concurrent readers and deterministic:
/// the same spec against the same catalog state yields the same match set in
/// the same order. "Nothing matched" is `Ok(None)`, never an error.
pub trait HookResolver: Send + Sync {
    fn resolve(&self, spec: &Spec) -> Result<Option<MatchSet>, ResolveError>;
}

/// Hooks that triggered for one spec, grouped by stage in match order.
///
/// Always holds at least one hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchSet {
    stages: BTreeMap<Stage, Vec<Hook>>,
}

impl MatchSet {
    /// Drop empty stage lists; `None` if nothing is left.
    pub fn new(stages: BTreeMap<Stage, Vec<Hook>>) -> Option<Self> {
        let stages: BTreeMap<Stage, Vec<Hook>> = stages
            .into_iter()
            .filter(|(_, hooks)| !hooks.is_empty())
            .collect();
        if stages.is_empty() {
            None
        } else {
            Some(Self { stages })
        }
    }

    /// Stages with at least one hook, in execution order.
    pub fn stages(&self) -> impl Iterator<Item = Stage> + '_ {
        self.stages.keys().copied()
    }

    pub fn hooks(&self, stage: Stage) -> &[Hook] {
        self.stages.get(&stage).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Total hook entries across stages.
    pub fn len(&self) -> usize {
        self.stages.values().map(Vec::len).sum()
    }

    /// Always `false`; present for API symmetry with collections.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn into_hooks(self) -> Hooks {
        let mut hooks = Hooks::default();
        for (stage, list) in self.stages {
            *hooks.stage_mut(stage) = list;
        }
        hooks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hook(path: &str) -> Hook {
        Hook {
            path: path.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_input_is_none() {
        assert!(MatchSet::new(BTreeMap::new()).is_none());

        let mut only_empty = BTreeMap::new();
        only_empty.insert(Stage::Poststart, Vec::new());
        assert!(MatchSet::new(only_empty).is_none());
    }

    #[test]
    fn test_empty_stage_lists_are_dropped() {
        let mut stages = BTreeMap::new();
        stages.insert(Stage::Poststart, Vec::new());
        stages.insert(Stage::StartContainer, vec![hook("/a"), hook("/b")]);

        let set = MatchSet::new(stages).unwrap();
        assert_eq!(set.stages().collect::<Vec<_>>(), vec![Stage::StartContainer]);
        assert_eq!(set.len(), 2);
        assert!(set.hooks(Stage::Poststart).is_empty());

        let hooks = set.into_hooks();
        assert_eq!(hooks.start_container, vec![hook("/a"), hook("/b")]);
        assert!(hooks.poststart.is_empty());
    }
}
