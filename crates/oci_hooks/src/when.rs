//! Trigger predicates deciding whether a hook applies to a container.
//!
//! The condition vocabulary is fixed by the hook file format, so it is a
//! closed enum rather than a trait object. A [`Trigger`] matches only when
//! every one of its conditions matches.

use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use serde::Deserialize;

use crate::error::HookFileError;
use crate::spec::Spec;

/// One condition from a hook file's `when` block.
#[derive(Debug, Clone)]
pub enum Condition {
    /// Matches every container.
    Always,
    /// Matches no container. An explicit `false` for `always` or
    /// `hasBindMounts` compiles to this.
    Never,
    /// Matches when some annotation's key matches `key` and its value matches `value`.
    Annotation { key: Regex, value: Regex },
    /// Matches when `process.args[0]` matches any of the patterns.
    Command(Vec<Regex>),
    /// Matches when the container has at least one bind mount.
    HasBindMounts,
}

/// `process.args` was present but empty while a command condition needed it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmptyProcessArgs;

impl Condition {
    pub fn matches(&self, spec: &Spec) -> Result<bool, EmptyProcessArgs> {
        match self {
            Condition::Always => Ok(true),
            Condition::Never => Ok(false),
            Condition::Annotation { key, value } => Ok(spec
                .annotations
                .iter()
                .any(|(k, v)| key.is_match(k) && value.is_match(v))),
            Condition::Command(patterns) => {
                let Some(process) = &spec.process else {
                    return Ok(false);
                };
                let Some(command) = process.args.first() else {
                    return Err(EmptyProcessArgs);
                };
                Ok(patterns.iter().any(|p| p.is_match(command)))
            }
            Condition::HasBindMounts => Ok(spec.has_bind_mounts()),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::Always => f.write_str("always"),
            Condition::Never => f.write_str("never"),
            Condition::Annotation { key, value } => write!(f, "annotation({key}={value})"),
            Condition::Command(patterns) => {
                let patterns: Vec<&str> = patterns.iter().map(Regex::as_str).collect();
                write!(f, "command({})", patterns.join("|"))
            }
            Condition::HasBindMounts => f.write_str("hasBindMounts"),
        }
    }
}

/// The compiled `when` block of a hook definition. Never empty.
#[derive(Debug, Clone)]
pub struct Trigger {
    conditions: Vec<Condition>,
}

impl Trigger {
    pub fn new(conditions: Vec<Condition>) -> Result<Self, HookFileError> {
        if conditions.is_empty() {
            return Err(HookFileError::NoConditions);
        }
        Ok(Self { conditions })
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// All conditions must match. Evaluation stops at the first miss.
    pub fn matches(&self, spec: &Spec) -> Result<bool, EmptyProcessArgs> {
        for condition in &self.conditions {
            if !condition.matches(spec)? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, condition) in self.conditions.iter().enumerate() {
            if i > 0 {
                f.write_str(" && ")?;
            }
            write!(f, "{condition}")?;
        }
        Ok(())
    }
}

/// Raw `when` block as written in a hook file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WhenSpec {
    #[serde(default)]
    pub always: Option<bool>,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
    #[serde(default)]
    pub commands: Vec<String>,
    #[serde(default)]
    pub has_bind_mounts: Option<bool>,
}

impl WhenSpec {
    /// Conditions are ordered always, bind mounts, annotations, commands, so
    /// a vetoing flag short-circuits before the command check can fail.
    pub(crate) fn compile(self) -> Result<Trigger, HookFileError> {
        let mut conditions = Vec::new();

        match self.always {
            Some(true) => conditions.push(Condition::Always),
            Some(false) => conditions.push(Condition::Never),
            None => {}
        }

        match self.has_bind_mounts {
            Some(true) => conditions.push(Condition::HasBindMounts),
            Some(false) => conditions.push(Condition::Never),
            None => {}
        }

        for (key, value) in self.annotations {
            conditions.push(Condition::Annotation {
                key: compile_pattern("annotation key", &key)?,
                value: compile_pattern("annotation value", &value)?,
            });
        }

        if !self.commands.is_empty() {
            let patterns = self
                .commands
                .iter()
                .map(|c| compile_pattern("command", c))
                .collect::<Result<Vec<_>, _>>()?;
            conditions.push(Condition::Command(patterns));
        }

        Trigger::new(conditions)
    }
}

fn compile_pattern(field: &'static str, pattern: &str) -> Result<Regex, HookFileError> {
    Regex::new(pattern).map_err(|source| HookFileError::Pattern {
        field,
        pattern: pattern.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::{Mount, Process};

    fn spec_with(annotations: &[(&str, &str)], args: Option<&[&str]>) -> Spec {
        Spec {
            annotations: annotations
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            process: args.map(|a| Process {
                args: a.iter().map(|s| s.to_string()).collect(),
                env: Vec::new(),
            }),
            ..Default::default()
        }
    }

    fn when(json: serde_json::Value) -> Trigger {
        serde_json::from_value::<WhenSpec>(json)
            .unwrap()
            .compile()
            .unwrap()
    }

    #[test]
    fn test_always_matches_anything() {
        let trigger = when(serde_json::json!({ "always": true }));
        assert_eq!(trigger.matches(&Spec::default()), Ok(true));
    }

    #[test]
    fn test_annotation_requires_key_and_value() {
        let trigger = when(serde_json::json!({ "annotations": { "^foo$": "^bar$" } }));

        assert_eq!(trigger.matches(&spec_with(&[("foo", "bar")], None)), Ok(true));
        assert_eq!(trigger.matches(&spec_with(&[("foo", "baz")], None)), Ok(false));
        assert_eq!(trigger.matches(&spec_with(&[("fool", "bar")], None)), Ok(false));
        assert_eq!(trigger.matches(&spec_with(&[], None)), Ok(false));
    }

    #[test]
    fn test_annotation_patterns_are_unanchored() {
        let trigger = when(serde_json::json!({ "annotations": { "gpu": "true" } }));
        let spec = spec_with(&[("example.com/gpu-enabled", "is-true")], None);
        assert_eq!(trigger.matches(&spec), Ok(true));
    }

    #[test]
    fn test_command_matches_first_arg_only() {
        let trigger = when(serde_json::json!({ "commands": ["^/usr/bin/nginx$", "redis"] }));

        assert_eq!(
            trigger.matches(&spec_with(&[], Some(&["/usr/bin/nginx", "-g"]))),
            Ok(true)
        );
        assert_eq!(
            trigger.matches(&spec_with(&[], Some(&["redis-server"]))),
            Ok(true)
        );
        assert_eq!(
            trigger.matches(&spec_with(&[], Some(&["sh", "/usr/bin/nginx"]))),
            Ok(false)
        );
        assert_eq!(trigger.matches(&spec_with(&[], None)), Ok(false));
    }

    #[test]
    fn test_command_with_empty_args_is_an_error() {
        let trigger = when(serde_json::json!({ "commands": ["sh"] }));
        assert_eq!(
            trigger.matches(&spec_with(&[], Some(&[]))),
            Err(EmptyProcessArgs)
        );
    }

    #[test]
    fn test_bind_mounts_condition() {
        let trigger = when(serde_json::json!({ "hasBindMounts": true }));
        let mut spec = Spec::default();
        assert_eq!(trigger.matches(&spec), Ok(false));

        spec.mounts.push(Mount {
            destination: "/src".into(),
            kind: Some("bind".into()),
            ..Default::default()
        });
        assert_eq!(trigger.matches(&spec), Ok(true));
    }

    #[test]
    fn test_conditions_are_conjunctive() {
        let trigger = when(serde_json::json!({
            "always": true,
            "annotations": { "^foo$": "^bar$" },
            "commands": ["^sh$"]
        }));
        assert_eq!(trigger.conditions().len(), 3);

        assert_eq!(
            trigger.matches(&spec_with(&[("foo", "bar")], Some(&["sh"]))),
            Ok(true)
        );
        assert_eq!(
            trigger.matches(&spec_with(&[("foo", "bar")], Some(&["bash"]))),
            Ok(false)
        );
        assert_eq!(
            trigger.matches(&spec_with(&[], Some(&["sh"]))),
            Ok(false)
        );
    }

    #[test]
    fn test_explicit_false_always_vetoes() {
        let trigger = when(serde_json::json!({
            "always": false,
            "annotations": { "^foo$": "^bar$" }
        }));
        assert_eq!(trigger.matches(&spec_with(&[("foo", "bar")], None)), Ok(false));

        let trigger = when(serde_json::json!({ "always": false }));
        assert_eq!(trigger.matches(&Spec::default()), Ok(false));
    }

    #[test]
    fn test_explicit_false_bind_mounts_vetoes() {
        let trigger = when(serde_json::json!({ "always": true, "hasBindMounts": false }));
        let mut spec = Spec::default();
        assert_eq!(trigger.matches(&spec), Ok(false));

        spec.mounts.push(Mount {
            destination: "/src".into(),
            kind: Some("bind".into()),
            ..Default::default()
        });
        assert_eq!(trigger.matches(&spec), Ok(false));
    }

    #[test]
    fn test_veto_short_circuits_command_check() {
        let trigger = when(serde_json::json!({ "always": false, "commands": ["sh"] }));
        assert_eq!(trigger.matches(&spec_with(&[], Some(&[]))), Ok(false));
    }

    #[test]
    fn test_empty_when_is_rejected() {
        let result = serde_json::from_value::<WhenSpec>(serde_json::json!({}))
            .unwrap()
            .compile();
        assert!(matches!(result, Err(HookFileError::NoConditions)));
    }

    #[test]
    fn test_trigger_display() {
        let trigger = when(serde_json::json!({
            "always": true,
            "annotations": { "^foo$": "^bar$" },
            "commands": ["^sh$", "bash"]
        }));
        assert_eq!(
            trigger.to_string(),
            "always && annotation(^foo$=^bar$) && command(^sh$|bash)"
        );
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let result = serde_json::from_value::<WhenSpec>(serde_json::json!({
            "annotations": { "foo": "(unclosed" }
        }))
        .unwrap()
        .compile();
        assert!(matches!(
            result,
            Err(HookFileError::Pattern { field: "annotation value", .. })
        ));
    }
}
