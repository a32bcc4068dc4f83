//! Hook definition files.
//!
//! A hook definition is a JSON document, conventionally one per file in a
//! `hooks.d` directory:
//!
//! ```json
//! {
//!   "version": "1.0.0",
//!   "hook": { "path": "/usr/libexec/oci/hooks.d/gpu", "args": ["gpu", "prestart"] },
//!   "when": { "annotations": { "^example\\.com/gpu$": "^true$" } },
//!   "stages": ["createRuntime"]
//! }
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::HookFileError;
use crate::spec::{Hook, Spec};
use crate::stage::Stage;
use crate::when::{EmptyProcessArgs, Trigger, WhenSpec};

/// The only hook file schema version understood by this crate.
pub const HOOK_FILE_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Deserialize)]
struct HookFileSpec {
    version: String,
    hook: Hook,
    when: WhenSpec,
    stages: Vec<String>,
}

/// A validated, immutable hook definition.
#[derive(Debug, Clone)]
pub struct HookDefinition {
    name: String,
    hook: Hook,
    trigger: Trigger,
    stages: Vec<Stage>,
}

impl HookDefinition {
    /// Build a definition directly. `stages` must be non-empty; duplicates are dropped.
    pub fn new(
        name: impl Into<String>,
        hook: Hook,
        trigger: Trigger,
        stages: Vec<Stage>,
    ) -> Result<Self, HookFileError> {
        let mut unique: Vec<Stage> = Vec::with_capacity(stages.len());
        for stage in stages {
            if !unique.contains(&stage) {
                unique.push(stage);
            }
        }
        if unique.is_empty() {
            return Err(HookFileError::NoStages);
        }
        Ok(Self {
            name: name.into(),
            hook,
            trigger,
            stages: unique,
        })
    }

    /// Read and validate a hook file. The definition is named after the file.
    pub fn from_file(path: &Path) -> Result<Self, HookFileError> {
        let content = std::fs::read(path).map_err(|source| HookFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::parse(name, &content)
    }

    /// Parse and validate hook file content.
    pub fn parse(name: impl Into<String>, content: &[u8]) -> Result<Self, HookFileError> {
        let spec: HookFileSpec = serde_json::from_slice(content)?;

        if spec.version != HOOK_FILE_VERSION {
            return Err(HookFileError::UnsupportedVersion {
                found: spec.version,
                expected: HOOK_FILE_VERSION.to_string(),
            });
        }

        if !Path::new(&spec.hook.path).is_absolute() {
            return Err(HookFileError::RelativePath(spec.hook.path));
        }
        if let Err(source) = std::fs::metadata(&spec.hook.path) {
            return Err(HookFileError::MissingExecutable {
                path: spec.hook.path,
                source,
            });
        }

        let stages = spec
            .stages
            .iter()
            .map(|s| s.parse::<Stage>())
            .collect::<Result<Vec<_>, _>>()?;
        let trigger = spec.when.compile()?;

        Self::new(name, spec.hook, trigger, stages)
    }

    /// File name the definition was loaded from; also its ordering key.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn hook(&self) -> &Hook {
        &self.hook
    }

    pub fn trigger(&self) -> &Trigger {
        &self.trigger
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn matches(&self, spec: &Spec) -> Result<bool, EmptyProcessArgs> {
        self.trigger.matches(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ECHO_HOOK: &str = r#"{
        "version": "1.0.0",
        "hook": { "path": "/bin/echo", "args": ["echo", "testing from hook"] },
        "when": { "always": true },
        "stages": ["startContainer", "poststop", "startContainer"]
    }"#;

    #[test]
    fn test_parse_valid_definition() {
        let def = HookDefinition::parse("echo.json", ECHO_HOOK.as_bytes()).unwrap();
        assert_eq!(def.name(), "echo.json");
        assert_eq!(def.hook().path, "/bin/echo");
        assert_eq!(def.hook().args, vec!["echo", "testing from hook"]);
        assert_eq!(def.stages(), &[Stage::StartContainer, Stage::Poststop]);
        assert_eq!(def.trigger().to_string(), "always");
        assert_eq!(def.matches(&Spec::default()), Ok(true));
    }

    #[test]
    fn test_rejects_unknown_version() {
        let content = ECHO_HOOK.replace("1.0.0", "0.1.0");
        let err = HookDefinition::parse("old.json", content.as_bytes()).unwrap_err();
        assert!(matches!(err, HookFileError::UnsupportedVersion { found, .. } if found == "0.1.0"));
    }

    #[test]
    fn test_rejects_relative_path() {
        let content = ECHO_HOOK.replace("/bin/echo", "bin/echo");
        let err = HookDefinition::parse("rel.json", content.as_bytes()).unwrap_err();
        assert!(matches!(err, HookFileError::RelativePath(p) if p == "bin/echo"));
    }

    #[test]
    fn test_rejects_missing_executable() {
        let content = ECHO_HOOK.replace("/bin/echo", "/nonexistent/hook-binary");
        let err = HookDefinition::parse("gone.json", content.as_bytes()).unwrap_err();
        assert!(matches!(err, HookFileError::MissingExecutable { .. }));
    }

    #[test]
    fn test_rejects_unknown_stage() {
        let content = ECHO_HOOK.replace("\"poststop\"", "\"postLunch\"");
        let err = HookDefinition::parse("stage.json", content.as_bytes()).unwrap_err();
        assert!(matches!(err, HookFileError::UnknownStage(s) if s == "postLunch"));
    }

    #[test]
    fn test_rejects_empty_stages() {
        let content = r#"{
            "version": "1.0.0",
            "hook": { "path": "/bin/echo" },
            "when": { "always": true },
            "stages": []
        }"#;
        let err = HookDefinition::parse("none.json", content.as_bytes()).unwrap_err();
        assert!(matches!(err, HookFileError::NoStages));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = HookDefinition::parse("bad.json", b"{ not json").unwrap_err();
        assert!(matches!(err, HookFileError::Json(_)));
    }

    #[test]
    fn test_from_file_uses_file_name() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("10-echo.json");
        std::fs::write(&path, ECHO_HOOK).expect("write");

        let def = HookDefinition::from_file(&path).expect("load");
        assert_eq!(def.name(), "10-echo.json");
    }
}
