//! The slice of the OCI runtime spec that hook injection reads and writes.
//!
//! Field names follow the runtime-spec `config.json` layout so a real bundle
//! config deserializes directly; anything not modelled here is ignored.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::stage::Stage;

/// A single lifecycle hook entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hook {
    /// Absolute path of the executable.
    pub path: String,
    /// Full argv, including `argv[0]`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
    /// Environment in `KEY=value` form.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<String>,
    /// Timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<i64>,
}

/// Hooks grouped by lifecycle stage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hooks {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prestart: Vec<Hook>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub create_runtime: Vec<Hook>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub create_container: Vec<Hook>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub start_container: Vec<Hook>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub poststart: Vec<Hook>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub poststop: Vec<Hook>,
}

impl Hooks {
    pub fn stage(&self, stage: Stage) -> &[Hook] {
        match stage {
            Stage::Prestart => &self.prestart,
            Stage::CreateRuntime => &self.create_runtime,
            Stage::CreateContainer => &self.create_container,
            Stage::StartContainer => &self.start_container,
            Stage::Poststart => &self.poststart,
            Stage::Poststop => &self.poststop,
        }
    }

    pub fn stage_mut(&mut self, stage: Stage) -> &mut Vec<Hook> {
        match stage {
            Stage::Prestart => &mut self.prestart,
            Stage::CreateRuntime => &mut self.create_runtime,
            Stage::CreateContainer => &mut self.create_container,
            Stage::StartContainer => &mut self.start_container,
            Stage::Poststart => &mut self.poststart,
            Stage::Poststop => &mut self.poststop,
        }
    }

    /// Total number of hooks across all stages.
    pub fn len(&self) -> usize {
        Stage::ALL.iter().map(|s| self.stage(*s).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        Stage::ALL.iter().all(|s| self.stage(*s).is_empty())
    }

    /// Stages that carry at least one hook, in execution order.
    pub fn populated_stages(&self) -> Vec<Stage> {
        Stage::ALL
            .into_iter()
            .filter(|s| !self.stage(*s).is_empty())
            .collect()
    }

    /// Append `other` stage by stage. Existing entries keep their position.
    pub fn append(&mut self, other: Hooks) {
        let Hooks {
            prestart,
            create_runtime,
            create_container,
            start_container,
            poststart,
            poststop,
        } = other;
        self.prestart.extend(prestart);
        self.create_runtime.extend(create_runtime);
        self.create_container.extend(create_container);
        self.start_container.extend(start_container);
        self.poststart.extend(poststart);
        self.poststop.extend(poststop);
    }
}

/// The container process.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Process {
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<String>,
}

/// A mount entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mount {
    pub destination: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl Mount {
    /// Whether this mount bind-mounts a host path into the container.
    pub fn is_bind(&self) -> bool {
        self.kind.as_deref() == Some("bind")
            || self.options.iter().any(|o| o == "bind" || o == "rbind")
    }
}

/// Container configuration as seen by hook triggers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spec {
    #[serde(default)]
    pub oci_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub process: Option<Process>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mounts: Vec<Mount>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hooks: Option<Hooks>,
}

impl Spec {
    pub fn has_bind_mounts(&self) -> bool {
        self.mounts.iter().any(Mount::is_bind)
    }

    /// `process.args[0]`, if the spec has a process with arguments.
    pub fn command(&self) -> Option<&str> {
        self.process
            .as_ref()
            .and_then(|p| p.args.first())
            .map(String::as_str)
    }
}
