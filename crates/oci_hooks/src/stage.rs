//! Lifecycle stages a hook can be attached to.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::HookFileError;

/// Points in the container lifecycle where the runtime runs hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    /// Deprecated by the runtime spec in favour of `createRuntime`, still honoured.
    Prestart,
    /// After the runtime environment is created, in the runtime namespace.
    CreateRuntime,
    /// After the runtime environment is created, in the container namespace.
    CreateContainer,
    /// Right before the user process starts, in the container namespace.
    StartContainer,
    /// After the user process starts.
    Poststart,
    /// After the container is deleted.
    Poststop,
}

impl Stage {
    /// All stages in the order the runtime executes them.
    pub const ALL: [Stage; 6] = [
        Stage::Prestart,
        Stage::CreateRuntime,
        Stage::CreateContainer,
        Stage::StartContainer,
        Stage::Poststart,
        Stage::Poststop,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Prestart => "prestart",
            Stage::CreateRuntime => "createRuntime",
            Stage::CreateContainer => "createContainer",
            Stage::StartContainer => "startContainer",
            Stage::Poststart => "poststart",
            Stage::Poststop => "poststop",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = HookFileError;

    /// Case-insensitive; `_` and `-` separators are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();
        match normalized.as_str() {
            "prestart" => Ok(Stage::Prestart),
            "createruntime" => Ok(Stage::CreateRuntime),
            "createcontainer" => Ok(Stage::CreateContainer),
            "startcontainer" => Ok(Stage::StartContainer),
            "poststart" => Ok(Stage::Poststart),
            "poststop" => Ok(Stage::Poststop),
            _ => Err(HookFileError::UnknownStage(s.to_string())),
        }
    }
}
