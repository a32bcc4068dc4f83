//! Configuration for the hook injector.
//!
//! Every setting can come from the environment (a `.env` file is honoured by
//! the binary) and is then overridable from the command line.

mod helpers;

use std::path::PathBuf;
use std::str::FromStr;

use oci_hooks::{CatalogOptions, DEFAULT_HOOKS_DIR, HookCatalog, OVERRIDE_HOOKS_DIR};

use crate::config::helpers::{optional_env, parse_bool_env, parse_list_env, parse_optional_env};
use crate::error::{ConfigError, Error};

pub const DEFAULT_PLUGIN_NAME: &str = "hook-injector";
pub const DEFAULT_PLUGIN_INDEX: &str = "10";

/// Output format of the process log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format {other:?} (expected text or json)")),
        }
    }
}

/// Main configuration for the plugin.
#[derive(Debug, Clone)]
pub struct InjectorConfig {
    /// Name the plugin registers under.
    pub plugin_name: String,
    /// Two-digit registration index; orders plugins within the runtime.
    pub plugin_index: String,
    /// Hook directories, lowest precedence first.
    pub hook_dirs: Vec<PathBuf>,
    /// Rescan hook directories when they change.
    pub rescan: bool,
    /// Dump every pod and container the plugin sees.
    pub verbose: bool,
    /// Observer backend: "log", "noop", or "none".
    pub observer: String,
    pub log_format: LogFormat,
}

impl Default for InjectorConfig {
    fn default() -> Self {
        Self {
            plugin_name: DEFAULT_PLUGIN_NAME.to_string(),
            plugin_index: DEFAULT_PLUGIN_INDEX.to_string(),
            hook_dirs: vec![
                PathBuf::from(DEFAULT_HOOKS_DIR),
                PathBuf::from(OVERRIDE_HOOKS_DIR),
            ],
            rescan: true,
            verbose: false,
            observer: "log".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

impl InjectorConfig {
    /// Build from environment variables, falling back to defaults.
    pub fn resolve() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let config = Self {
            plugin_name: optional_env("HOOK_INJECTOR_PLUGIN_NAME")?
                .unwrap_or(defaults.plugin_name),
            plugin_index: optional_env("HOOK_INJECTOR_PLUGIN_IDX")?
                .unwrap_or(defaults.plugin_index),
            hook_dirs: parse_list_env("HOOK_INJECTOR_HOOKS_DIRS")?
                .map(|dirs| dirs.into_iter().map(PathBuf::from).collect())
                .unwrap_or(defaults.hook_dirs),
            rescan: parse_bool_env("HOOK_INJECTOR_RESCAN", defaults.rescan)?,
            verbose: parse_bool_env("HOOK_INJECTOR_VERBOSE", defaults.verbose)?,
            observer: optional_env("HOOK_INJECTOR_OBSERVER")?.unwrap_or(defaults.observer),
            log_format: parse_optional_env("HOOK_INJECTOR_LOG_FORMAT", defaults.log_format)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.plugin_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "HOOK_INJECTOR_PLUGIN_NAME".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if self.plugin_index.len() != 2 || !self.plugin_index.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(ConfigError::InvalidValue {
                key: "HOOK_INJECTOR_PLUGIN_IDX".to_string(),
                message: format!("must be two digits (00-99), got {:?}", self.plugin_index),
            });
        }
        if self.hook_dirs.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "HOOK_INJECTOR_HOOKS_DIRS".to_string(),
                message: "at least one hook directory is required".to_string(),
            });
        }
        Ok(())
    }

    /// Registration identity, e.g. `10-hook-injector`.
    pub fn plugin_id(&self) -> String {
        format!("{}-{}", self.plugin_index, self.plugin_name)
    }

    pub fn catalog_options(&self) -> CatalogOptions {
        CatalogOptions {
            rescan: self.rescan,
        }
    }

    /// Validate, then load the hook catalog from the configured directories.
    pub fn load_catalog(&self) -> Result<HookCatalog, Error> {
        self.validate()?;
        Ok(HookCatalog::load(self.hook_dirs.clone(), self.catalog_options())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::helpers::ENV_MUTEX;

    const KEYS: &[&str] = &[
        "HOOK_INJECTOR_PLUGIN_NAME",
        "HOOK_INJECTOR_PLUGIN_IDX",
        "HOOK_INJECTOR_HOOKS_DIRS",
        "HOOK_INJECTOR_RESCAN",
        "HOOK_INJECTOR_VERBOSE",
        "HOOK_INJECTOR_OBSERVER",
        "HOOK_INJECTOR_LOG_FORMAT",
    ];

    fn clear_env() {
        for key in KEYS {
            // SAFETY: callers hold ENV_MUTEX.
            unsafe { std::env::remove_var(key) };
        }
    }

    #[test]
    fn test_defaults_without_env() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        let config = InjectorConfig::resolve().unwrap();
        assert_eq!(config.plugin_id(), "10-hook-injector");
        assert_eq!(
            config.hook_dirs,
            vec![
                PathBuf::from("/usr/share/containers/oci/hooks.d"),
                PathBuf::from("/etc/containers/oci/hooks.d"),
            ]
        );
        assert!(config.rescan);
        assert!(!config.verbose);
        assert_eq!(config.log_format, LogFormat::Text);
    }

    #[test]
    fn test_env_overrides() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();
        // SAFETY: ENV_MUTEX held.
        unsafe {
            std::env::set_var("HOOK_INJECTOR_PLUGIN_NAME", "gpu-hooks");
            std::env::set_var("HOOK_INJECTOR_PLUGIN_IDX", "05");
            std::env::set_var("HOOK_INJECTOR_HOOKS_DIRS", "/opt/hooks.d, ,/etc/hooks.d");
            std::env::set_var("HOOK_INJECTOR_RESCAN", "off");
            std::env::set_var("HOOK_INJECTOR_VERBOSE", "1");
            std::env::set_var("HOOK_INJECTOR_LOG_FORMAT", "JSON");
        }

        let config = InjectorConfig::resolve().unwrap();
        clear_env();

        assert_eq!(config.plugin_id(), "05-gpu-hooks");
        assert_eq!(
            config.hook_dirs,
            vec![PathBuf::from("/opt/hooks.d"), PathBuf::from("/etc/hooks.d")]
        );
        assert!(!config.catalog_options().rescan);
        assert!(config.verbose);
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
        clear_env();

        // SAFETY: ENV_MUTEX held.
        unsafe { std::env::set_var("HOOK_INJECTOR_PLUGIN_IDX", "7") };
        let err = InjectorConfig::resolve().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "HOOK_INJECTOR_PLUGIN_IDX"));

        clear_env();
        // SAFETY: ENV_MUTEX held.
        unsafe { std::env::set_var("HOOK_INJECTOR_RESCAN", "sometimes") };
        let err = InjectorConfig::resolve().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "HOOK_INJECTOR_RESCAN"));

        clear_env();
        // SAFETY: ENV_MUTEX held.
        unsafe { std::env::set_var("HOOK_INJECTOR_LOG_FORMAT", "xml") };
        assert!(InjectorConfig::resolve().is_err());
        clear_env();
    }

    #[test]
    fn test_load_catalog_from_configured_dirs() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = InjectorConfig {
            hook_dirs: vec![dir.path().join("missing"), dir.path().to_path_buf()],
            ..Default::default()
        };
        assert!(config.load_catalog().unwrap().is_empty());

        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, "x").unwrap();
        let config = InjectorConfig {
            hook_dirs: vec![file],
            ..Default::default()
        };
        assert!(matches!(config.load_catalog(), Err(Error::Catalog(_))));
    }

    #[test]
    fn test_load_catalog_validates_first() {
        let config = InjectorConfig {
            plugin_index: "100".to_string(),
            hook_dirs: vec![PathBuf::from("/nonexistent/hooks.d")],
            ..Default::default()
        };
        let err = config.load_catalog().err().expect("invalid index");
        assert!(matches!(
            err,
            Error::Config(ConfigError::InvalidValue { ref key, .. })
                if key == "HOOK_INJECTOR_PLUGIN_IDX"
        ));
    }
}
