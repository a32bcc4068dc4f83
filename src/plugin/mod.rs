//! Runtime-facing adapter.
//!
//! The runtime's plugin protocol is reduced to a single capability,
//! [`ContainerPlugin::create_container`], which any transport can drive. The
//! bundled transport is [`stdio`], a JSON-lines loop over stdin/stdout.

pub mod stdio;

use std::collections::BTreeMap;

use async_trait::async_trait;
use oci_hooks::{Hooks, Mount, Process, Spec};
use serde::{Deserialize, Serialize};

use crate::error::PluginError;
use crate::injector::{ContainerCreationContext, HookInjector, ObjectMeta};

/// Pod sandbox a container is being created in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PodSandbox {
    pub id: String,
    pub name: String,
    pub uid: String,
    pub namespace: String,
    pub annotations: BTreeMap<String, String>,
}

/// Container being created, as the runtime describes it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Container {
    pub id: String,
    pub pod_sandbox_id: String,
    pub name: String,
    pub annotations: BTreeMap<String, String>,
    pub args: Vec<String>,
    pub env: Vec<String>,
    pub mounts: Vec<Mount>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hooks: Option<Hooks>,
}

impl Container {
    /// Spec view hook triggers are evaluated against.
    pub fn to_oci_spec(&self) -> Spec {
        Spec {
            process: Some(Process {
                args: self.args.clone(),
                env: self.env.clone(),
            }),
            mounts: self.mounts.clone(),
            annotations: self.annotations.clone(),
            hooks: self.hooks.clone(),
            ..Default::default()
        }
    }
}

/// Changes a plugin asks the runtime to make to the container being created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerAdjustment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hooks: Option<Hooks>,
}

impl ContainerAdjustment {
    /// Append `hooks` to whatever this adjustment already carries.
    pub fn add_hooks(&mut self, hooks: Hooks) {
        self.hooks.get_or_insert_with(Hooks::default).append(hooks);
    }
}

/// Update to an already existing container.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerUpdate {
    pub container_id: String,
    #[serde(default)]
    pub ignore_failure: bool,
}

/// A container runtime plugin handling container creation.
#[async_trait]
pub trait ContainerPlugin: Send + Sync {
    /// Name the plugin registers under.
    fn name(&self) -> &str;

    /// Called for every container creation.
    ///
    /// `Ok((None, None))` means the plugin has nothing to change.
    async fn create_container(
        &self,
        pod: &PodSandbox,
        container: &Container,
    ) -> Result<(Option<ContainerAdjustment>, Option<Vec<ContainerUpdate>>), PluginError>;
}

/// Injects OCI hooks into containers as they are created.
pub struct HookInjectorPlugin {
    name: String,
    injector: HookInjector,
    verbose: bool,
}

impl HookInjectorPlugin {
    pub fn new(name: impl Into<String>, injector: HookInjector, verbose: bool) -> Self {
        Self {
            name: name.into(),
            injector,
            verbose,
        }
    }

    fn dump(&self, pod: &PodSandbox, container: &Container) {
        if !self.verbose {
            return;
        }
        match (serde_json::to_string(pod), serde_json::to_string(container)) {
            (Ok(pod), Ok(container)) => {
                tracing::debug!(pod = %pod, container = %container, "CreateContainer")
            }
            (Err(e), _) | (_, Err(e)) => {
                tracing::debug!(error = %e, "Failed to dump CreateContainer request")
            }
        }
    }
}

#[async_trait]
impl ContainerPlugin for HookInjectorPlugin {
    fn name(&self) -> &str {
        &self.name
    }

    async fn create_container(
        &self,
        pod: &PodSandbox,
        container: &Container,
    ) -> Result<(Option<ContainerAdjustment>, Option<Vec<ContainerUpdate>>), PluginError> {
        self.dump(pod, container);

        let spec = container.to_oci_spec();
        let ctx = ContainerCreationContext {
            pod: Some(ObjectMeta {
                name: &pod.name,
                annotations: &pod.annotations,
            }),
            container: ObjectMeta {
                name: &container.name,
                annotations: &container.annotations,
            },
            spec: &spec,
        };

        let Some(adjustment) = self.injector.inject(&ctx)? else {
            return Ok((None, None));
        };

        let mut adjust = ContainerAdjustment::default();
        adjust.add_hooks(adjustment.into_hooks());
        Ok((Some(adjust), None))
    }
}
