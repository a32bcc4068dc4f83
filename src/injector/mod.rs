//! Hook injection engine.
//!
//! On every container creation the engine asks a [`HookResolver`] which
//! hooks apply to the container's spec and translates the answer into a
//! [`SpecAdjustment`]. When nothing applies it returns `None`: the engine
//! abstains rather than answering with an empty adjustment.
//!
//! [`HookResolver`]: oci_hooks::HookResolver

mod adjustment;
mod engine;

use std::collections::BTreeMap;

use oci_hooks::Spec;

use crate::observability::ContainerName;

pub use adjustment::SpecAdjustment;
pub use engine::HookInjector;

/// Name and annotations of a pod or container.
#[derive(Debug, Clone, Copy)]
pub struct ObjectMeta<'a> {
    pub name: &'a str,
    pub annotations: &'a BTreeMap<String, String>,
}

/// Read-only view of one container creation.
#[derive(Debug, Clone, Copy)]
pub struct ContainerCreationContext<'a> {
    pub pod: Option<ObjectMeta<'a>>,
    pub container: ObjectMeta<'a>,
    /// The spec under construction; this is what hook triggers see.
    pub spec: &'a Spec,
}

impl<'a> ContainerCreationContext<'a> {
    pub fn container_name(&self) -> ContainerName<'a> {
        ContainerName {
            pod: self.pod.map(|p| p.name),
            container: self.container.name,
        }
    }
}
