//! NRI hook injector.
//!
//! A container runtime plugin that consults `hooks.d` style OCI hook
//! definitions on every container creation and, when any of them trigger,
//! answers with an adjustment appending those hooks to the container spec.
//!
//! - [`injector`]: the stateless engine turning a resolver match set into a [`SpecAdjustment`]
//! - [`plugin`]: the runtime-facing adapter and its JSON-lines transport
//! - [`observability`]: the logging capability handed to the engine
//! - [`config`]: environment-driven settings
//!
//! Hook definitions, trigger evaluation, and the directory catalog live in
//! the [`oci_hooks`] crate.

pub mod config;
pub mod error;
pub mod injector;
pub mod observability;
pub mod plugin;

pub use config::InjectorConfig;
pub use error::{ConfigError, Error, InjectError, PluginError};
pub use injector::{ContainerCreationContext, HookInjector, SpecAdjustment};
pub use plugin::{
    Container, ContainerAdjustment, ContainerPlugin, ContainerUpdate, HookInjectorPlugin,
    PodSandbox,
};
