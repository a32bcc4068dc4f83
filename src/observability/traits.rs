//! Core observer trait and event/metric types.

use std::fmt;
use std::time::Duration;

use oci_hooks::{ResolveError, Stage};

/// Sink for injection lifecycle events and metrics.
///
/// The engine receives one of these at construction instead of reaching for
/// a global logger. Implementations can log through `tracing`, forward to a
/// metrics backend, or do nothing at all.
///
/// Thread-safe and cheaply cloneable behind `Arc<dyn Observer>`.
pub trait Observer: Send + Sync {
    /// Record a discrete lifecycle event.
    fn record_event(&self, event: &InjectorEvent<'_>);

    /// Record a numeric metric sample.
    fn record_metric(&self, metric: &InjectorMetric);

    /// Flush any buffered data. No-op by default.
    fn flush(&self) {}

    /// Human-readable backend name (e.g. "noop", "log").
    fn name(&self) -> &str;
}

/// `pod/container`, or just the container name when there is no pod.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerName<'a> {
    pub pod: Option<&'a str>,
    pub container: &'a str,
}

impl fmt::Display for ContainerName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.pod {
            Some(pod) => write!(f, "{}/{}", pod, self.container),
            None => f.write_str(self.container),
        }
    }
}

/// Discrete events emitted while handling a container creation.
///
/// Events borrow from the call that produced them so the no-match path stays
/// allocation free; observers that keep events must copy what they need.
#[derive(Debug, Clone, Copy)]
pub enum InjectorEvent<'a> {
    /// No hook triggered; the engine abstained.
    NoHooks { container: ContainerName<'a> },

    /// Hooks were matched and an adjustment was produced.
    HooksInjected {
        container: ContainerName<'a>,
        /// Total hook entries across all stages.
        hooks: usize,
        stages: &'a [Stage],
    },

    /// The resolver failed; no adjustment was produced.
    ResolveFailed {
        container: ContainerName<'a>,
        error: &'a ResolveError,
    },
}

impl fmt::Display for InjectorEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InjectorEvent::NoHooks { container } => write!(f, "no_hooks {container}"),
            InjectorEvent::HooksInjected {
                container,
                hooks,
                stages,
            } => {
                let stages: Vec<&str> = stages.iter().map(|s| s.as_str()).collect();
                write!(
                    f,
                    "hooks_injected {container} hooks={hooks} stages={}",
                    stages.join(",")
                )
            }
            InjectorEvent::ResolveFailed { container, error } => {
                write!(f, "resolve_failed {container}: {error}")
            }
        }
    }
}

/// Numeric samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InjectorMetric {
    /// Time spent in the resolver for one container.
    ResolveLatency(Duration),
}
