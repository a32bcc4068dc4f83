//! Observability subsystem: trait-based event and metric recording.
//!
//! | Backend | Description |
//! |---------|-------------|
//! | `noop`  | Zero overhead, discards everything |
//! | `log`   | Emits structured events via `tracing` (default) |
//!
//! [`create_observer`] builds the backend named in the configuration.

mod log;
mod noop;
pub mod traits;

#[cfg(test)]
pub mod recording;

use std::sync::Arc;

pub use self::log::LogObserver;
pub use self::noop::NoopObserver;
pub use self::traits::{ContainerName, InjectorEvent, InjectorMetric, Observer};

/// Build an observer from its backend name.
///
/// Unknown names fall back to `noop` with a warning.
pub fn create_observer(backend: &str) -> Arc<dyn Observer> {
    match backend.trim().to_ascii_lowercase().as_str() {
        "log" => Arc::new(LogObserver),
        "none" | "noop" | "" => Arc::new(NoopObserver),
        other => {
            tracing::warn!(
                backend = other,
                "Unknown observability backend, falling back to noop"
            );
            Arc::new(NoopObserver)
        }
    }
}
