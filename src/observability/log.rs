//! Tracing-based observer that emits structured log events.

use crate::observability::traits::{InjectorEvent, InjectorMetric, Observer};

/// Observer that logs events and metrics via `tracing`.
pub struct LogObserver;

impl Observer for LogObserver {
    fn record_event(&self, event: &InjectorEvent<'_>) {
        match event {
            InjectorEvent::NoHooks { container } => {
                tracing::info!(container = %container, "observer: no OCI hooks");
            }
            InjectorEvent::HooksInjected {
                container,
                hooks,
                stages,
            } => {
                let stages: Vec<&str> = stages.iter().map(|s| s.as_str()).collect();
                tracing::info!(
                    container = %container,
                    hooks = *hooks,
                    stages = ?stages,
                    "observer: OCI hooks injected"
                );
            }
            InjectorEvent::ResolveFailed { container, error } => {
                tracing::error!(
                    container = %container,
                    error = %error,
                    "observer: hook resolution failed"
                );
            }
        }
    }

    fn record_metric(&self, metric: &InjectorMetric) {
        match metric {
            InjectorMetric::ResolveLatency(d) => {
                tracing::debug!(
                    latency_us = d.as_micros() as u64,
                    "observer: metric.resolve_latency"
                );
            }
        }
    }

    fn name(&self) -> &str {
        "log"
    }
}
