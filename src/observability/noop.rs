use crate::observability::traits::{InjectorEvent, InjectorMetric, Observer};

/// Discards everything.
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn record_event(&self, _event: &InjectorEvent<'_>) {}

    fn record_metric(&self, _metric: &InjectorMetric) {}

    fn name(&self) -> &str {
        "noop"
    }
}
