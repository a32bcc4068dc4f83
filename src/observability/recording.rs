//! Test-only observer that captures all events into a shared vector.
//!
//! Events borrow from the engine call, so they are captured in their
//! `Display` form.

use std::sync::{Arc, Mutex};

use crate::observability::traits::{InjectorEvent, InjectorMetric, Observer};

/// Observer that records all events for test assertions.
pub struct RecordingObserver {
    events: Arc<Mutex<Vec<String>>>,
    metrics: Arc<Mutex<Vec<InjectorMetric>>>,
}

impl RecordingObserver {
    /// Create a new recording observer and return handles to the captured data.
    #[allow(clippy::type_complexity)]
    pub fn new() -> (
        Self,
        Arc<Mutex<Vec<String>>>,
        Arc<Mutex<Vec<InjectorMetric>>>,
    ) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let metrics = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                events: Arc::clone(&events),
                metrics: Arc::clone(&metrics),
            },
            events,
            metrics,
        )
    }
}

impl Observer for RecordingObserver {
    fn record_event(&self, event: &InjectorEvent<'_>) {
        self.events.lock().unwrap().push(event.to_string());
    }

    fn record_metric(&self, metric: &InjectorMetric) {
        self.metrics.lock().unwrap().push(metric.clone());
    }

    fn name(&self) -> &str {
        "recording"
    }
}
