use std::sync::Arc;
use std::time::Instant;

use oci_hooks::{HookResolver, Stage};

use crate::error::InjectError;
use crate::injector::{ContainerCreationContext, SpecAdjustment};
use crate::observability::{InjectorEvent, InjectorMetric, Observer};

/// Stateless translator from resolver matches to spec adjustments.
///
/// Holds only the resolver and observer handed to it at startup, so a single
/// instance can serve concurrent container creations.
pub struct HookInjector {
    resolver: Arc<dyn HookResolver>,
    observer: Arc<dyn Observer>,
}

impl HookInjector {
    pub fn new(resolver: Arc<dyn HookResolver>, observer: Arc<dyn Observer>) -> Self {
        Self { resolver, observer }
    }

    /// Work out the hooks to add for one container creation.
    ///
    /// Returns `Ok(None)` when no hook applies. A resolver failure yields an
    /// error and no adjustment at all; there is no partial injection.
    /// Hooks already present in the spec are not deduplicated against.
    pub fn inject(
        &self,
        ctx: &ContainerCreationContext<'_>,
    ) -> Result<Option<SpecAdjustment>, InjectError> {
        let container = ctx.container_name();

        let started = Instant::now();
        let resolved = self.resolver.resolve(ctx.spec);
        self.observer
            .record_metric(&InjectorMetric::ResolveLatency(started.elapsed()));

        let matched = match resolved {
            Ok(matched) => matched,
            Err(error) => {
                self.observer.record_event(&InjectorEvent::ResolveFailed {
                    container,
                    error: &error,
                });
                return Err(InjectError::Resolution {
                    container: container.to_string(),
                    source: error,
                });
            }
        };

        let Some(matched) = matched else {
            self.observer
                .record_event(&InjectorEvent::NoHooks { container });
            return Ok(None);
        };

        let adjustment = SpecAdjustment::from(matched);
        let stages: Vec<Stage> = adjustment.stages();
        self.observer.record_event(&InjectorEvent::HooksInjected {
            container,
            hooks: adjustment.len(),
            stages: &stages,
        });

        Ok(Some(adjustment))
    }
}
