//! The target registry: the authoritative, mutable set of analyzer targets.
//!
//! Health flags are the only thing mutated after startup (by the health
//! monitor); everything else is read through cheap, immutable snapshots so
//! selection and sending never happen under a held lock.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use crate::error::{ConfigError, UnknownTarget};

/// One downstream analyzer endpoint.
#[derive(Debug)]
struct TargetState {
    name: String,
    url: String,
    weight: f64,
    healthy: AtomicBool,
    delivered: AtomicU64,
    failed: AtomicU64,
}

/// Immutable, cheap-to-clone view of one target at snapshot time.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetView {
    /// Stable identifier, unique within the registry.
    pub name: String,
    /// Opaque URL passed to the transport adapter.
    pub url: String,
    /// Configured weight (immutable post-registration).
    pub weight: f64,
    /// Health flag as of the moment this snapshot was taken.
    pub healthy: bool,
}

/// Per-target delivered/failed counters as of snapshot time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetCounters {
    /// Successful deliveries recorded for this target.
    pub delivered: u64,
    /// Failed attempts recorded for this target (inflated by retries).
    pub failed: u64,
}

/// An immutable copy of the registry state, used for lock-free selection.
///
/// Snapshots are cheap: a `Vec` of small, `Clone`-able views plus the
/// pre-summed weight of the currently eligible (healthy, positive-weight)
/// targets.
#[derive(Debug, Clone)]
pub struct RegistrySnapshot {
    targets: Vec<TargetView>,
    eligible_weight: f64,
}

impl RegistrySnapshot {
    /// All targets, in registration order.
    pub fn targets(&self) -> &[TargetView] {
        &self.targets
    }

    /// Summed weight of targets that are healthy and have `weight > 0`, as
    /// of the moment this snapshot was taken. The selector recomputes its
    /// own sum over whatever subset survives its exclusion-set filter, but
    /// this is the registry's own eligible total per §4.1.
    pub fn eligible_weight(&self) -> f64 {
        self.eligible_weight
    }
}

/// The authoritative mutable set of analyzer targets.
///
/// `register` is only ever called during startup; at steady state the only
/// mutation is [`TargetRegistry::set_health`], performed by the health
/// monitor. Reads go through [`TargetRegistry::snapshot`].
#[derive(Debug, Default)]
pub struct TargetRegistry {
    targets: Vec<Arc<TargetState>>,
}

impl TargetRegistry {
    /// Creates an empty registry. Use [`TargetRegistry::register`] to add
    /// targets, then validate the total weight before serving traffic.
    pub fn new() -> Self {
        Self { targets: Vec::new() }
    }

    /// Registers a target with `healthy = true`.
    ///
    /// Fails with [`ConfigError::DuplicateTarget`] if `name` is already
    /// registered.
    pub fn register(&mut self, name: impl Into<String>, url: impl Into<String>, weight: f64) -> Result<(), ConfigError> {
        let name = name.into();
        if self.targets.iter().any(|t| t.name == name) {
            return Err(ConfigError::DuplicateTarget(name));
        }
        self.targets.push(Arc::new(TargetState {
            name,
            url: url.into(),
            weight,
            healthy: AtomicBool::new(true),
            delivered: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }));
        Ok(())
    }

    /// Returns the number of registered targets.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Returns true if no targets are registered.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Sum of the configured weights across every registered target,
    /// irrespective of health. Used at construction time to validate
    /// `sum(weight) > 0`.
    pub fn total_configured_weight(&self) -> f64 {
        self.targets.iter().map(|t| t.weight).sum()
    }

    /// Takes an immutable snapshot of every target's current name, url,
    /// weight, and health flag. Cheap: the snapshot holds no locks and is
    /// safe to read across an `.await` point or a network call.
    pub fn snapshot(&self) -> RegistrySnapshot {
        let targets: Vec<TargetView> = self
            .targets
            .iter()
            .map(|t| TargetView {
                name: t.name.clone(),
                url: t.url.clone(),
                weight: t.weight,
                healthy: t.healthy.load(Ordering::Acquire),
            })
            .collect();
        let eligible_weight = targets.iter().filter(|t| t.healthy && t.weight > 0.0).map(|t| t.weight).sum();
        RegistrySnapshot { targets, eligible_weight }
    }

    /// Atomically updates the health flag for `name`.
    ///
    /// Returns the previous health value so callers can log only on actual
    /// transitions. Fails with [`UnknownTarget`] if `name` was never
    /// registered.
    pub fn set_health(&self, name: &str, healthy: bool) -> Result<bool, UnknownTarget> {
        let target = self
            .targets
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| UnknownTarget(name.to_string()))?;
        Ok(target.healthy.swap(healthy, Ordering::AcqRel))
    }

    /// Records a successful delivery against `name`.
    pub fn record_delivered(&self, name: &str) -> Result<(), UnknownTarget> {
        let target = self
            .targets
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| UnknownTarget(name.to_string()))?;
        target.delivered.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Records a failed attempt against `name`.
    pub fn record_failed(&self, name: &str) -> Result<(), UnknownTarget> {
        let target = self
            .targets
            .iter()
            .find(|t| t.name == name)
            .ok_or_else(|| UnknownTarget(name.to_string()))?;
        target.failed.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Reads the current delivered/failed counters for every target, in
    /// registration order, paired with each target's name.
    pub fn counters(&self) -> Vec<(String, TargetCounters)> {
        self.targets
            .iter()
            .map(|t| {
                (
                    t.name.clone(),
                    TargetCounters {
                        delivered: t.delivered.load(Ordering::Relaxed),
                        failed: t.failed.load(Ordering::Relaxed),
                    },
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_rejects_duplicate_names() {
        let mut registry = TargetRegistry::new();
        registry.register("a", "http://a", 1.0).unwrap();
        let err = registry.register("a", "http://a2", 2.0).unwrap_err();
        assert_eq!(err, ConfigError::DuplicateTarget("a".to_string()));
    }

    #[test]
    fn snapshot_reflects_registration_order_and_initial_health() {
        let mut registry = TargetRegistry::new();
        registry.register("a", "http://a", 1.0).unwrap();
        registry.register("b", "http://b", 2.0).unwrap();

        let snap = registry.snapshot();
        let names: Vec<_> = snap.targets().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(snap.targets().iter().all(|t| t.healthy));
    }

    #[test]
    fn eligible_weight_excludes_unhealthy_and_zero_weight_targets() {
        let mut registry = TargetRegistry::new();
        registry.register("a", "http://a", 0.4).unwrap();
        registry.register("b", "http://b", 0.3).unwrap();
        registry.register("c", "http://c", 0.0).unwrap();
        registry.set_health("b", false).unwrap();

        let snap = registry.snapshot();
        assert_eq!(snap.eligible_weight(), 0.4);
    }

    #[test]
    fn set_health_is_visible_to_subsequent_snapshots() {
        let mut registry = TargetRegistry::new();
        registry.register("a", "http://a", 1.0).unwrap();

        let before = registry.set_health("a", false).unwrap();
        assert!(before, "target should have started healthy");

        let snap = registry.snapshot();
        assert!(!snap.targets()[0].healthy);
    }

    #[test]
    fn set_health_unknown_target_errors() {
        let registry = TargetRegistry::new();
        let err = registry.set_health("missing", false).unwrap_err();
        assert_eq!(err, UnknownTarget("missing".to_string()));
    }

    #[test]
    fn counters_start_at_zero_and_increment() {
        let mut registry = TargetRegistry::new();
        registry.register("a", "http://a", 1.0).unwrap();

        registry.record_delivered("a").unwrap();
        registry.record_delivered("a").unwrap();
        registry.record_failed("a").unwrap();

        let counters = registry.counters();
        assert_eq!(counters.len(), 1);
        assert_eq!(counters[0].0, "a");
        assert_eq!(counters[0].1.delivered, 2);
        assert_eq!(counters[0].1.failed, 1);
    }

    #[test]
    fn flipping_health_twice_matches_never_flipping() {
        let mut registry = TargetRegistry::new();
        registry.register("a", "http://a", 1.0).unwrap();
        let baseline = registry.snapshot();

        registry.set_health("a", false).unwrap();
        registry.set_health("a", true).unwrap();
        let after = registry.snapshot();

        assert_eq!(baseline.targets(), after.targets());
    }
}
