//! In-memory, validated engine configuration.
//!
//! This crate never touches the filesystem; parsing a config file into
//! [`EngineConfig`] is the outer wiring crate's job (process bootstrap is an
//! external concern). `EngineConfig` is what [`crate::engine::Engine::new`]
//! actually accepts, and is where the `ConfigError` validation rules from the
//! error taxonomy are enforced.

use std::time::Duration;

use crate::error::ConfigError;

/// One configured downstream analyzer target, as read from config.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetSpec {
    /// Stable identifier, unique within the registry.
    pub name: String,
    /// Opaque URL passed to the transport adapter.
    pub url: String,
    /// Configured weight; zero means "never selected".
    pub weight: f64,
}

/// Validated, in-memory configuration for one [`crate::engine::Engine`].
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Size of the worker pool.
    pub workers: usize,
    /// Intake buffer capacity.
    pub capacity: usize,
    /// Additional attempts after the first; total attempts = `retries + 1`.
    pub retries: u32,
    /// First backoff interval; subsequent intervals are `base_delay * 2^k`.
    pub base_delay: Duration,
    /// Per-attempt transport send timeout.
    pub send_timeout: Duration,
    /// Health monitor tick period.
    pub health_interval: Duration,
    /// Per-probe transport timeout.
    pub probe_timeout: Duration,
    /// Configured targets, in the order they should be registered.
    pub targets: Vec<TargetSpec>,
}

impl EngineConfig {
    /// Validates this configuration, returning the first violated rule.
    ///
    /// Mirrors the registry's own construction-time checks so a caller can
    /// fail fast before even building an [`crate::engine::Engine`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::NoWorkers(self.workers));
        }
        if self.capacity == 0 {
            return Err(ConfigError::NonPositiveValue { field: "capacity", value: self.capacity as f64 });
        }
        if self.base_delay.is_zero() {
            return Err(ConfigError::NonPositiveValue { field: "base_delay", value: 0.0 });
        }
        if self.send_timeout.is_zero() {
            return Err(ConfigError::NonPositiveValue { field: "send_timeout", value: 0.0 });
        }
        if self.health_interval.is_zero() {
            return Err(ConfigError::NonPositiveValue { field: "health_interval", value: 0.0 });
        }
        if self.probe_timeout.is_zero() {
            return Err(ConfigError::NonPositiveValue { field: "probe_timeout", value: 0.0 });
        }

        let mut seen = std::collections::HashSet::new();
        for target in &self.targets {
            if !seen.insert(target.name.as_str()) {
                return Err(ConfigError::DuplicateTarget(target.name.clone()));
            }
        }

        let total_weight: f64 = self.targets.iter().map(|t| t.weight).sum();
        if total_weight <= 0.0 {
            return Err(ConfigError::NonPositiveTotalWeight(total_weight));
        }

        Ok(())
    }
}

impl Default for EngineConfig {
    /// A usable starting point with no targets configured (the operator
    /// must fill those in).
    fn default() -> Self {
        Self {
            workers: 10,
            capacity: 4096,
            retries: 2,
            base_delay: Duration::from_millis(500),
            send_timeout: Duration::from_secs(5),
            health_interval: Duration::from_secs(5),
            probe_timeout: Duration::from_secs(2),
            targets: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(name: &str, weight: f64) -> TargetSpec {
        TargetSpec { name: name.to_string(), url: format!("http://{name}"), weight }
    }

    #[test]
    fn default_config_has_no_targets_and_is_otherwise_valid() {
        let cfg = EngineConfig::default();
        assert_eq!(cfg.workers, 10);
        assert!(cfg.targets.is_empty());
        // No targets means total weight is zero; validate should reject this.
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_accepts_a_well_formed_config() {
        let mut cfg = EngineConfig::default();
        cfg.targets = vec![target("a", 0.5), target("b", 0.5)];
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_duplicate_target_names() {
        let mut cfg = EngineConfig::default();
        cfg.targets = vec![target("a", 1.0), target("a", 2.0)];
        assert_eq!(cfg.validate().unwrap_err(), ConfigError::DuplicateTarget("a".to_string()));
    }

    #[test]
    fn validate_rejects_zero_workers() {
        let mut cfg = EngineConfig::default();
        cfg.targets = vec![target("a", 1.0)];
        cfg.workers = 0;
        assert_eq!(cfg.validate().unwrap_err(), ConfigError::NoWorkers(0));
    }

    #[test]
    fn validate_rejects_all_zero_weights() {
        let mut cfg = EngineConfig::default();
        cfg.targets = vec![target("a", 0.0), target("b", 0.0)];
        assert_eq!(cfg.validate().unwrap_err(), ConfigError::NonPositiveTotalWeight(0.0));
    }
}
