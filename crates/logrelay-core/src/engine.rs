//! The engine: the single scoped value owning the registry, intake buffer,
//! statistics, and transport handle for one process.
//!
//! No ambient or global state: one value is constructed at startup and
//! handed to whatever ingestion surface and CLI wiring the deployment uses.

use std::sync::Arc;
use std::time::Duration;

use crate::buffer::{IntakeBuffer, OfferOutcome, Packet};
use crate::config::EngineConfig;
use crate::dispatcher::Dispatcher;
use crate::error::ConfigError;
use crate::health::{self, HealthMonitorHandle};
use crate::registry::TargetRegistry;
use crate::retry::RetryPolicy;
use crate::statistics::{StatsSnapshot, Statistics, TargetStats};
use crate::transport::Transport;
use crate::worker::{self, WorkerPoolHandle};

/// The dispatch engine for one process: owns the registry, intake buffer,
/// statistics, and the transport handle used to reach every target.
pub struct Engine {
    registry: Arc<TargetRegistry>,
    buffer: IntakeBuffer,
    stats: Arc<Statistics>,
    transport: Arc<dyn Transport>,
    retry_policy: RetryPolicy,
    send_timeout: Duration,
    health_interval: Duration,
    probe_timeout: Duration,
    workers: usize,
}

impl Engine {
    /// Builds an engine from a validated configuration and a transport
    /// handle. Fails with [`ConfigError`] for the same reasons
    /// [`EngineConfig::validate`] and [`TargetRegistry::register`] would.
    pub fn new(config: EngineConfig, transport: Arc<dyn Transport>) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut registry = TargetRegistry::new();
        for target in &config.targets {
            registry.register(target.name.clone(), target.url.clone(), target.weight)?;
        }

        Ok(Self {
            registry: Arc::new(registry),
            buffer: IntakeBuffer::new(config.capacity),
            stats: Arc::new(Statistics::new()),
            transport,
            retry_policy: RetryPolicy::from_retries(config.retries, config.base_delay),
            send_timeout: config.send_timeout,
            health_interval: config.health_interval,
            probe_timeout: config.probe_timeout,
            workers: config.workers,
        })
    }

    /// Offers `packet` to the intake buffer, updating `received`,
    /// `accepted`, and `rejected_overload` accordingly.
    pub async fn submit(&self, packet: Packet) -> OfferOutcome {
        self.stats.record_received();
        let outcome = self.buffer.offer(packet).await;
        match outcome {
            OfferOutcome::Accepted => self.stats.record_accepted(),
            OfferOutcome::Overloaded => self.stats.record_rejected_overload(),
            OfferOutcome::Closed => {}
        }
        outcome
    }

    /// Spawns the configured worker pool.
    pub fn spawn_workers(&self) -> WorkerPoolHandle {
        let dispatcher = Arc::new(Dispatcher::new(
            Arc::clone(&self.registry),
            Arc::clone(&self.transport),
            self.retry_policy,
            self.send_timeout,
        ));
        worker::spawn(self.workers, self.buffer.clone(), dispatcher, Arc::clone(&self.stats))
    }

    /// Spawns the periodic health monitor.
    pub fn spawn_health_monitor(&self) -> HealthMonitorHandle {
        health::spawn(Arc::clone(&self.registry), Arc::clone(&self.transport), self.health_interval, self.probe_timeout)
    }

    /// Takes a full statistics snapshot: aggregate counters, current intake
    /// depth, and a per-target breakdown.
    pub fn stats(&self) -> StatsSnapshot {
        let aggregate = self.stats.snapshot();
        let depth = self.buffer.depth();

        let counters = self.registry.counters();
        let snapshot = self.registry.snapshot();
        let per_target = counters
            .into_iter()
            .map(|(name, counters)| {
                let healthy = snapshot.targets().iter().find(|t| t.name == name).map(|t| t.healthy).unwrap_or(false);
                (name, TargetStats::new(counters, healthy))
            })
            .collect();

        StatsSnapshot { aggregate, depth, per_target }
    }

    /// Shuts the engine down: closes the intake buffer (workers drain and
    /// exit), stops the health monitor, then waits for `grace` before
    /// returning so any in-flight transport call gets a chance to finish.
    pub async fn shutdown(&self, health_monitor: HealthMonitorHandle, workers: WorkerPoolHandle, grace: Duration) {
        self.buffer.close();
        health_monitor.stop();
        tokio::select! {
            _ = workers.join() => {}
            _ = tokio::time::sleep(grace) => {
                tracing::warn!("shutdown grace period elapsed with workers still draining");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TargetSpec;
    use crate::transport::SendOutcome;
    use async_trait::async_trait;

    struct AlwaysOk;

    #[async_trait]
    impl Transport for AlwaysOk {
        async fn send(&self, _url: &str, _body: &[u8], _timeout: Duration) -> SendOutcome {
            SendOutcome::Ok(200)
        }
        async fn probe(&self, _url: &str, _timeout: Duration) -> bool {
            true
        }
    }

    fn config_with_targets(targets: Vec<TargetSpec>) -> EngineConfig {
        let mut cfg = EngineConfig::default();
        cfg.workers = 2;
        cfg.capacity = 16;
        cfg.targets = targets;
        cfg
    }

    #[test]
    fn new_rejects_invalid_config() {
        let cfg = config_with_targets(vec![]);
        let err = Engine::new(cfg, Arc::new(AlwaysOk)).unwrap_err();
        assert_eq!(err, ConfigError::NonPositiveTotalWeight(0.0));
    }

    #[tokio::test]
    async fn submit_then_stats_reflects_accepted_and_depth() {
        let cfg = config_with_targets(vec![TargetSpec { name: "a".into(), url: "http://a".into(), weight: 1.0 }]);
        let engine = Engine::new(cfg, Arc::new(AlwaysOk)).unwrap();

        let outcome = engine.submit(Packet::new("1", vec![])).await;
        assert_eq!(outcome, OfferOutcome::Accepted);

        let stats = engine.stats();
        assert_eq!(stats.aggregate.received, 1);
        assert_eq!(stats.aggregate.accepted, 1);
        assert_eq!(stats.depth, 1);
        assert_eq!(stats.per_target.len(), 1);
        assert!(stats.per_target[0].1.healthy);
    }

    #[tokio::test]
    async fn full_pipeline_delivers_submitted_packets() {
        let cfg = config_with_targets(vec![TargetSpec { name: "a".into(), url: "http://a".into(), weight: 1.0 }]);
        let engine = Engine::new(cfg, Arc::new(AlwaysOk)).unwrap();

        for i in 0..10 {
            engine.submit(Packet::new(i.to_string(), vec![])).await;
        }

        let workers = engine.spawn_workers();
        let health = engine.spawn_health_monitor();
        engine.shutdown(health, workers, Duration::from_secs(1)).await;

        let stats = engine.stats();
        assert_eq!(stats.aggregate.delivered, 10);
        assert_eq!(stats.aggregate.received, 10);
    }
}
