//! The health monitor: a periodic task that probes every registered target
//! and writes the result into the registry.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::{JoinHandle, JoinSet};

use crate::registry::TargetRegistry;
use crate::transport::Transport;

/// Handle to a running health monitor task. Dropping or aborting this stops
/// probing; it does not touch the registry's existing health flags.
pub struct HealthMonitorHandle {
    task: JoinHandle<()>,
}

impl HealthMonitorHandle {
    /// Stops the health monitor task.
    pub fn stop(self) {
        self.task.abort();
    }
}

/// Spawns the periodic health monitor.
///
/// Each tick probes every registered target concurrently (bounded by
/// `probe_timeout` per target) and writes the result into the registry.
/// Transitions are logged at `info`; repeated same-state results are
/// idempotent and silent.
pub fn spawn(
    registry: Arc<TargetRegistry>,
    transport: Arc<dyn Transport>,
    interval: Duration,
    probe_timeout: Duration,
) -> HealthMonitorHandle {
    let task = tokio::spawn(async move {
        loop {
            run_one_tick(&registry, &transport, probe_timeout).await;
            tokio::time::sleep(interval).await;
        }
    });
    HealthMonitorHandle { task }
}

/// Probes every registered target concurrently via a `JoinSet` and writes
/// each result into the registry.
async fn run_one_tick(registry: &Arc<TargetRegistry>, transport: &Arc<dyn Transport>, probe_timeout: Duration) {
    let snapshot = registry.snapshot();

    let mut probes = JoinSet::new();
    for target in snapshot.targets() {
        let name = target.name.clone();
        let url = target.url.clone();
        let transport = Arc::clone(transport);
        probes.spawn(async move {
            let alive = transport.probe(&url, probe_timeout).await;
            (name, alive)
        });
    }

    while let Some(result) = probes.join_next().await {
        let (name, alive) = match result {
            Ok(pair) => pair,
            Err(err) => {
                tracing::warn!(error = %err, "health probe task panicked");
                continue;
            }
        };
        match registry.set_health(&name, alive) {
            Ok(previous) => {
                if previous != alive {
                    if alive {
                        tracing::info!(target = %name, "target transitioned unhealthy -> healthy");
                    } else {
                        tracing::warn!(target = %name, "target transitioned healthy -> unhealthy");
                    }
                }
            }
            Err(err) => tracing::warn!(target = %name, error = %err, "health probe result for unknown target"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::SendOutcome;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;

    struct FakeProbeTransport {
        alive: StdMutex<HashMap<String, bool>>,
    }

    #[async_trait]
    impl Transport for FakeProbeTransport {
        async fn send(&self, _url: &str, _body: &[u8], _timeout: Duration) -> SendOutcome {
            SendOutcome::Ok(200)
        }

        async fn probe(&self, url: &str, _timeout: Duration) -> bool {
            *self.alive.lock().unwrap().get(url).unwrap_or(&true)
        }
    }

    #[tokio::test]
    async fn one_tick_writes_probe_results_into_the_registry() {
        let mut registry = TargetRegistry::new();
        registry.register("a", "http://a", 1.0).unwrap();
        registry.register("b", "http://b", 1.0).unwrap();
        let registry = Arc::new(registry);

        let mut alive = HashMap::new();
        alive.insert("http://a".to_string(), true);
        alive.insert("http://b".to_string(), false);
        let transport: Arc<dyn Transport> = Arc::new(FakeProbeTransport { alive: StdMutex::new(alive) });

        run_one_tick(&registry, &transport, Duration::from_secs(1)).await;

        let snap = registry.snapshot();
        let healthy = |name: &str| snap.targets().iter().find(|t| t.name == name).unwrap().healthy;
        assert!(healthy("a"));
        assert!(!healthy("b"));
    }

    #[tokio::test]
    async fn repeated_same_state_results_are_idempotent() {
        let mut registry = TargetRegistry::new();
        registry.register("a", "http://a", 1.0).unwrap();
        let registry = Arc::new(registry);

        let mut alive = HashMap::new();
        alive.insert("http://a".to_string(), true);
        let transport: Arc<dyn Transport> = Arc::new(FakeProbeTransport { alive: StdMutex::new(alive) });

        run_one_tick(&registry, &transport, Duration::from_secs(1)).await;
        run_one_tick(&registry, &transport, Duration::from_secs(1)).await;

        assert!(registry.snapshot().targets()[0].healthy);
    }
}
