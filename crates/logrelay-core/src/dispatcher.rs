//! The dispatcher: ties the selector and transport together with bounded,
//! exponential-backoff retries across distinct targets.

use std::sync::Arc;
use std::time::Duration;

use crate::buffer::Packet;
use crate::registry::TargetRegistry;
use crate::retry::{classify, Classification, RetryPolicy};
use crate::selector;
use crate::transport::Transport;

/// Why a dispatch ended without delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExhaustReason {
    /// The last attempt returned a permanent (non-retriable) failure.
    ClientError,
    /// All configured attempts were used without success.
    RetriesExhausted,
}

/// Outcome of one [`Dispatcher::dispatch`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// The packet was delivered to `target_name`.
    Delivered { target_name: String },
    /// The packet was not delivered after `attempts` tries; `last_target`
    /// is the target that produced the final outcome.
    Exhausted { last_target: String, attempts: u32, reason: ExhaustReason },
    /// No eligible target could be found at all (the excluded-set consumed
    /// every candidate, or none were healthy/positive-weight to begin
    /// with); zero transport calls were made on the attempt that hit this.
    NoTargets,
}

/// Selects a target, sends, classifies, and retries across distinct targets
/// up to a bounded attempt count.
pub struct Dispatcher {
    registry: Arc<TargetRegistry>,
    transport: Arc<dyn Transport>,
    retry_policy: RetryPolicy,
    send_timeout: Duration,
}

impl Dispatcher {
    /// Builds a dispatcher over `registry`, sending through `transport`.
    pub fn new(
        registry: Arc<TargetRegistry>,
        transport: Arc<dyn Transport>,
        retry_policy: RetryPolicy,
        send_timeout: Duration,
    ) -> Self {
        Self { registry, transport, retry_policy, send_timeout }
    }

    /// Dispatches `packet`, retrying across distinct targets with backoff.
    pub async fn dispatch(&self, packet: &Packet) -> DispatchOutcome {
        let mut excluded: Vec<String> = Vec::new();
        let mut attempt_index: u32 = 0;

        loop {
            let snapshot = self.registry.snapshot();
            let target_name = match selector::select(&snapshot, &excluded) {
                Ok(name) => name.to_string(),
                Err(_) => {
                    tracing::debug!(packet_id = %packet.id, "dispatch found no eligible target");
                    return DispatchOutcome::NoTargets;
                }
            };
            let target_url = snapshot
                .targets()
                .iter()
                .find(|t| t.name == target_name)
                .map(|t| t.url.clone())
                .expect("selector returned a name present in its own snapshot");

            let outcome = self.transport.send(&target_url, &packet.body, self.send_timeout).await;
            let classification = classify(outcome);

            match classification {
                Classification::Delivered => {
                    let _ = self.registry.record_delivered(&target_name);
                    tracing::debug!(packet_id = %packet.id, target = %target_name, "packet delivered");
                    return DispatchOutcome::Delivered { target_name };
                }
                Classification::Permanent => {
                    let _ = self.registry.record_failed(&target_name);
                    tracing::warn!(
                        packet_id = %packet.id, target = %target_name,
                        "permanent failure, not retrying"
                    );
                    return DispatchOutcome::Exhausted {
                        last_target: target_name,
                        attempts: attempt_index + 1,
                        reason: ExhaustReason::ClientError,
                    };
                }
                Classification::Retriable => {
                    let _ = self.registry.record_failed(&target_name);
                    excluded.push(target_name.clone());

                    if !self.retry_policy.has_attempts_remaining(attempt_index) {
                        tracing::warn!(
                            packet_id = %packet.id, target = %target_name,
                            attempts = attempt_index + 1,
                            "retries exhausted"
                        );
                        return DispatchOutcome::Exhausted {
                            last_target: target_name,
                            attempts: attempt_index + 1,
                            reason: ExhaustReason::RetriesExhausted,
                        };
                    }

                    let delay = self.retry_policy.backoff_delay(attempt_index);
                    tracing::debug!(
                        packet_id = %packet.id, target = %target_name,
                        delay_ms = delay.as_millis() as u64,
                        "retriable failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    attempt_index += 1;
                }
            }
        }
    }
}
