//! Aggregate, thread-safe counters.
//!
//! All counters are monotonic atomics. `Statistics` only tracks the global
//! aggregates (`received`, `accepted`, ...); per-target counters and health
//! already live in the [`crate::registry::TargetRegistry`], so a full
//! [`StatsSnapshot`] is assembled by [`crate::engine::Engine`] by combining
//! both.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::registry::TargetCounters;

/// Aggregate counters updated from the intake boundary, the dispatcher, and
/// the worker pool.
#[derive(Debug, Default)]
pub struct Statistics {
    received: AtomicU64,
    accepted: AtomicU64,
    rejected_overload: AtomicU64,
    delivered: AtomicU64,
    failed_exhausted: AtomicU64,
    no_targets: AtomicU64,
}

impl Statistics {
    /// Creates a zeroed counter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a packet offered to the intake buffer.
    pub fn record_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a packet that was enqueued.
    pub fn record_accepted(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a packet rejected because the intake buffer was full.
    pub fn record_rejected_overload(&self) {
        self.rejected_overload.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a packet successfully delivered to a target.
    pub fn record_delivered(&self) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a packet dropped after exhausting all retry attempts.
    pub fn record_failed_exhausted(&self) {
        self.failed_exhausted.fetch_add(1, Ordering::Relaxed);
    }

    /// Records a dispatch that found no eligible target at all.
    pub fn record_no_targets(&self) {
        self.no_targets.fetch_add(1, Ordering::Relaxed);
    }

    /// Takes a consistent-enough read of every aggregate counter. Each field
    /// is loaded independently, so cross-counter atomicity is not
    /// guaranteed under concurrent writers.
    pub fn snapshot(&self) -> AggregateCounts {
        AggregateCounts {
            received: self.received.load(Ordering::Relaxed),
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected_overload: self.rejected_overload.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            failed_exhausted: self.failed_exhausted.load(Ordering::Relaxed),
            no_targets: self.no_targets.load(Ordering::Relaxed),
        }
    }
}

/// A read of every aggregate counter at one point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AggregateCounts {
    /// Offered to intake.
    pub received: u64,
    /// Enqueued.
    pub accepted: u64,
    /// Refused because the intake buffer was full.
    pub rejected_overload: u64,
    /// Sent successfully.
    pub delivered: u64,
    /// Dropped after exhausting all attempts.
    pub failed_exhausted: u64,
    /// Dispatches that found no eligible target.
    pub no_targets: u64,
}

/// Per-target view exposed in a full [`StatsSnapshot`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetStats {
    /// Successful deliveries recorded for this target.
    pub delivered: u64,
    /// Failed attempts recorded for this target (inflated by retries).
    pub failed: u64,
    /// Health flag as of snapshot time.
    pub healthy: bool,
}

impl TargetStats {
    /// Combines a registry counter read with a health flag.
    pub fn new(counters: TargetCounters, healthy: bool) -> Self {
        Self { delivered: counters.delivered, failed: counters.failed, healthy }
    }
}

/// The full read-only statistics view: aggregate counters, current intake
/// depth, and a per-target breakdown.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsSnapshot {
    /// Aggregate counters.
    pub aggregate: AggregateCounts,
    /// Current intake buffer occupancy.
    pub depth: usize,
    /// Per-target delivered/failed/healthy, in registration order.
    pub per_target: Vec<(String, TargetStats)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero() {
        let stats = Statistics::new();
        assert_eq!(stats.snapshot(), AggregateCounts::default());
    }

    #[test]
    fn counters_are_monotonic() {
        let stats = Statistics::new();
        stats.record_received();
        stats.record_received();
        stats.record_accepted();
        stats.record_rejected_overload();
        stats.record_delivered();
        stats.record_failed_exhausted();
        stats.record_no_targets();

        let snap = stats.snapshot();
        assert_eq!(snap.received, 2);
        assert_eq!(snap.accepted, 1);
        assert_eq!(snap.rejected_overload, 1);
        assert_eq!(snap.delivered, 1);
        assert_eq!(snap.failed_exhausted, 1);
        assert_eq!(snap.no_targets, 1);
    }

    #[test]
    fn snapshot_called_twice_without_mutation_is_stable() {
        let stats = Statistics::new();
        stats.record_received();
        assert_eq!(stats.snapshot(), stats.snapshot());
    }
}
