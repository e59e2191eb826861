//! The transport adapter boundary.
//!
//! The actual HTTP client (and the HTTP ingestion surface on the other side
//! of the engine) is deliberately external to this crate: the dispatch
//! engine only needs something that can send bytes to a URL and report back
//! a classified outcome, and something that can answer "is this target
//! alive". A concrete `reqwest`-backed implementation lives in the wiring
//! crate that constructs the engine.

use std::time::Duration;

use async_trait::async_trait;

/// Outcome of a single send attempt, as reported by the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The target responded with the given HTTP status code.
    Ok(u16),
    /// A network-level failure (connection reset, DNS failure, etc.).
    NetworkError,
    /// The attempt did not complete within the requested timeout.
    Timeout,
}

/// Sends packets to targets and probes target health. Implemented outside
/// this crate; see module docs.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `body` to `url`, aborting after `timeout` if no outcome is
    /// available by then.
    async fn send(&self, url: &str, body: &[u8], timeout: Duration) -> SendOutcome;

    /// Probes whether `url` is currently reachable, aborting after
    /// `timeout`. Returns `true` iff the target should be considered
    /// healthy.
    async fn probe(&self, url: &str, timeout: Duration) -> bool;
}
