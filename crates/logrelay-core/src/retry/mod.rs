//! Retry and backoff policy.
//!
//! This module encapsulates outcome classification (which send outcomes are
//! retriable vs. permanent) and exponential backoff decisions, kept separate
//! from the dispatch loop so each half can be tested without a transport.

mod classify;
mod policy;

pub use classify::{classify, Classification};
pub use policy::RetryPolicy;
