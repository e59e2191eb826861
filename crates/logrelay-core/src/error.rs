//! Error taxonomy for the dispatch engine.

use thiserror::Error;

/// Errors that abort construction of the engine. Fatal; the process should
/// refuse to start rather than run with a malformed registry.
///
/// Does not derive `Eq`: `NonPositiveTotalWeight`/`NonPositiveValue` carry an
/// `f64`, which only has a partial equality.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    /// Two targets were registered under the same name.
    #[error("duplicate target name: {0}")]
    DuplicateTarget(String),

    /// The registered targets summed to a non-positive weight, so no
    /// target could ever be selected.
    #[error("total target weight must be > 0, got {0}")]
    NonPositiveTotalWeight(f64),

    /// A numeric configuration value that must be positive was zero or
    /// negative.
    #[error("{field} must be > 0, got {value}")]
    NonPositiveValue {
        /// Name of the offending configuration field.
        field: &'static str,
        /// The value that was rejected.
        value: f64,
    },

    /// `workers` was zero; at least one worker is required to drain the
    /// intake buffer.
    #[error("workers must be >= 1, got {0}")]
    NoWorkers(usize),

    /// An I/O failure while loading or preparing ambient resources (e.g.
    /// the log file); not a validation error in the registry itself.
    #[error("I/O error: {0}")]
    Io(String),
}

/// Unknown-target error returned by registry operations that address a
/// target by name.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown target: {0}")]
pub struct UnknownTarget(pub String);

/// Outcome of a single Selector draw.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("no healthy target available")]
pub struct NoHealthyTarget;
