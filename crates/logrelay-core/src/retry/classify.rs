//! Classifies a transport [`SendOutcome`] into a retry/permanent decision.
//!
//! Knows nothing about HTTP clients or sleeping; it only maps an outcome to
//! one of three buckets.

use crate::transport::SendOutcome;

/// How the dispatcher should react to a single send attempt's outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// 2xx status: the packet was delivered.
    Delivered,
    /// 408, 429, 5xx, or a network/timeout error: worth retrying on a
    /// different target.
    Retriable,
    /// Any other 4xx: the payload is defective, retrying cannot help.
    Permanent,
}

/// Classifies `outcome` into a retry bucket.
///
/// 408 and 429 are treated as retriable (consistent with widespread
/// convention); every other 4xx is permanent.
pub fn classify(outcome: SendOutcome) -> Classification {
    match outcome {
        SendOutcome::Ok(status) if (200..300).contains(&status) => Classification::Delivered,
        SendOutcome::Ok(408) | SendOutcome::Ok(429) => Classification::Retriable,
        SendOutcome::Ok(status) if (500..600).contains(&status) => Classification::Retriable,
        SendOutcome::Ok(_) => Classification::Permanent,
        SendOutcome::NetworkError | SendOutcome::Timeout => Classification::Retriable,
    }
}
