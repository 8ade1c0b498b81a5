use super::provider::IdentifierKey;

use thiserror::Error;

/// Failures inside the monitoring loop. Neither kind is ever fatal: an
/// unavailable identifier is recorded as `N/A` and an iteration fault is
/// logged before the loop resumes at the next tick.
#[derive(Debug, Error)]
pub enum Error {
    #[error("identifier {key} unavailable: {reason}")]
    IdentifierUnavailable { key: IdentifierKey, reason: String },
    #[error("poll iteration fault: {0}")]
    LoopIterationFault(String),
}
