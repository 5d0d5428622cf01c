//! Relay error types.
//!
//! [`RelayError`] covers configuration and frame serialization failures.
//! Per-peer delivery failures are modeled separately by
//! [`crate::domain::SendError`]; they are recovered inside the registry and
//! never reach a caller.

/// Process-level error enum.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// An environment setting was present but unusable.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// An outbound message could not be encoded as JSON.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
