//! Error types for the core delegation crate.

use cadre_rs_protocol::InteractionId;
use thiserror::Error;

/// Errors returned by delegation operations.
#[derive(Debug, Error)]
pub enum CadreCoreError {
    /// Interaction id is unknown to the delegator.
    #[error("unknown interaction: {0}")]
    UnknownInteraction(InteractionId),
    /// Completion call failed while classifying a message.
    #[error("classification error: {0}")]
    Classification(String),
    /// Completion call failed while running a specialist handler.
    #[error("dispatch error: {0}")]
    Dispatch(String),
    /// Record store error.
    #[error("state error: {0}")]
    State(String),
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
