//! Error types reported by the ledger runtime.

use thiserror::Error;

/// Errors that can occur on any call through a [`RuntimeClient`](super::RuntimeClient).
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RuntimeError {
    /// A partition with the same scope (role + network seed) already exists.
    #[error("DuplicateCellId: partition already exists for seed {0}")]
    DuplicateConflict(String),

    /// The target partition or role is not installed in this runtime.
    #[error("Cell not found: {0}")]
    CellNotFound(String),

    /// A remote function returned an error.
    #[error("Zome call {zome}/{function} failed: {message}")]
    ZomeCall {
        zome: String,
        function: String,
        message: String,
    },

    /// A payload or response could not be encoded or decoded at the boundary.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The connection to the runtime failed.
    #[error("Transport error: {0}")]
    Transport(String),
}

impl RuntimeError {
    /// True for a duplicate-creation conflict, including transports that only
    /// surface the runtime's `DuplicateCellId` text.
    pub fn is_duplicate_conflict(&self) -> bool {
        match self {
            RuntimeError::DuplicateConflict(_) => true,
            RuntimeError::Transport(message) => message.contains("DuplicateCellId"),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_conflict_detected_from_transport_text() {
        assert!(RuntimeError::DuplicateConflict("s".into()).is_duplicate_conflict());
        assert!(RuntimeError::Transport("ribosome: DuplicateCellId(..)".into()).is_duplicate_conflict());
        assert!(!RuntimeError::Transport("connection reset".into()).is_duplicate_conflict());
        assert!(!RuntimeError::CellNotFound("x".into()).is_duplicate_conflict());
    }
}
