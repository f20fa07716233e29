//! Error types for the order services.

use crate::clients::JoinError;
use crate::registry_actor::RegistryError;
use crate::runtime::RuntimeError;
use thiserror::Error;

/// Typed failure result of every [`OrderAggregator`](super::OrderAggregator) operation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    /// The runtime session has not been set yet.
    #[error("Client not initialized: set a client before calling {operation}")]
    NotInitialized { operation: &'static str },

    #[error("Failed to join cart partition: {0}")]
    Join(#[from] JoinError),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}
