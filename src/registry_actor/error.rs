//! Error types for the partition registry.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum RegistryError {
    /// The registry actor is no longer accepting requests.
    #[error("Registry actor closed")]
    ActorClosed,

    /// The registry actor dropped the response channel.
    #[error("Registry actor dropped response channel")]
    ActorDropped,
}
