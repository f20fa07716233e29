//! Error types for the runtime-facing clients.

use crate::registry_actor::RegistryError;
use crate::runtime::RuntimeError;
use thiserror::Error;

/// Errors that can occur while resolving a seed to a partition.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum JoinError {
    /// The runtime rejected a create or listing call.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    /// The partition registry is unreachable.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Creation conflicted but no existing clone could be found for the seed.
    #[error("No cloned partition found for seed {0}")]
    CloneNotFound(String),

    /// Only clones that cannot be tied to the seed exist, and adoption is strict.
    #[error("Refusing to adopt an unverified partition for seed {0}")]
    UnverifiedClone(String),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProfileError {
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    #[error("Malformed profile: {0}")]
    Malformed(String),
}
