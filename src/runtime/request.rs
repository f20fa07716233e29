//! Typed request schemas for runtime calls.

use crate::model::{PartitionHandle, Seed};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartitionModifiers {
    pub network_seed: Seed,
}

/// Request to clone a role's template into a new partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatePartitionRequest {
    pub role_name: String,
    pub modifiers: PartitionModifiers,
    pub name: String,
}

impl CreatePartitionRequest {
    pub fn new(role_name: impl Into<String>, seed: Seed, name: impl Into<String>) -> Self {
        Self {
            role_name: role_name.into(),
            modifiers: PartitionModifiers { network_seed: seed },
            name: name.into(),
        }
    }

    pub fn seed(&self) -> &Seed {
        &self.modifiers.network_seed
    }
}

/// Where a remote call is routed: the provisioned cell of a role, or a specific partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CallTarget {
    Role(String),
    Partition(PartitionHandle),
}

impl CallTarget {
    pub fn role(role: impl Into<String>) -> Self {
        CallTarget::Role(role.into())
    }
}

/// A remote function invocation with a msgpack-encoded payload.
#[derive(Debug, Clone, PartialEq)]
pub struct InvokeRequest {
    pub target: CallTarget,
    pub zome_name: String,
    pub fn_name: String,
    pub payload: Vec<u8>,
}
