//! # Runtime Client
//!
//! The connected session handle to the ledger runtime. Everything the order services
//! do (cloning partitions, posting and reading advertisements, reading cart data) goes
//! through the [`RuntimeClient`] trait.
//!
//! Payloads cross the boundary as msgpack bytes. Use [`call`] to encode a typed request
//! and decode a typed response in one place instead of at every call site.
//!
//! [`memory::InMemoryRuntime`] is an in-process implementation used by the demo binary
//! and by tests.

pub mod error;
pub mod memory;
pub mod request;
pub mod zome;

pub use error::*;
pub use request::*;

use crate::model::{AgentPubKey, AppInfo, PartitionHandle};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Contract of the ledger runtime session.
#[async_trait]
pub trait RuntimeClient: Send + Sync {
    /// Public key of the local participant.
    fn my_pub_key(&self) -> AgentPubKey;

    /// Cells currently installed, grouped by role.
    async fn app_info(&self) -> Result<AppInfo, RuntimeError>;

    /// Clone a new partition. Fails with [`RuntimeError::DuplicateConflict`] when a
    /// partition for the same scope already exists.
    async fn create_partition(
        &self,
        request: CreatePartitionRequest,
    ) -> Result<PartitionHandle, RuntimeError>;

    /// Invoke a remote function, returning its msgpack-encoded result.
    async fn invoke(&self, request: InvokeRequest) -> Result<Vec<u8>, RuntimeError>;
}

/// Encode `payload`, invoke `zome/fn_name` on `target`, and decode the response.
pub async fn call<Req, Resp>(
    runtime: &dyn RuntimeClient,
    target: CallTarget,
    zome_name: &str,
    fn_name: &str,
    payload: &Req,
) -> Result<Resp, RuntimeError>
where
    Req: Serialize + ?Sized,
    Resp: DeserializeOwned,
{
    let payload =
        rmp_serde::to_vec_named(payload).map_err(|e| RuntimeError::Serialization(e.to_string()))?;
    let request = InvokeRequest {
        target,
        zome_name: zome_name.to_string(),
        fn_name: fn_name.to_string(),
        payload,
    };
    let bytes = runtime.invoke(request).await?;
    rmp_serde::from_slice(&bytes).map_err(|e| {
        RuntimeError::Serialization(format!("{}/{} response: {}", zome_name, fn_name, e))
    })
}
