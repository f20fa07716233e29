//! Messages understood by the [`RegistryActor`](super::RegistryActor).

use crate::model::{PartitionHandle, Seed};
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by the registry.
pub type Response<T> = oneshot::Sender<T>;

/// What a joiner holds after asking to resolve a seed.
#[derive(Debug)]
pub enum Claim {
    /// The seed is already registered.
    Cached(PartitionHandle),
    /// The caller is the only one resolving this seed and must release the claim.
    Owner,
    /// Another caller is resolving this seed; its outcome arrives on the receiver.
    Wait(oneshot::Receiver<Option<PartitionHandle>>),
}

#[derive(Debug)]
pub enum RegistryRequest {
    Get {
        seed: Seed,
        respond_to: Response<Option<PartitionHandle>>,
    },
    Has {
        seed: Seed,
        respond_to: Response<bool>,
    },
    /// Insert if absent. Responds with the handle resident after the call.
    Set {
        seed: Seed,
        handle: PartitionHandle,
        respond_to: Response<PartitionHandle>,
    },
    Remove {
        seed: Seed,
        respond_to: Response<Option<PartitionHandle>>,
    },
    Clear {
        respond_to: Response<usize>,
    },
    Snapshot {
        respond_to: Response<Vec<(Seed, PartitionHandle)>>,
    },
    Claim {
        seed: Seed,
        respond_to: Response<Claim>,
    },
    /// End an owner claim, registering `handle` when the owner resolved one.
    Release {
        seed: Seed,
        handle: Option<PartitionHandle>,
        respond_to: Option<Response<Option<PartitionHandle>>>,
    },
}
