use super::error::RegistryError;
use super::message::{Claim, RegistryRequest, Response};
use crate::model::{PartitionHandle, Seed};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

/// A cloneable handle for talking to the [`RegistryActor`](super::RegistryActor).
///
/// Every call is a round-trip through the actor's mailbox; a closed actor surfaces as
/// [`RegistryError::ActorClosed`].
#[derive(Clone)]
pub struct RegistryClient {
    sender: mpsc::Sender<RegistryRequest>,
}

impl RegistryClient {
    pub fn new(sender: mpsc::Sender<RegistryRequest>) -> Self {
        Self { sender }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(Response<T>) -> RegistryRequest,
    ) -> Result<T, RegistryError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| RegistryError::ActorClosed)?;
        response.await.map_err(|_| RegistryError::ActorDropped)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, seed: &Seed) -> Result<Option<PartitionHandle>, RegistryError> {
        self.request(|respond_to| RegistryRequest::Get {
            seed: seed.clone(),
            respond_to,
        })
        .await
    }

    pub async fn has(&self, seed: &Seed) -> Result<bool, RegistryError> {
        self.request(|respond_to| RegistryRequest::Has {
            seed: seed.clone(),
            respond_to,
        })
        .await
    }

    /// Register `handle` for `seed` unless the seed is already bound. Returns the
    /// handle that is registered after the call.
    #[instrument(skip(self))]
    pub async fn set(
        &self,
        seed: &Seed,
        handle: PartitionHandle,
    ) -> Result<PartitionHandle, RegistryError> {
        self.request(|respond_to| RegistryRequest::Set {
            seed: seed.clone(),
            handle,
            respond_to,
        })
        .await
    }

    pub async fn remove(&self, seed: &Seed) -> Result<Option<PartitionHandle>, RegistryError> {
        self.request(|respond_to| RegistryRequest::Remove {
            seed: seed.clone(),
            respond_to,
        })
        .await
    }

    /// Drop every entry, returning how many there were. Meant for tests and teardown;
    /// joins in flight keep their claims.
    pub async fn clear(&self) -> Result<usize, RegistryError> {
        self.request(|respond_to| RegistryRequest::Clear { respond_to })
            .await
    }

    /// All entries, ordered by seed.
    pub async fn snapshot(&self) -> Result<Vec<(Seed, PartitionHandle)>, RegistryError> {
        self.request(|respond_to| RegistryRequest::Snapshot { respond_to })
            .await
    }

    /// Ask to resolve `seed`.
    ///
    /// Exactly one caller at a time receives [`ClaimOutcome::Owner`] for a seed that is
    /// not registered yet; later callers receive a [`Waiter`] that completes when the
    /// owner settles or gives up.
    pub async fn claim(&self, seed: &Seed) -> Result<ClaimOutcome, RegistryError> {
        let claim = self
            .request(|respond_to| RegistryRequest::Claim {
                seed: seed.clone(),
                respond_to,
            })
            .await?;

        Ok(match claim {
            Claim::Cached(handle) => ClaimOutcome::Cached(handle),
            Claim::Wait(outcome) => ClaimOutcome::Wait(Waiter(outcome)),
            Claim::Owner => ClaimOutcome::Owner(OwnerClaim {
                seed: seed.clone(),
                sender: self.sender.clone(),
                settled: false,
            }),
        })
    }
}

pub enum ClaimOutcome {
    Cached(PartitionHandle),
    Owner(OwnerClaim),
    Wait(Waiter),
}

/// Pending result of another caller's join.
pub struct Waiter(oneshot::Receiver<Option<PartitionHandle>>);

impl Waiter {
    /// The handle the owner registered, or `None` when it failed.
    pub async fn outcome(self) -> Option<PartitionHandle> {
        self.0.await.ok().flatten()
    }
}

/// Exclusive right to resolve one seed.
///
/// Dropping the claim without calling [`settle`](Self::settle) releases the seed and
/// wakes the waiters with `None`, so a failed or cancelled join never blocks others.
pub struct OwnerClaim {
    seed: Seed,
    sender: mpsc::Sender<RegistryRequest>,
    settled: bool,
}

impl OwnerClaim {
    pub fn seed(&self) -> &Seed {
        &self.seed
    }

    /// Register `handle` for the claimed seed and hand it to every waiter.
    pub async fn settle(mut self, handle: PartitionHandle) -> Result<PartitionHandle, RegistryError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(RegistryRequest::Release {
                seed: self.seed.clone(),
                handle: Some(handle.clone()),
                respond_to: Some(respond_to),
            })
            .await
            .map_err(|_| RegistryError::ActorClosed)?;
        self.settled = true;

        let resident = response.await.map_err(|_| RegistryError::ActorDropped)?;
        Ok(resident.unwrap_or(handle))
    }
}

impl Drop for OwnerClaim {
    fn drop(&mut self) {
        if self.settled {
            return;
        }

        let release = RegistryRequest::Release {
            seed: self.seed.clone(),
            handle: None,
            respond_to: None,
        };
        match self.sender.try_send(release) {
            Ok(()) => {}
            Err(TrySendError::Full(release)) => {
                if let Ok(runtime) = tokio::runtime::Handle::try_current() {
                    let sender = self.sender.clone();
                    runtime.spawn(async move {
                        let _ = sender.send(release).await;
                    });
                }
            }
            Err(TrySendError::Closed(_)) => return,
        }
        debug!(seed = %self.seed, "Claim dropped without a partition");
    }
}
