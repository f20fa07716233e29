//! # Partition Joiner
//!
//! Resolves a seed to exactly one local partition handle, whether the partition was
//! created earlier by this process, is being created by a concurrent call, already
//! exists from a prior session, or must be created now.
//!
//! ## Join Flow
//!
//! 1. Claim the seed in the registry. A cached handle returns immediately; a join
//!    already running for the seed is awaited instead of duplicated.
//! 2. Create a clone of the role seeded by the seed, named
//!    `customer-cart-<first 8>-<tag>`.
//! 3. On a duplicate conflict, list the role's clones and adopt one (see
//!    [`select_clone`]).
//! 4. Register the result. Any other failure propagates unchanged.

use super::error::JoinError;
use crate::model::{AppInfo, ClonedCell, PartitionHandle, Seed};
use crate::registry_actor::{ClaimOutcome, RegistryClient};
use crate::runtime::{CreatePartitionRequest, RuntimeClient};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument, warn};

/// How the duplicate-conflict fallback treats clones it cannot tie to the seed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CloneMatch {
    /// Adopt the first unregistered clone when nothing matches the seed.
    #[default]
    Lenient,
    /// Fail with [`JoinError::UnverifiedClone`] instead.
    Strict,
}

impl std::str::FromStr for CloneMatch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lenient" => Ok(CloneMatch::Lenient),
            "strict" => Ok(CloneMatch::Strict),
            other => Err(format!("unknown clone match policy: {}", other)),
        }
    }
}

/// Name given to a customer cart partition when this process creates it.
pub fn cart_partition_name(seed: &Seed) -> String {
    format!("customer-cart-{}-{}", seed.short(), seed.tag())
}

/// Name given to the local participant's own cart partition.
pub fn own_partition_name(seed: &Seed) -> String {
    format!("shopper-cart-{}", seed.short())
}

#[derive(Debug, PartialEq)]
pub enum CloneChoice<'a> {
    /// The clone is tied to the seed by its network seed or its name tag.
    Verified(&'a ClonedCell),
    /// The first clone not already registered, with no evidence it belongs to the seed.
    Unverified(&'a ClonedCell),
    Missing,
}

/// Pick the clone that belongs to `seed`.
///
/// Preference order: a clone reporting `seed` as its network seed, then a clone whose
/// name carries the seed's tag, then the first clone not in `registered`.
pub fn select_clone<'a>(
    clones: impl IntoIterator<Item = &'a ClonedCell>,
    seed: &Seed,
    registered: &HashSet<PartitionHandle>,
) -> CloneChoice<'a> {
    let clones: Vec<&ClonedCell> = clones.into_iter().collect();
    let tag = seed.tag();

    if let Some(clone) = clones
        .iter()
        .copied()
        .find(|clone| clone.network_seed.as_deref() == Some(seed.as_str()))
    {
        return CloneChoice::Verified(clone);
    }
    if let Some(clone) = clones.iter().copied().find(|clone| clone.name.ends_with(&tag)) {
        return CloneChoice::Verified(clone);
    }
    clones
        .into_iter()
        .find(|clone| !registered.contains(&clone.cell_id))
        .map_or(CloneChoice::Missing, CloneChoice::Unverified)
}

fn find_own<'a>(app_info: &'a AppInfo, role: &str, seed: &Seed) -> Option<&'a ClonedCell> {
    let name = own_partition_name(seed);
    app_info
        .clones(role)
        .find(|clone| clone.network_seed.as_deref() == Some(seed.as_str()) || clone.name == name)
}

/// Joins cart partitions by seed, sharing one registry across all callers.
pub struct PartitionJoiner {
    runtime: Arc<dyn RuntimeClient>,
    registry: RegistryClient,
    role: String,
    policy: CloneMatch,
    validate_cached: bool,
    own: OnceCell<PartitionHandle>,
}

impl PartitionJoiner {
    pub fn new(runtime: Arc<dyn RuntimeClient>, registry: RegistryClient, role: impl Into<String>) -> Self {
        Self {
            runtime,
            registry,
            role: role.into(),
            policy: CloneMatch::default(),
            validate_cached: false,
            own: OnceCell::new(),
        }
    }

    pub fn with_policy(mut self, policy: CloneMatch) -> Self {
        self.policy = policy;
        self
    }

    /// Check cached handles against the runtime's installed cells before trusting them.
    pub fn validate_cached_handles(mut self, validate: bool) -> Self {
        self.validate_cached = validate;
        self
    }

    pub fn registry(&self) -> &RegistryClient {
        &self.registry
    }

    /// Resolve `seed` to its partition, creating or adopting it as needed.
    #[instrument(skip(self, seed), fields(seed = %seed))]
    pub async fn join(&self, seed: &Seed) -> Result<PartitionHandle, JoinError> {
        loop {
            match self.registry.claim(seed).await? {
                ClaimOutcome::Cached(handle) => {
                    if self.validate_cached && !self.is_live(&handle).await? {
                        warn!(partition = %handle, "Cached partition no longer installed, rejoining");
                        self.registry.remove(seed).await?;
                        continue;
                    }
                    debug!(partition = %handle, "Registry hit");
                    return Ok(handle);
                }
                ClaimOutcome::Wait(waiter) => {
                    if let Some(handle) = waiter.outcome().await {
                        debug!(partition = %handle, "Joined by concurrent caller");
                        return Ok(handle);
                    }
                    debug!("Concurrent join failed, retrying");
                }
                ClaimOutcome::Owner(claim) => {
                    // Dropping the claim on error wakes the waiters.
                    let handle = self.create_or_adopt(seed).await?;
                    return Ok(claim.settle(handle).await?);
                }
            }
        }
    }

    async fn create_or_adopt(&self, seed: &Seed) -> Result<PartitionHandle, JoinError> {
        let request =
            CreatePartitionRequest::new(self.role.as_str(), seed.clone(), cart_partition_name(seed));

        match self.runtime.create_partition(request).await {
            Ok(handle) => {
                info!(partition = %handle, "Partition created");
                Ok(handle)
            }
            Err(e) if e.is_duplicate_conflict() => {
                debug!(error = %e, "Partition already exists, looking it up");
                self.adopt_existing(seed).await
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn adopt_existing(&self, seed: &Seed) -> Result<PartitionHandle, JoinError> {
        let app_info = self.runtime.app_info().await?;
        // The own partition stays excluded even after the registry is cleared.
        let registered: HashSet<PartitionHandle> = self
            .registry
            .snapshot()
            .await?
            .into_iter()
            .map(|(_, handle)| handle)
            .chain(self.own.get().cloned())
            .collect();

        match select_clone(app_info.clones(&self.role), seed, &registered) {
            CloneChoice::Verified(clone) => {
                info!(partition = %clone.cell_id, clone_id = %clone.clone_id, "Adopted existing partition");
                Ok(clone.cell_id.clone())
            }
            CloneChoice::Unverified(clone) => match self.policy {
                CloneMatch::Lenient => {
                    warn!(
                        partition = %clone.cell_id,
                        clone_id = %clone.clone_id,
                        "Adopting first unregistered clone without a seed match"
                    );
                    Ok(clone.cell_id.clone())
                }
                CloneMatch::Strict => Err(JoinError::UnverifiedClone(seed.to_string())),
            },
            CloneChoice::Missing => Err(JoinError::CloneNotFound(seed.to_string())),
        }
    }

    async fn is_live(&self, handle: &PartitionHandle) -> Result<bool, JoinError> {
        Ok(self.runtime.app_info().await?.contains(handle))
    }

    /// Seed of the local participant's own cart: its public key in base64.
    pub fn own_seed(&self) -> Seed {
        Seed::new(self.runtime.my_pub_key().to_b64())
    }

    /// Make sure the local participant's own cart partition exists. Runs at most once
    /// successfully per joiner; later calls return the same handle.
    #[instrument(skip(self))]
    pub async fn join_own(&self) -> Result<PartitionHandle, JoinError> {
        self.own
            .get_or_try_init(|| self.init_own())
            .await
            .cloned()
    }

    pub fn own_partition(&self) -> Option<&PartitionHandle> {
        self.own.get()
    }

    async fn init_own(&self) -> Result<PartitionHandle, JoinError> {
        let seed = self.own_seed();
        if let Some(handle) = self.registry.get(&seed).await? {
            return Ok(handle);
        }

        let app_info = self.runtime.app_info().await?;
        let handle = match find_own(&app_info, &self.role, &seed) {
            Some(clone) => {
                info!(partition = %clone.cell_id, "Reusing own partition");
                clone.cell_id.clone()
            }
            None => {
                let request = CreatePartitionRequest::new(
                    self.role.as_str(),
                    seed.clone(),
                    own_partition_name(&seed),
                );
                match self.runtime.create_partition(request).await {
                    Ok(handle) => {
                        info!(partition = %handle, "Own partition created");
                        handle
                    }
                    Err(e) if e.is_duplicate_conflict() => {
                        let app_info = self.runtime.app_info().await?;
                        find_own(&app_info, &self.role, &seed)
                            .map(|clone| clone.cell_id.clone())
                            .ok_or_else(|| JoinError::CloneNotFound(seed.to_string()))?
                    }
                    Err(e) => return Err(e.into()),
                }
            }
        };

        Ok(self.registry.set(&seed, handle).await?)
    }

    pub async fn is_joined(&self, seed: &Seed) -> Result<bool, JoinError> {
        Ok(self.registry.has(seed).await?)
    }
}
