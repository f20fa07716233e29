use super::message::{Claim, RegistryRequest};
use crate::model::{PartitionHandle, Seed};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

/// Owner of the `seed → partition` entries.
///
/// Entries are never replaced: the first handle registered for a seed stays until it
/// is removed or the registry is cleared. Seeds being resolved right now are tracked
/// in `in_flight` together with the callers waiting on them.
pub struct RegistryActor {
    receiver: mpsc::Receiver<RegistryRequest>,
    entries: HashMap<Seed, PartitionHandle>,
    in_flight: HashMap<Seed, Vec<oneshot::Sender<Option<PartitionHandle>>>>,
}

impl RegistryActor {
    pub fn new(receiver: mpsc::Receiver<RegistryRequest>) -> Self {
        Self {
            receiver,
            entries: HashMap::new(),
            in_flight: HashMap::new(),
        }
    }

    /// Runs the actor's event loop until every client is dropped.
    pub async fn run(mut self) {
        info!(entity_type = "PartitionRegistry", "Actor started");

        while let Some(msg) = self.receiver.recv().await {
            self.handle(msg);
        }

        info!(
            entity_type = "PartitionRegistry",
            size = self.entries.len(),
            "Shutdown"
        );
    }

    fn handle(&mut self, msg: RegistryRequest) {
        match msg {
            RegistryRequest::Get { seed, respond_to } => {
                let handle = self.entries.get(&seed).cloned();
                debug!(%seed, found = handle.is_some(), "Get");
                let _ = respond_to.send(handle);
            }
            RegistryRequest::Has { seed, respond_to } => {
                let _ = respond_to.send(self.entries.contains_key(&seed));
            }
            RegistryRequest::Set {
                seed,
                handle,
                respond_to,
            } => {
                let resident = self.insert(seed, handle);
                let _ = respond_to.send(resident);
            }
            RegistryRequest::Remove { seed, respond_to } => {
                let removed = self.entries.remove(&seed);
                if removed.is_some() {
                    info!(%seed, size = self.entries.len(), "Removed");
                }
                let _ = respond_to.send(removed);
            }
            RegistryRequest::Clear { respond_to } => {
                let dropped = self.entries.len();
                self.entries.clear();
                if !self.in_flight.is_empty() {
                    warn!(in_flight = self.in_flight.len(), "Cleared while joins are in flight");
                }
                info!(dropped, "Cleared");
                let _ = respond_to.send(dropped);
            }
            RegistryRequest::Snapshot { respond_to } => {
                let mut entries: Vec<_> = self
                    .entries
                    .iter()
                    .map(|(seed, handle)| (seed.clone(), handle.clone()))
                    .collect();
                entries.sort_by(|a, b| a.0.cmp(&b.0));
                let _ = respond_to.send(entries);
            }
            RegistryRequest::Claim { seed, respond_to } => {
                let claim = self.claim(&seed);
                // The claimant went away before learning it owned the seed.
                if let Err(Claim::Owner) = respond_to.send(claim) {
                    self.release(&seed, None);
                }
            }
            RegistryRequest::Release {
                seed,
                handle,
                respond_to,
            } => {
                let resident = self.release(&seed, handle);
                if let Some(respond_to) = respond_to {
                    let _ = respond_to.send(resident);
                }
            }
        }
    }

    fn insert(&mut self, seed: Seed, handle: PartitionHandle) -> PartitionHandle {
        match self.entries.entry(seed) {
            Entry::Occupied(entry) => {
                if entry.get() != &handle {
                    warn!(seed = %entry.key(), resident = %entry.get(), "Seed already bound, keeping resident handle");
                }
                entry.get().clone()
            }
            Entry::Vacant(entry) => {
                info!(seed = %entry.key(), partition = %handle, "Registered");
                entry.insert(handle).clone()
            }
        }
    }

    fn claim(&mut self, seed: &Seed) -> Claim {
        if let Some(handle) = self.entries.get(seed) {
            debug!(%seed, "Claim served from cache");
            return Claim::Cached(handle.clone());
        }

        match self.in_flight.get_mut(seed) {
            Some(waiters) => {
                let (notify, outcome) = oneshot::channel();
                waiters.push(notify);
                debug!(%seed, waiters = waiters.len(), "Claim waiting on owner");
                Claim::Wait(outcome)
            }
            None => {
                self.in_flight.insert(seed.clone(), Vec::new());
                debug!(%seed, "Claim granted");
                Claim::Owner
            }
        }
    }

    fn release(&mut self, seed: &Seed, handle: Option<PartitionHandle>) -> Option<PartitionHandle> {
        let resident = handle.map(|handle| self.insert(seed.clone(), handle));
        let waiters = self.in_flight.remove(seed).unwrap_or_default();
        debug!(%seed, waiters = waiters.len(), resolved = resident.is_some(), "Claim released");
        for waiter in waiters {
            let _ = waiter.send(resident.clone());
        }
        resident
    }
}
