//! # In-Memory Runtime
//!
//! An in-process stand-in for the ledger runtime, used by the demo binary and by tests.
//!
//! Several participants share one [`MemoryNetwork`]. Each participant gets its own
//! [`InMemoryRuntime`] from [`MemoryNetwork::connect`], holding its own installed cells
//! (like a conductor would) while reading and writing the shared data:
//!
//! - the discovery space (`order_finder` role) is global to the network;
//! - cart data is scoped by the partition's network seed, so a shopper joining
//!   `alice-seed-123` sees what the customer wrote to the same seed;
//! - profiles are keyed by agent.
//!
//! ## Fault Injection
//!
//! Tests drive the join paths through the runtime's knobs:
//!
//! ```ignore
//! let network = MemoryNetwork::new();
//! let runtime = Arc::new(network.connect(AgentPubKey(vec![1; 32])));
//! runtime.fail_creates_with(RuntimeError::DuplicateConflict("s".into()));
//! runtime.insert_clone(CART_ROLE, existing_clone);
//! // ...
//! assert_eq!(runtime.create_calls(), 1);
//! ```

use crate::model::{
    ActionHash, AgentPubKey, AppInfo, CartProduct, CartSignal, CellInfo, ClonedCell,
    DeliveryInstructions, DeliveryTimeSlot, Address, OrderAdvertisement, PartitionHandle,
    PostOrderRequestInput, Profile, ProvisionedCell, Record, SessionData, SpaceHash,
    STATUS_POSTED,
};
use crate::runtime::zome;
use crate::runtime::{CallTarget, CreatePartitionRequest, InvokeRequest, RuntimeClient, RuntimeError};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, info};

/// Derive the space of a role's cell for a given network seed. Provisioned cells use
/// the empty seed.
pub fn space_for(role: &str, seed: &str) -> SpaceHash {
    let mut hasher = Sha256::new();
    hasher.update(role.as_bytes());
    hasher.update([0u8]);
    hasher.update(seed.as_bytes());
    SpaceHash(hasher.finalize().to_vec())
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Default)]
struct CartState {
    items: Vec<CartProduct>,
    session: SessionData,
    signals: Vec<CartSignal>,
}

#[derive(Default)]
struct NetworkState {
    orders: Vec<OrderAdvertisement>,
    carts: HashMap<String, CartState>,
    profiles: HashMap<AgentPubKey, Record>,
    actions: u64,
}

impl NetworkState {
    fn next_action_hash(&mut self) -> ActionHash {
        self.actions += 1;
        ActionHash(Sha256::digest(self.actions.to_be_bytes()).to_vec())
    }

    fn cart(&mut self, seed: &str) -> &mut CartState {
        self.carts.entry(seed.to_string()).or_default()
    }
}

/// Data shared by every participant connected to the same simulated network.
#[derive(Clone, Default)]
pub struct MemoryNetwork {
    state: Arc<Mutex<NetworkState>>,
}

impl MemoryNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the network as `agent`, with the `cart` and `order_finder` roles provisioned.
    pub fn connect(&self, agent: AgentPubKey) -> InMemoryRuntime {
        self.connect_with_roles(agent, &[zome::CART_ROLE, zome::ORDER_FINDER_ROLE])
    }

    pub fn connect_with_roles(&self, agent: AgentPubKey, roles: &[&str]) -> InMemoryRuntime {
        let cells = roles
            .iter()
            .map(|role| {
                let cell = CellInfo::Provisioned(ProvisionedCell {
                    cell_id: PartitionHandle::new(space_for(role, ""), agent.clone()),
                    name: role.to_string(),
                });
                (role.to_string(), vec![cell])
            })
            .collect();
        info!(agent = %agent, roles = roles.len(), "Connected to memory network");

        InMemoryRuntime {
            agent,
            network: self.clone(),
            local: Mutex::new(LocalState {
                cells,
                ..Default::default()
            }),
        }
    }

    /// Signals delivered to the cart partition of `seed`, oldest first.
    pub fn signals(&self, seed: &str) -> Vec<CartSignal> {
        lock(&self.state)
            .carts
            .get(seed)
            .map(|cart| cart.signals.clone())
            .unwrap_or_default()
    }

    /// Number of advertisements posted so far, whatever their status.
    pub fn posted_orders(&self) -> usize {
        lock(&self.state).orders.len()
    }

    fn state(&self) -> MutexGuard<'_, NetworkState> {
        lock(&self.state)
    }
}

#[derive(Default)]
struct Faults {
    create: Option<RuntimeError>,
    app_info: Option<RuntimeError>,
    calls: HashMap<String, RuntimeError>,
    latency: Option<Duration>,
    hide_seeds: bool,
}

#[derive(Default)]
struct Counters {
    create: usize,
    app_info: usize,
    invoke: HashMap<String, usize>,
}

#[derive(Default)]
struct LocalState {
    cells: HashMap<String, Vec<CellInfo>>,
    /// True network seed of every clone, even when it is hidden from `app_info`.
    seeds: HashMap<PartitionHandle, String>,
    clones: usize,
    faults: Faults,
    counters: Counters,
}

impl LocalState {
    fn seed_of(&self, target: &CallTarget) -> Result<String, RuntimeError> {
        match target {
            CallTarget::Role(role) => self
                .cells
                .get(role)
                .map(|_| String::new())
                .ok_or_else(|| RuntimeError::CellNotFound(role.clone())),
            CallTarget::Partition(handle) => self
                .seeds
                .get(handle)
                .cloned()
                .ok_or_else(|| RuntimeError::CellNotFound(handle.to_string())),
        }
    }
}

/// One participant's session on a [`MemoryNetwork`].
pub struct InMemoryRuntime {
    agent: AgentPubKey,
    network: MemoryNetwork,
    local: Mutex<LocalState>,
}

impl InMemoryRuntime {
    /// Make every following `create_partition` fail with `error`.
    pub fn fail_creates_with(&self, error: RuntimeError) {
        self.local().faults.create = Some(error);
    }

    pub fn fail_app_info_with(&self, error: RuntimeError) {
        self.local().faults.app_info = Some(error);
    }

    /// Make every following call of the remote function `fn_name` fail with `error`.
    pub fn fail_calls(&self, fn_name: &str, error: RuntimeError) {
        self.local().faults.calls.insert(fn_name.to_string(), error);
    }

    pub fn clear_faults(&self) {
        let mut local = self.local();
        let latency = local.faults.latency;
        let hide_seeds = local.faults.hide_seeds;
        local.faults = Faults {
            latency,
            hide_seeds,
            ..Default::default()
        };
    }

    /// Delay every create and invoke by `latency`.
    pub fn set_latency(&self, latency: Duration) {
        self.local().faults.latency = Some(latency);
    }

    /// Report clones without their network seed, as older runtimes do.
    pub fn hide_network_seeds(&self) {
        self.local().faults.hide_seeds = true;
    }

    /// Install a clone cell directly, as if it had been created in an earlier session.
    pub fn insert_clone(&self, role: &str, clone: ClonedCell) {
        let mut local = self.local();
        let seed = clone
            .network_seed
            .clone()
            .unwrap_or_else(|| clone.name.clone());
        local.seeds.insert(clone.cell_id.clone(), seed);
        local
            .cells
            .entry(role.to_string())
            .or_default()
            .push(CellInfo::Cloned(clone));
    }

    /// Tear down a partition behind the caller's back. Returns whether it existed.
    pub fn remove_partition(&self, handle: &PartitionHandle) -> bool {
        let mut local = self.local();
        local.seeds.remove(handle);
        let mut removed = false;
        for cells in local.cells.values_mut() {
            let before = cells.len();
            cells.retain(|cell| cell.cell_id() != handle);
            removed |= cells.len() != before;
        }
        removed
    }

    /// Build the handle a clone of `role` seeded by `seed` gets on this runtime.
    pub fn handle_for(&self, role: &str, seed: &str) -> PartitionHandle {
        PartitionHandle::new(space_for(role, seed), self.agent.clone())
    }

    pub fn create_calls(&self) -> usize {
        self.local().counters.create
    }

    pub fn app_info_calls(&self) -> usize {
        self.local().counters.app_info
    }

    pub fn invoke_calls(&self, fn_name: &str) -> usize {
        self.local()
            .counters
            .invoke
            .get(fn_name)
            .copied()
            .unwrap_or_default()
    }

    fn local(&self) -> MutexGuard<'_, LocalState> {
        lock(&self.local)
    }

    async fn pause(&self) {
        let latency = self.local().faults.latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn dispatch(&self, seed: &str, request: &InvokeRequest) -> Result<Vec<u8>, RuntimeError> {
        let mut network = self.network.state();
        match request.fn_name.as_str() {
            zome::POST_ORDER_REQUEST => {
                let input: PostOrderRequestInput = decode(request)?;
                let action_hash = network.next_action_hash();
                network.orders.push(OrderAdvertisement {
                    action_hash: action_hash.clone(),
                    request: input.request,
                });
                encode(&action_hash)
            }
            zome::GET_AVAILABLE_ORDERS => {
                let posted: Vec<&OrderAdvertisement> = network
                    .orders
                    .iter()
                    .filter(|ad| ad.request.status == STATUS_POSTED)
                    .collect();
                encode(&posted)
            }
            zome::GET_CURRENT_ITEMS => encode(&network.cart(seed).items),
            zome::GET_SESSION_DATA => encode(&network.cart(seed).session),
            zome::ADD_ITEM => {
                let item: CartProduct = decode(request)?;
                let action_hash = network.next_action_hash();
                network.cart(seed).items.push(item);
                encode(&action_hash)
            }
            zome::SET_ADDRESS => {
                let record = commit::<Address>(&mut network, request)?;
                let action_hash = record.action_hash.clone();
                network.cart(seed).session.address = Some(record);
                encode(&action_hash)
            }
            zome::SET_DELIVERY_TIME_SLOT => {
                let record = commit::<DeliveryTimeSlot>(&mut network, request)?;
                let action_hash = record.action_hash.clone();
                network.cart(seed).session.delivery_time_slot = Some(record);
                encode(&action_hash)
            }
            zome::SET_DELIVERY_INSTRUCTIONS => {
                let record = commit::<DeliveryInstructions>(&mut network, request)?;
                let action_hash = record.action_hash.clone();
                network.cart(seed).session.delivery_instructions = Some(record);
                encode(&action_hash)
            }
            zome::SET_SESSION_STATUS => {
                let status: String = decode(request)?;
                network.cart(seed).session.session_status = status;
                encode(&())
            }
            zome::SEND_REMOTE_SIGNAL => {
                let signal: CartSignal = decode(request)?;
                network.cart(seed).signals.push(signal);
                encode(&())
            }
            zome::CREATE_PROFILE => {
                let record = commit::<Profile>(&mut network, request)?;
                let action_hash = record.action_hash.clone();
                network.profiles.insert(self.agent.clone(), record);
                encode(&action_hash)
            }
            zome::GET_AGENT_PROFILE => {
                let agent: AgentPubKey = decode(request)?;
                encode(&network.profiles.get(&agent))
            }
            other => Err(zome_error(request, format!("no function named {}", other))),
        }
    }
}

#[async_trait]
impl RuntimeClient for InMemoryRuntime {
    fn my_pub_key(&self) -> AgentPubKey {
        self.agent.clone()
    }

    async fn app_info(&self) -> Result<AppInfo, RuntimeError> {
        let mut local = self.local();
        local.counters.app_info += 1;
        if let Some(error) = local.faults.app_info.clone() {
            return Err(error);
        }

        let hide_seeds = local.faults.hide_seeds;
        let mut cell_info = local.cells.clone();
        if hide_seeds {
            for cell in cell_info.values_mut().flatten() {
                if let CellInfo::Cloned(clone) = cell {
                    clone.network_seed = None;
                }
            }
        }

        Ok(AppInfo {
            installed_app_id: "grocery".to_string(),
            cell_info,
        })
    }

    async fn create_partition(
        &self,
        request: CreatePartitionRequest,
    ) -> Result<PartitionHandle, RuntimeError> {
        self.pause().await;

        let mut local = self.local();
        local.counters.create += 1;
        if let Some(error) = local.faults.create.clone() {
            debug!(seed = %request.seed(), error = %error, "Injected create failure");
            return Err(error);
        }

        let role = request.role_name.clone();
        let seed = request.seed().as_str().to_string();
        let handle = self.handle_for(&role, &seed);

        let cells = local
            .cells
            .get(&role)
            .ok_or_else(|| RuntimeError::CellNotFound(role.clone()))?;
        if cells.iter().any(|cell| cell.cell_id() == &handle) {
            return Err(RuntimeError::DuplicateConflict(seed));
        }

        let clone_id = format!("{}.{}", role, local.clones);
        local.clones += 1;
        local.seeds.insert(handle.clone(), seed.clone());
        local.cells.entry(role).or_default().push(CellInfo::Cloned(ClonedCell {
            cell_id: handle.clone(),
            clone_id,
            name: request.name,
            network_seed: Some(seed),
            enabled: true,
        }));

        Ok(handle)
    }

    async fn invoke(&self, request: InvokeRequest) -> Result<Vec<u8>, RuntimeError> {
        self.pause().await;

        let seed = {
            let mut local = self.local();
            *local
                .counters
                .invoke
                .entry(request.fn_name.clone())
                .or_default() += 1;
            if let Some(error) = local.faults.calls.get(&request.fn_name) {
                return Err(error.clone());
            }
            local.seed_of(&request.target)?
        };

        self.dispatch(&seed, &request)
    }
}

fn zome_error(request: &InvokeRequest, message: String) -> RuntimeError {
    RuntimeError::ZomeCall {
        zome: request.zome_name.clone(),
        function: request.fn_name.clone(),
        message,
    }
}

fn decode<T: DeserializeOwned>(request: &InvokeRequest) -> Result<T, RuntimeError> {
    rmp_serde::from_slice(&request.payload).map_err(|e| zome_error(request, e.to_string()))
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, RuntimeError> {
    rmp_serde::to_vec_named(value).map_err(|e| RuntimeError::Serialization(e.to_string()))
}

/// Validate the payload as a `T` and store its bytes as a new record.
fn commit<T: DeserializeOwned>(
    network: &mut NetworkState,
    request: &InvokeRequest,
) -> Result<Record, RuntimeError> {
    decode::<T>(request)?;
    Ok(Record::present(
        network.next_action_hash(),
        request.payload.clone(),
    ))
}
