//! # Order Aggregator
//!
//! Top-level orchestration over a connected runtime session.
//!
//! - [`OrderAggregator::list_orders`] turns advertisements into display-ready
//!   [`OrderSummary`]s. Profile lookups are isolated per order: a failing lookup
//!   substitutes the placeholder name instead of failing the listing.
//! - [`OrderAggregator::load_order_details`] joins one cart partition and reads its
//!   live contents. Joining has a real cost, so it only runs when a caller asks for
//!   one specific order.
//!
//! Every operation first checks a session is connected and fails with
//! [`OrderError::NotInitialized`] otherwise.

use super::error::OrderError;
use crate::clients::{
    DiscoveryPoster, DiscoveryReader, PartitionJoiner, ProfileLookup, SignalClient,
};
use crate::codec;
use crate::lifecycle::FinderConfig;
use crate::model::{
    ActionHash, Address, AgentPubKey, CartProduct, CartSignal, DeliveryInstructions,
    DeliveryTimeSlot, OrderDetail, OrderPosting, OrderSummary, PartitionHandle, SessionData, Seed,
};
use crate::registry_actor::RegistryClient;
use crate::runtime::{call, zome, CallTarget, RuntimeClient};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

/// Services bound to one runtime session.
pub struct Connection {
    runtime: Arc<dyn RuntimeClient>,
    joiner: PartitionJoiner,
    poster: DiscoveryPoster,
    reader: DiscoveryReader,
    signals: SignalClient,
    profiles: Arc<dyn ProfileLookup>,
}

impl Connection {
    pub fn new(
        runtime: Arc<dyn RuntimeClient>,
        profiles: Arc<dyn ProfileLookup>,
        registry: RegistryClient,
        config: &FinderConfig,
    ) -> Self {
        let joiner = PartitionJoiner::new(runtime.clone(), registry, config.cart_role.as_str())
            .with_policy(config.clone_match)
            .validate_cached_handles(config.validate_cached_handles);

        Self {
            joiner,
            poster: DiscoveryPoster::new(
                runtime.clone(),
                config.order_finder_role.as_str(),
                config.order_finder_zome.as_str(),
            ),
            reader: DiscoveryReader::new(
                runtime.clone(),
                config.order_finder_role.as_str(),
                config.order_finder_zome.as_str(),
            ),
            signals: SignalClient::new(runtime.clone(), config.cart_zome.as_str()),
            runtime,
            profiles,
        }
    }
}

#[derive(Clone)]
pub struct OrderAggregator {
    registry: RegistryClient,
    config: FinderConfig,
    connection: Arc<RwLock<Option<Arc<Connection>>>>,
}

impl OrderAggregator {
    pub fn new(registry: RegistryClient, config: FinderConfig) -> Self {
        Self {
            registry,
            config,
            connection: Arc::new(RwLock::new(None)),
        }
    }

    /// Bind to a runtime session: initialise the local participant's own partition,
    /// then make the session available to every operation.
    #[instrument(skip_all)]
    pub async fn connect(
        &self,
        runtime: Arc<dyn RuntimeClient>,
        profiles: Arc<dyn ProfileLookup>,
    ) -> Result<PartitionHandle, OrderError> {
        let connection = Connection::new(runtime, profiles, self.registry.clone(), &self.config);
        let own = connection.joiner.join_own().await?;

        *self.connection.write().await = Some(Arc::new(connection));
        info!(partition = %own, "Client set");
        Ok(own)
    }

    pub async fn disconnect(&self) {
        if self.connection.write().await.take().is_some() {
            info!("Client cleared");
        }
    }

    pub async fn is_connected(&self) -> bool {
        self.connection.read().await.is_some()
    }

    async fn connection(&self, operation: &'static str) -> Result<Arc<Connection>, OrderError> {
        self.connection
            .read()
            .await
            .clone()
            .ok_or(OrderError::NotInitialized { operation })
    }

    /// Publish the cart `seed` to the discovery space.
    pub async fn post_order(&self, seed: &Seed, posting: OrderPosting) -> Result<ActionHash, OrderError> {
        let connection = self.connection("post_order").await?;
        Ok(connection.poster.publish(seed, posting).await?)
    }

    /// All posted orders, with customer names resolved best-effort.
    #[instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<OrderSummary>, OrderError> {
        let connection = self.connection("list_orders").await?;
        let ads = connection.reader.list().await?;

        let mut summaries = Vec::with_capacity(ads.len());
        for ad in &ads {
            let name = self
                .customer_name(&connection, &ad.request.customer_pubkey)
                .await;
            summaries.push(OrderSummary::from_advertisement(ad, name));
        }

        info!(count = summaries.len(), "Orders listed");
        Ok(summaries)
    }

    async fn customer_name(&self, connection: &Connection, agent: &AgentPubKey) -> String {
        match connection.profiles.display_name(agent).await {
            Ok(Some(name)) => name,
            Ok(None) => agent.short_id(),
            Err(e) => {
                warn!(agent = %agent, error = %e, "Profile lookup failed, using placeholder");
                self.config.placeholder_name.clone()
            }
        }
    }

    /// Join the cart partition of `seed` and read its items and session data.
    #[instrument(skip(self, seed), fields(seed = %seed))]
    pub async fn load_order_details(&self, seed: &Seed) -> Result<OrderDetail, OrderError> {
        let connection = self.connection("load_order_details").await?;
        let partition = connection.joiner.join(seed).await?;
        let target = CallTarget::Partition(partition.clone());

        let products: Vec<CartProduct> = call(
            connection.runtime.as_ref(),
            target.clone(),
            &self.config.cart_zome,
            zome::GET_CURRENT_ITEMS,
            &(),
        )
        .await?;
        let session: SessionData = call(
            connection.runtime.as_ref(),
            target,
            &self.config.cart_zome,
            zome::GET_SESSION_DATA,
            &(),
        )
        .await?;

        let delivery_time: Option<DeliveryTimeSlot> = session
            .delivery_time_slot
            .as_ref()
            .and_then(codec::decode_entry);
        let detail = OrderDetail {
            seed: seed.clone(),
            products,
            address: session.address.as_ref().and_then(codec::decode_entry),
            delivery_time_display: delivery_time.as_ref().and_then(codec::format_delivery_time),
            delivery_time,
            delivery_instructions: session
                .delivery_instructions
                .as_ref()
                .and_then(codec::decode_entry::<DeliveryInstructions>)
                .map(|d| d.instructions),
            session_status: session.session_status,
            partition,
        };

        debug!(items = detail.products.len(), status = %detail.session_status, "Order details loaded");
        Ok(detail)
    }

    pub async fn add_item(&self, seed: &Seed, item: &CartProduct) -> Result<ActionHash, OrderError> {
        self.write_cart("add_item", seed, zome::ADD_ITEM, item).await
    }

    pub async fn set_address(&self, seed: &Seed, address: &Address) -> Result<ActionHash, OrderError> {
        self.write_cart("set_address", seed, zome::SET_ADDRESS, address)
            .await
    }

    pub async fn set_delivery_time_slot(
        &self,
        seed: &Seed,
        slot: &DeliveryTimeSlot,
    ) -> Result<ActionHash, OrderError> {
        self.write_cart("set_delivery_time_slot", seed, zome::SET_DELIVERY_TIME_SLOT, slot)
            .await
    }

    pub async fn set_delivery_instructions(
        &self,
        seed: &Seed,
        instructions: &str,
    ) -> Result<ActionHash, OrderError> {
        let instructions = DeliveryInstructions {
            instructions: instructions.to_string(),
        };
        self.write_cart(
            "set_delivery_instructions",
            seed,
            zome::SET_DELIVERY_INSTRUCTIONS,
            &instructions,
        )
        .await
    }

    pub async fn set_session_status(&self, seed: &Seed, status: &str) -> Result<(), OrderError> {
        self.write_cart("set_session_status", seed, zome::SET_SESSION_STATUS, status)
            .await
    }

    /// Send `signal` to everyone in the cart partition of `seed`.
    pub async fn notify(&self, seed: &Seed, signal: &CartSignal) -> Result<(), OrderError> {
        let connection = self.connection("notify").await?;
        let partition = connection.joiner.join(seed).await?;
        Ok(connection.signals.send(&partition, signal).await?)
    }

    async fn write_cart<P, R>(
        &self,
        operation: &'static str,
        seed: &Seed,
        fn_name: &str,
        payload: &P,
    ) -> Result<R, OrderError>
    where
        P: Serialize + ?Sized + Sync,
        R: serde::de::DeserializeOwned,
    {
        let connection = self.connection(operation).await?;
        let partition = connection.joiner.join(seed).await?;
        let response = call(
            connection.runtime.as_ref(),
            CallTarget::Partition(partition),
            &self.config.cart_zome,
            fn_name,
            payload,
        )
        .await?;
        debug!(%seed, operation, "Cart updated");
        Ok(response)
    }
}
