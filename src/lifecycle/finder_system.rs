use super::config::FinderConfig;
use crate::clients::{ProfileLookup, RuntimeProfiles};
use crate::model::PartitionHandle;
use crate::orders::{OrderAggregator, OrderError};
use crate::registry_actor::RegistryClient;
use crate::runtime::RuntimeClient;
use std::sync::Arc;
use tracing::{error, info};

/// The session object owning the partition registry and the order services.
///
/// `FinderSystem` is responsible for:
/// - **Lifecycle Management**: starting the registry actor and stopping it on shutdown
/// - **Dependency Wiring**: handing the registry to the aggregator, and the runtime
///   session to both once it is available
///
/// Operations are usable right after [`new`](Self::new) but fail with
/// [`OrderError::NotInitialized`] until a client is set.
///
/// # Example
///
/// ```ignore
/// let system = FinderSystem::new(FinderConfig::default());
/// system.set_client(runtime).await?;
///
/// let orders = system.orders.list_orders().await?;
/// let detail = system.orders.load_order_details(&orders[0].id).await?;
///
/// system.shutdown().await?;
/// ```
pub struct FinderSystem {
    pub orders: OrderAggregator,
    pub registry: RegistryClient,
    config: FinderConfig,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl FinderSystem {
    pub fn new(config: FinderConfig) -> Self {
        let (registry_actor, registry) = crate::registry_actor::new(config.registry_buffer);
        let registry_handle = tokio::spawn(registry_actor.run());

        Self {
            orders: OrderAggregator::new(registry.clone(), config.clone()),
            registry,
            config,
            handles: vec![registry_handle],
        }
    }

    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Connect to `runtime`, reading customer names through its profiles zome.
    pub async fn set_client(
        &self,
        runtime: Arc<dyn RuntimeClient>,
    ) -> Result<PartitionHandle, OrderError> {
        let profiles = RuntimeProfiles::new(
            runtime.clone(),
            self.config.cart_role.as_str(),
            self.config.profiles_zome.as_str(),
        );
        self.set_client_with_profiles(runtime, Arc::new(profiles))
            .await
    }

    /// Connect to `runtime` with a custom profile lookup. Initialises the local
    /// participant's own partition before any discovery call can run.
    pub async fn set_client_with_profiles(
        &self,
        runtime: Arc<dyn RuntimeClient>,
        profiles: Arc<dyn ProfileLookup>,
    ) -> Result<PartitionHandle, OrderError> {
        self.orders.connect(runtime, profiles).await
    }

    /// Gracefully shuts down the registry actor.
    ///
    /// Every clone of the aggregator and registry client must be dropped for the actor
    /// to see its channel close.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down finder...");

        self.orders.disconnect().await;
        drop(self.orders);
        drop(self.registry);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("Finder shutdown complete.");
        Ok(())
    }
}
