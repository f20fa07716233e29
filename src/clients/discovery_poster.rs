use crate::model::{ActionHash, OrderPosting, OrderRequest, PostOrderRequestInput, Seed, STATUS_POSTED};
use crate::runtime::{call, zome, CallTarget, RuntimeClient, RuntimeError};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Publishes order advertisements to the shared discovery space.
#[derive(Clone)]
pub struct DiscoveryPoster {
    runtime: Arc<dyn RuntimeClient>,
    role: String,
    zome: String,
}

impl DiscoveryPoster {
    pub fn new(runtime: Arc<dyn RuntimeClient>, role: impl Into<String>, zome: impl Into<String>) -> Self {
        Self {
            runtime,
            role: role.into(),
            zome: zome.into(),
        }
    }

    /// Advertise the cart `seed` as posted by the local participant. Returns the
    /// content address the runtime assigned to the advertisement.
    #[instrument(skip(self, seed, posting), fields(seed = %seed))]
    pub async fn publish(&self, seed: &Seed, posting: OrderPosting) -> Result<ActionHash, RuntimeError> {
        let request = OrderRequest {
            customer_pubkey: self.runtime.my_pub_key(),
            customer_name: posting.customer_name,
            cart_network_seed: seed.clone(),
            estimated_total: posting.estimated_total,
            delivery_time: posting.delivery_time,
            timestamp: Utc::now().timestamp_micros(),
            status: STATUS_POSTED.to_string(),
        };
        debug!(?request, "publish called");

        let action_hash: ActionHash = call(
            self.runtime.as_ref(),
            CallTarget::role(self.role.as_str()),
            &self.zome,
            zome::POST_ORDER_REQUEST,
            &PostOrderRequestInput { request },
        )
        .await?;

        info!(%action_hash, "Order posted");
        Ok(action_hash)
    }
}
