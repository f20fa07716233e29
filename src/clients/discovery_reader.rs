use crate::codec;
use crate::model::OrderAdvertisement;
use crate::runtime::{call, zome, CallTarget, RuntimeClient, RuntimeError};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Lists the advertisements currently posted to the discovery space.
///
/// No filtering or paging: the space holds the small working set of open orders.
/// Advertisements that do not decode are skipped; the rest are still returned.
#[derive(Clone)]
pub struct DiscoveryReader {
    runtime: Arc<dyn RuntimeClient>,
    role: String,
    zome: String,
}

impl DiscoveryReader {
    pub fn new(runtime: Arc<dyn RuntimeClient>, role: impl Into<String>, zome: impl Into<String>) -> Self {
        Self {
            runtime,
            role: role.into(),
            zome: zome.into(),
        }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<OrderAdvertisement>, RuntimeError> {
        let elements: Vec<rmpv::Value> = call(
            self.runtime.as_ref(),
            CallTarget::role(self.role.as_str()),
            &self.zome,
            zome::GET_AVAILABLE_ORDERS,
            &(),
        )
        .await?;

        let listed = elements.len();
        let ads: Vec<OrderAdvertisement> = elements
            .into_iter()
            .filter_map(codec::decode_value)
            .collect();
        if ads.len() < listed {
            warn!(skipped = listed - ads.len(), "Skipped malformed advertisements");
        }

        info!(count = ads.len(), "Listed advertisements");
        Ok(ads)
    }
}
