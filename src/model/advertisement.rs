use crate::model::{ActionHash, AgentPubKey, Seed};
use serde::{Deserialize, Serialize};

/// Status carried by every freshly posted advertisement.
pub const STATUS_POSTED: &str = "posted";

/// The public record announcing that a customer's cart is ready for a shopper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub customer_pubkey: AgentPubKey,
    pub customer_name: String,
    pub cart_network_seed: Seed,
    pub estimated_total: String,
    pub delivery_time: String,
    /// Microseconds since the Unix epoch.
    pub timestamp: i64,
    pub status: String,
}

/// Payload wrapper expected by `post_order_request`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostOrderRequestInput {
    pub request: OrderRequest,
}

/// An advertisement as listed from the discovery space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderAdvertisement {
    pub action_hash: ActionHash,
    pub request: OrderRequest,
}

impl OrderAdvertisement {
    pub fn seed(&self) -> &Seed {
        &self.request.cart_network_seed
    }
}

/// Summary fields a customer supplies at checkout.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderPosting {
    pub customer_name: String,
    pub estimated_total: String,
    pub delivery_time: String,
}
