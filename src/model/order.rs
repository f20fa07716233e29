use crate::model::{
    Address, CartProduct, DeliveryTimeSlot, OrderAdvertisement, PartitionHandle, Seed,
};
use chrono::DateTime;
use serde::{Deserialize, Serialize};

/// Delivery window rendered for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryTimeDisplay {
    pub date: String,
    pub time: String,
}

/// UI-facing shape of one listed order.
///
/// Built from an advertisement alone: products and total stay empty until the
/// shopper opens the order and [`OrderDetail`] is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub id: Seed,
    pub cart_hash: String,
    pub customer_pub_key: String,
    pub customer_name: String,
    pub products: Vec<CartProduct>,
    pub total: f64,
    pub estimated_total: String,
    pub delivery_time: String,
    pub created_at: String,
    pub status: String,
}

impl OrderSummary {
    pub fn from_advertisement(ad: &OrderAdvertisement, customer_name: String) -> Self {
        let request = &ad.request;
        let created_at = DateTime::from_timestamp_micros(request.timestamp)
            .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
            .unwrap_or_default();

        Self {
            id: request.cart_network_seed.clone(),
            cart_hash: ad.action_hash.to_b64(),
            customer_pub_key: request.customer_pubkey.to_b64(),
            customer_name,
            products: Vec::new(),
            total: 0.0,
            estimated_total: request.estimated_total.clone(),
            delivery_time: request.delivery_time.clone(),
            created_at,
            status: request.status.clone(),
        }
    }
}

/// Full contents of one customer's cart partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderDetail {
    pub seed: Seed,
    pub products: Vec<CartProduct>,
    pub address: Option<Address>,
    pub delivery_time: Option<DeliveryTimeSlot>,
    pub delivery_time_display: Option<DeliveryTimeDisplay>,
    pub delivery_instructions: Option<String>,
    pub session_status: String,
    /// The joined partition, kept so the caller can send cart signals to it.
    pub partition: PartitionHandle,
}
