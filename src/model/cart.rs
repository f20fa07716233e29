//! Data held inside a customer's cart partition.
use crate::model::Record;
use serde::{Deserialize, Serialize};

/// One item in a cart, with prices frozen at checkout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartProduct {
    pub product_id: String,
    pub product_name: String,
    pub product_image_url: Option<String>,
    pub price_at_checkout: f64,
    pub promo_price: Option<f64>,
    pub quantity: u32,
    pub timestamp: i64,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub unit: Option<String>,
    pub city: String,
    pub state: String,
    pub zip: String,
}

/// Requested delivery window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryTimeSlot {
    /// Milliseconds since the Unix epoch (the delivery day).
    pub date: i64,
    /// Window label, e.g. "2pm-4pm".
    pub time_slot: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryInstructions {
    pub instructions: String,
}

/// Raw response of `get_session_data`. Record fields are msgpack-encoded and
/// decoded by [`crate::codec`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SessionData {
    pub address: Option<Record>,
    pub delivery_time_slot: Option<Record>,
    pub delivery_instructions: Option<Record>,
    pub session_status: String,
}
