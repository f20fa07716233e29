//! # Record Decoder
//!
//! Turns msgpack entry bytes from a partition's records into typed values.
//!
//! Decoding never fails loudly: a missing or malformed entry becomes `None` and is
//! logged at `warn`, so one bad record cannot abort an otherwise good read.

use crate::model::{DeliveryTimeDisplay, DeliveryTimeSlot, Record};
use chrono::DateTime;
use serde::de::DeserializeOwned;
use tracing::warn;

/// Decode the entry of `record`, if present and well-formed.
pub fn decode_entry<T: DeserializeOwned>(record: &Record) -> Option<T> {
    decode_bytes(record.entry_bytes()?)
}

pub fn decode_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Option<T> {
    match rmp_serde::from_slice(bytes) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(record_type = short_type_name::<T>(), size = bytes.len(), error = %e, "Malformed record");
            None
        }
    }
}

/// Decode one element of an already-split msgpack response.
///
/// Lets a list response be read element by element, so a single malformed element
/// is dropped instead of failing the whole list.
pub fn decode_value<T: DeserializeOwned>(value: rmpv::Value) -> Option<T> {
    match rmpv::ext::from_value(value) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(record_type = short_type_name::<T>(), error = %e, "Malformed element");
            None
        }
    }
}

fn short_type_name<T>() -> &'static str {
    std::any::type_name::<T>()
        .split("::")
        .last()
        .unwrap_or("Unknown")
}

/// Render a delivery slot as e.g. `{ date: "Monday, January 1, 2024", time: "2pm-4pm" }`.
pub fn format_delivery_time(slot: &DeliveryTimeSlot) -> Option<DeliveryTimeDisplay> {
    let date = DateTime::from_timestamp_millis(slot.date)?;
    Some(DeliveryTimeDisplay {
        date: date.format("%A, %B %-d, %Y").to_string(),
        time: slot.time_slot.clone(),
    })
}
