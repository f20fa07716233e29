use serde::{Deserialize, Serialize};

/// Real-time updates exchanged between customer and shopper over a joined cart partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum CartSignal {
    ShopperJoined { shopper_name: String },
    ItemScanned { product_id: String, scanned: bool },
    NoteUpdated { product_id: String, note: String },
    StatusChanged { status: String },
}
