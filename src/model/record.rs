use crate::model::ActionHash;
use serde::{Deserialize, Serialize};

/// Serialized entry bytes (msgpack) of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub entry: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RecordEntry {
    Present(Entry),
    Hidden,
    NotApplicable,
    NotStored,
}

/// A committed record as returned by read-only zome calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub action_hash: ActionHash,
    pub entry: RecordEntry,
}

impl Record {
    pub fn present(action_hash: ActionHash, bytes: Vec<u8>) -> Self {
        Self {
            action_hash,
            entry: RecordEntry::Present(Entry { entry: bytes }),
        }
    }

    pub fn entry_bytes(&self) -> Option<&[u8]> {
        match &self.entry {
            RecordEntry::Present(entry) => Some(&entry.entry),
            _ => None,
        }
    }
}
