//! Byte-string identifiers handed out by the runtime.
//!
//! All of them render as URL-safe base64 with the `u` multibase prefix, the form
//! shown to users and used as the shopper's own network seed.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::fmt::Display;

macro_rules! hash_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Vec<u8>);

        impl $name {
            pub fn to_b64(&self) -> String {
                format!("u{}", URL_SAFE_NO_PAD.encode(&self.0))
            }
        }

        impl From<Vec<u8>> for $name {
            fn from(bytes: Vec<u8>) -> Self {
                Self(bytes)
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.to_b64())
            }
        }
    };
}

hash_type!(
    /// Identifies a data space (one partition's network).
    SpaceHash
);

hash_type!(
    /// Public key of a participant (customer or shopper).
    AgentPubKey
);

hash_type!(
    /// Content address of a committed record, e.g. a posted advertisement.
    ActionHash
);

impl AgentPubKey {
    /// Short, human-readable identifier: first 8 characters of the base64 form plus an ellipsis.
    pub fn short_id(&self) -> String {
        let full = self.to_b64();
        let cut = full.char_indices().nth(8).map(|(i, _)| i).unwrap_or(full.len());
        format!("{}...", &full[..cut])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_with_multibase_prefix() {
        let key = AgentPubKey(vec![0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(key.to_b64(), "u3q2-7w");
        assert_eq!(key.to_string(), key.to_b64());
    }

    #[test]
    fn short_id_truncates() {
        let key = AgentPubKey(vec![7; 32]);
        let short = key.short_id();
        assert!(short.ends_with("..."));
        assert_eq!(short.len(), 11);
    }
}
