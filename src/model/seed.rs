use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt::Display;

/// Opaque key identifying one customer's cart partition.
///
/// A seed is used both as the registry key and as the network seed handed to the
/// runtime when the partition is cloned. It never changes once created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Seed(String);

impl Seed {
    pub fn new(seed: impl Into<String>) -> Self {
        Self(seed.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The first 8 characters, used in human-readable partition names.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(8) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }

    /// Stable 16 hex-character tag derived from SHA-256 of the seed.
    ///
    /// Embedded in partition names so a clone can be matched back to its seed
    /// when the runtime does not report network seeds.
    pub fn tag(&self) -> String {
        let digest = Sha256::digest(self.0.as_bytes());
        hex::encode(&digest[..8])
    }
}

impl From<&str> for Seed {
    fn from(seed: &str) -> Self {
        Self::new(seed)
    }
}

impl From<String> for Seed {
    fn from(seed: String) -> Self {
        Self(seed)
    }
}

impl AsRef<str> for Seed {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
