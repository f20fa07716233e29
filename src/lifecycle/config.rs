use crate::clients::CloneMatch;
use crate::runtime::zome;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use tracing::warn;

const DEFAULT_PLACEHOLDER_NAME: &str = "Unknown Customer";
const DEFAULT_REGISTRY_BUFFER: usize = 32;

/// Names and knobs of a [`FinderSystem`](super::FinderSystem).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinderConfig {
    /// Role whose clones hold customer carts (including the local participant's own).
    pub cart_role: String,
    /// Role of the shared discovery space.
    pub order_finder_role: String,
    pub cart_zome: String,
    pub order_finder_zome: String,
    pub profiles_zome: String,
    /// Display name used when a customer's profile cannot be read.
    pub placeholder_name: String,
    /// Mailbox size of the registry actor.
    pub registry_buffer: usize,
    /// What to do when a duplicate conflict leaves only clones unrelated to the seed.
    pub clone_match: CloneMatch,
    /// Check cached partitions are still installed before using them.
    pub validate_cached_handles: bool,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            cart_role: zome::CART_ROLE.to_string(),
            order_finder_role: zome::ORDER_FINDER_ROLE.to_string(),
            cart_zome: zome::CART_ZOME.to_string(),
            order_finder_zome: zome::ORDER_FINDER_ZOME.to_string(),
            profiles_zome: zome::PROFILES_ZOME.to_string(),
            placeholder_name: DEFAULT_PLACEHOLDER_NAME.to_string(),
            registry_buffer: DEFAULT_REGISTRY_BUFFER,
            clone_match: CloneMatch::default(),
            validate_cached_handles: false,
        }
    }
}

impl FinderConfig {
    /// Read `CART_FINDER_*` variables, keeping the default for anything unset or invalid.
    pub fn from_env_or_default() -> Self {
        let defaults = Self::default();
        Self {
            cart_role: env::var("CART_FINDER_CART_ROLE").unwrap_or(defaults.cart_role),
            order_finder_role: env::var("CART_FINDER_ORDER_FINDER_ROLE")
                .unwrap_or(defaults.order_finder_role),
            cart_zome: env::var("CART_FINDER_CART_ZOME").unwrap_or(defaults.cart_zome),
            order_finder_zome: env::var("CART_FINDER_ORDER_FINDER_ZOME")
                .unwrap_or(defaults.order_finder_zome),
            profiles_zome: env::var("CART_FINDER_PROFILES_ZOME").unwrap_or(defaults.profiles_zome),
            placeholder_name: env::var("CART_FINDER_PLACEHOLDER_NAME")
                .unwrap_or(defaults.placeholder_name),
            registry_buffer: parse_var("CART_FINDER_REGISTRY_BUFFER", defaults.registry_buffer),
            clone_match: parse_var("CART_FINDER_CLONE_MATCH", defaults.clone_match),
            validate_cached_handles: parse_var(
                "CART_FINDER_VALIDATE_CACHED_HANDLES",
                defaults.validate_cached_handles,
            ),
        }
    }
}

fn parse_var<T>(name: &str, default: T) -> T
where
    T: FromStr + std::fmt::Debug,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|e| {
            warn!("{raw} is not a valid value for {name}. {e} Using the default, {default:?}, instead.");
            default
        }),
        Err(_) => default,
    }
}
