//! # Partition Registry
//!
//! The process-wide `seed → partition` cache, rebuilt as an actor so the map has one owner.
//!
//! The [`RegistryActor`] holds the entries and processes requests sequentially; every
//! other component talks to it through a cloneable [`RegistryClient`]. Besides plain
//! `get`/`has`/`set`/`clear`, it hands out per-seed [claims](RegistryClient::claim) so
//! that concurrent joins of one seed issue a single create.

pub mod actor;
pub mod client;
pub mod error;
pub mod message;

pub use actor::*;
pub use client::*;
pub use error::*;

/// Creates a new registry actor and its client.
pub fn new(buffer_size: usize) -> (RegistryActor, RegistryClient) {
    let (sender, receiver) = tokio::sync::mpsc::channel(buffer_size);
    (RegistryActor::new(receiver), RegistryClient::new(sender))
}
