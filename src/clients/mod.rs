//! Typed services over the [`RuntimeClient`](crate::runtime::RuntimeClient) and the
//! partition registry.

pub mod discovery_poster;
pub mod discovery_reader;
pub mod error;
pub mod partition_joiner;
pub mod profile_client;
pub mod signal_client;

pub use discovery_poster::*;
pub use discovery_reader::*;
pub use error::*;
pub use partition_joiner::*;
pub use profile_client::*;
pub use signal_client::*;
