//! Pure data structures shared by the runtime, the registry, and the order services.

pub mod advertisement;
pub mod cart;
pub mod hashes;
pub mod order;
pub mod partition;
pub mod profile;
pub mod record;
pub mod seed;
pub mod signal;

pub use advertisement::*;
pub use cart::*;
pub use hashes::*;
pub use order::*;
pub use partition::*;
pub use profile::*;
pub use record::*;
pub use seed::*;
pub use signal::*;
