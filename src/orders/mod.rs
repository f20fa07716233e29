//! Shopper- and customer-facing order services built on the clients.

pub mod aggregator;
pub mod error;
pub mod response;

pub use aggregator::*;
pub use error::*;
pub use response::*;
