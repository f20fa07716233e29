//! Session wiring: configuration, the [`FinderSystem`] orchestrator, and tracing setup.

pub mod config;
pub mod finder_system;
pub mod tracing;

pub use config::*;
pub use finder_system::*;
pub use self::tracing::*;
