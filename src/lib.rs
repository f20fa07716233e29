//! # Cart Finder
//!
//! > **Cart discovery and partition joins for a peer-to-peer grocery app.**
//!
//! Customers assemble a cart in their own data partition and advertise it in a shared
//! discovery space. Shoppers list those advertisements and, when they open one, join
//! that specific customer's partition to read items and delivery details live.
//!
//! ## 🏗️ Design Philosophy
//!
//! ### One Owner for the Cache
//! The `seed → partition` cache is process-wide mutable state. Instead of a global map
//! it is a [`RegistryActor`](registry_actor::RegistryActor) that owns the entries and
//! serves requests one at a time, so no lock guards it.
//!
//! ### Joins Are Idempotent
//! Creating a partition is not idempotent on the runtime side. The
//! [`PartitionJoiner`](clients::PartitionJoiner) makes it so:
//! - repeat joins in this process are served from the registry;
//! - concurrent joins of one seed wait for a single owner instead of racing;
//! - a duplicate conflict with another session falls back to adopting the
//!   existing clone, matched to the seed by network seed or name tag.
//!
//! ## 👩‍💻 Architecture Notes
//!
//! ### 1. Typed Boundary
//! Every runtime call goes through [`RuntimeClient`](runtime::RuntimeClient) with typed
//! request schemas. Payloads are msgpack-encoded and decoded in one place
//! ([`runtime::call`]).
//!
//! ### 2. Type-Safe Error Handling
//! Each layer has its own error enum (`RuntimeError`, `RegistryError`, `JoinError`,
//! `OrderError`). Lower layers propagate; the [`orders`] layer returns a typed failure
//! that converts into a [`ServiceResponse`](orders::ServiceResponse) for UI consumers.
//!
//! ### 3. Isolated Failures
//! Listing orders never fails because of one customer's profile or one bad record:
//! those fall back to a placeholder and log a warning.
//!
//! ### 4. Observability
//! `tracing` everywhere with structured fields. See [`lifecycle::tracing`].
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Data ([`model`])
//! Seeds, hashes, partition handles, advertisements, cart contents.
//!
//! ### 2. The Boundary ([`runtime`])
//! The runtime contract, its errors, and an in-memory implementation
//! ([`InMemoryRuntime`](runtime::memory::InMemoryRuntime)) for the demo and tests.
//!
//! ### 3. The Cache ([`registry_actor`])
//! The partition registry actor and its client.
//!
//! ### 4. The Interface ([`clients`])
//! - [`PartitionJoiner`](clients::PartitionJoiner): seed → partition.
//! - [`DiscoveryPoster`](clients::DiscoveryPoster) / [`DiscoveryReader`](clients::DiscoveryReader):
//!   the discovery space.
//! - [`ProfileLookup`](clients::ProfileLookup), [`SignalClient`](clients::SignalClient).
//!
//! ### 5. The Orchestration ([`orders`], [`lifecycle`])
//! [`OrderAggregator`](orders::OrderAggregator) turns advertisements into summaries and
//! loads details on demand. [`FinderSystem`](lifecycle::FinderSystem) owns the registry
//! actor and the aggregator for one session.
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! # Run the customer/shopper demo with info logs
//! RUST_LOG=info cargo run
//!
//! cargo test
//! ```

pub mod clients;
pub mod codec;
pub mod lifecycle;
pub mod model;
pub mod orders;
pub mod registry_actor;
pub mod runtime;
