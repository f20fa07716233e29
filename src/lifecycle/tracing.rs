//! # Observability & Tracing
//!
//! [`setup_tracing`] initialises structured logging with the `tracing` crate. Levels are
//! controlled with the `RUST_LOG` environment variable.
//!
//! ```bash
//! # Lifecycle only: actor start/stop, partitions created or adopted, orders posted
//! RUST_LOG=info cargo run
//!
//! # Registry hits, claims, and full request payloads
//! RUST_LOG=debug cargo run
//!
//! # Only the joiner
//! RUST_LOG=cart_finder::clients::partition_joiner=debug cargo run
//! ```
//!
//! A shopper opening an order logs, at `debug`:
//!
//! ```text
//! DEBUG join{seed=alice-seed-123}: Claim granted seed=alice-seed-123
//! INFO join{seed=alice-seed-123}: Partition created partition=uAbC...
//! INFO join{seed=alice-seed-123}: Registered seed=alice-seed-123 partition=uAbC...
//! DEBUG load_order_details{seed=alice-seed-123}: Order details loaded items=0 status=
//! ```
//!
//! Per-order failures that are absorbed (a profile lookup, a malformed record) log at
//! `warn` with the affected agent or record type as a field.

pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
