//! Synthetics: per-actor tables of dynamically generated producers.
//!
//! - `DeferredEffect`: A lazily invoked, asynchronous effect producer
//! - `SyntheticsTable`: Selector → target/origin producer lists
//! - `prepare_synthetics`: Rebuilds a table from a set of rule elements
//!
//! ## Lifecycle
//!
//! The table is rebuilt on every data-preparation pass. Producers from a
//! previous pass are dropped with the old table, never patched in place.

mod deferred;
mod preparation;
mod table;

pub use deferred::{DeferredEffect, InvocationParams};
pub use preparation::{prepare_synthetics, rebuild_synthetics};
pub use table::{Affects, EphemeralEffectBucket, Producers, SyntheticsTable};
