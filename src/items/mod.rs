//! Item system: sources, references, and lookup.
//!
//! ## Key Types
//!
//! - `ItemSource`: Persisted item data (name, kind, nested rules, badge)
//! - `ItemKind`: Closed item kind tag
//! - `ItemUuid`: Shape-checked item reference
//! - `ConditionManager`: Fast in-memory condition registry
//! - `ItemStore`: Asynchronous generic item resolution

pub mod registry;
pub mod source;
pub mod uuid;

pub use registry::{ConditionLookup, ConditionManager, ItemResolver, ItemStore};
pub use source::{EffectBadge, ItemKind, ItemSource, ItemSystem, RuleSource};
pub use uuid::{ItemUuid, UuidError, UuidScope};
