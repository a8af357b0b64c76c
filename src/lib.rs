//! # ephemeral-effects
//!
//! The `EphemeralEffect` rule element: attach an effect or condition to one
//! side of an action (its target or its origin) for the duration of that
//! action, without adding it to the actor.
//!
//! ## Design Principles
//!
//! 1. **Deferred Production**: Registration publishes producers, not items.
//!    The item is located, cloned and altered only when an action invokes
//!    the producer, so it always reflects current actor state.
//!
//! 2. **Never Throw at Run Time**: Configuration errors surface when the rule
//!    element is constructed. Everything after that resolves to "no effect"
//!    plus a diagnostic sent to a [`ValidationReporter`].
//!
//! 3. **Explicit Collaborators**: Condition lookup, item resolution,
//!    placeholder injection and alteration handling are traits bundled in
//!    [`RuleServices`].
//!
//! ## Modules
//!
//! - `core`: Actor view and diagnostics
//! - `items`: Item sources, references, condition registry and item store
//! - `rules`: Rule element interface, predicates, injection, alterations,
//!   and the `EphemeralEffect` element
//! - `synthetics`: Deferred producers and the per-actor synthetics table

pub mod core;
pub mod items;
pub mod rules;
pub mod synthetics;

// Re-export commonly used types
pub use crate::core::{
    Actor, ActorContext, ActorState, Diagnostic, DiagnosticLog, RollOptions, ValidationReporter,
};

pub use crate::items::{
    ConditionLookup, ConditionManager, EffectBadge, ItemKind, ItemResolver, ItemSource, ItemStore,
    ItemUuid,
};

pub use crate::rules::{
    ConfigError, EphemeralEffectRuleElement, ItemAlteration, Predicate, RuleElement,
    RuleElementConfig, RuleParent, RuleServices,
};

pub use crate::synthetics::{
    prepare_synthetics, Affects, DeferredEffect, InvocationParams, SyntheticsTable,
};
