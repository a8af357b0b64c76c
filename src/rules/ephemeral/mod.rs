//! `EphemeralEffect`: attach an effect or condition to one side of an
//! action without persisting it on the actor.
//!
//! - `schema`: Author configuration and construction-time validation
//! - `label`: Name adjustment of produced effects
//! - `factory`: The deferred, asynchronous production pipeline
//! - `element`: The rule element and its synthetics registration

mod element;
mod factory;
mod label;
mod schema;

pub use element::EphemeralEffectRuleElement;
pub use factory::{EphemeralEffectFactory, UnsafeRuleKey};
pub use label::{adjust_name, derive_label};
pub use schema::{ConfigError, EphemeralEffectSource, RuleElementConfig, KEY};
