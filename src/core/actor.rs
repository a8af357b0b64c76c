//! Actor view for rule evaluation.
//!
//! The actor data model lives outside this crate. Rule elements only need
//! two things from it:
//! - The set of currently active roll options (predicate gating)
//! - A data snapshot for `{actor|path}` placeholder injection
//!
//! `Actor` is a small in-memory implementation with interior mutability,
//! so roll options can change between preparation and invocation.

use std::sync::RwLock;

use im::OrdSet;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Set of active roll option strings.
///
/// Persistent set: cloning per invocation is O(1).
pub type RollOptions = OrdSet<String>;

/// What a rule element may read from its owning actor.
pub trait ActorContext: Send + Sync {
    /// Currently active roll options.
    fn roll_options(&self) -> RollOptions;

    /// Data snapshot used to resolve `{actor|path}` placeholders.
    fn injection_data(&self) -> Value;
}

/// Mutable actor data behind an [`Actor`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActorState {
    /// Display name.
    pub name: String,

    /// Active roll options.
    #[serde(default)]
    pub roll_options: RollOptions,

    /// Arbitrary system data (level, attributes, ...).
    #[serde(default)]
    pub system: Value,
}

/// In-memory actor.
///
/// ## Example
///
/// ```
/// use ephemeral_effects::core::{Actor, ActorContext};
///
/// let actor = Actor::new("Valeros").with_roll_option("self:level:3");
/// assert!(actor.roll_options().contains("self:level:3"));
///
/// actor.set_roll_option("target:condition:flat-footed", true);
/// assert_eq!(actor.roll_options().len(), 2);
/// ```
#[derive(Debug, Default)]
pub struct Actor {
    state: RwLock<ActorState>,
}

impl Actor {
    /// Create an actor with no roll options and empty system data.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_state(ActorState {
            name: name.into(),
            ..ActorState::default()
        })
    }

    /// Wrap existing actor data.
    #[must_use]
    pub fn from_state(state: ActorState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    /// Add a roll option (builder pattern).
    #[must_use]
    pub fn with_roll_option(self, option: impl Into<String>) -> Self {
        self.set_roll_option(option, true);
        self
    }

    /// Set system data (builder pattern).
    #[must_use]
    pub fn with_system(self, system: Value) -> Self {
        self.update(|state| state.system = system);
        self
    }

    /// Toggle a roll option on or off.
    pub fn set_roll_option(&self, option: impl Into<String>, active: bool) {
        let option = option.into();
        self.update(|state| {
            if active {
                state.roll_options.insert(option);
            } else {
                state.roll_options.remove(&option);
            }
        });
    }

    /// Get the actor name.
    #[must_use]
    pub fn name(&self) -> String {
        self.read(|state| state.name.clone())
    }

    /// Get a copy of the full actor state.
    #[must_use]
    pub fn snapshot(&self) -> ActorState {
        self.read(Clone::clone)
    }

    fn read<T>(&self, f: impl FnOnce(&ActorState) -> T) -> T {
        // A poisoned lock only means a writer panicked; the data is still usable.
        let guard = self.state.read().unwrap_or_else(|e| e.into_inner());
        f(&guard)
    }

    fn update(&self, f: impl FnOnce(&mut ActorState)) {
        let mut guard = self.state.write().unwrap_or_else(|e| e.into_inner());
        f(&mut guard);
    }
}

impl ActorContext for Actor {
    fn roll_options(&self) -> RollOptions {
        self.read(|state| state.roll_options.clone())
    }

    fn injection_data(&self) -> Value {
        self.read(|state| {
            serde_json::json!({
                "name": state.name,
                "system": state.system,
            })
        })
    }
}
