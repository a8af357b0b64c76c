//! Rule elements: configuration-driven behavior attached to items.
//!
//! ## Key Types
//!
//! - [`RuleElement`]: Hook interface driven by the data-preparation pass
//! - [`RuleServices`]: Collaborators a rule element needs at run time
//! - [`RuleParent`]: The item that owns a rule element
//! - [`Predicate`]: Test over roll options gating a rule element
//! - [`PropertyInjector`]: `{scope|path}` placeholder resolution
//! - [`AlterationCapability`]: Applies item alterations with veto power
//!
//! ## Implemented rule elements
//!
//! - [`EphemeralEffectRuleElement`] (`EphemeralEffect`)
//!
//! ## Design Philosophy
//!
//! Every collaborator is passed in explicitly through [`RuleServices`].
//! Nothing is looked up through global registries, so tests can swap any
//! collaborator for a stub.

pub mod alteration;
pub mod ephemeral;
pub mod injection;
pub mod predicate;

use std::sync::Arc;

use serde_json::Value;

use crate::core::{Diagnostic, ValidationReporter};
use crate::items::{ConditionLookup, ItemResolver, ItemSource};
use crate::synthetics::SyntheticsTable;

pub use alteration::{
    AlterationCapability, AlterationMode, AlterationProperty, BadgeAlterations, ItemAlteration,
};
pub use ephemeral::{
    derive_label, ConfigError, EphemeralEffectFactory, EphemeralEffectRuleElement,
    EphemeralEffectSource, RuleElementConfig, UnsafeRuleKey,
};
pub use injection::{
    resolve_value, InjectionContext, InjectionError, PlaceholderInjector, PropertyInjector,
    ResolvedValue, Resolvables,
};
pub use predicate::{Predicate, PredicateStatement};

/// Priority used when a configuration block does not set one.
pub const DEFAULT_PRIORITY: i32 = 100;

/// A rule element driven by the owning actor's data-preparation pass.
pub trait RuleElement: Send + Sync {
    /// Rule element key, as written in configuration.
    fn key(&self) -> &'static str;

    /// Lower priorities run first.
    fn priority(&self) -> i32 {
        DEFAULT_PRIORITY
    }

    /// Publish synthetics for this pass. Must not panic.
    fn before_prepare_data(&self, synthetics: &mut SyntheticsTable);
}

/// The item that owns a rule element.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RuleParent {
    /// Item name; the default rule label.
    pub name: String,
    /// Data for `{item|path}` placeholders.
    pub data: Value,
}

impl RuleParent {
    /// Create a parent with only a name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let data = serde_json::json!({ "name": name });
        Self { name, data }
    }

    /// Create a parent from an item source.
    #[must_use]
    pub fn from_item(item: &ItemSource) -> Self {
        Self {
            name: item.name.clone(),
            data: serde_json::to_value(item).unwrap_or_default(),
        }
    }

    /// Replace the placeholder data (builder pattern).
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }
}

/// Collaborators used by rule elements.
///
/// ## Example
///
/// ```
/// use std::sync::Arc;
/// use ephemeral_effects::core::DiagnosticLog;
/// use ephemeral_effects::items::{ConditionManager, ItemStore};
/// use ephemeral_effects::rules::RuleServices;
///
/// let services = RuleServices::new(
///     Arc::new(ConditionManager::new()),
///     Arc::new(ItemStore::new()),
///     Arc::new(DiagnosticLog::new()),
/// );
/// # let _ = services;
/// ```
#[derive(Clone)]
pub struct RuleServices {
    /// Fast-path condition lookup.
    pub conditions: Arc<dyn ConditionLookup>,
    /// Generic asynchronous item resolution.
    pub items: Arc<dyn ItemResolver>,
    /// Placeholder resolution.
    pub injector: Arc<dyn PropertyInjector>,
    /// Alteration application.
    pub alterations: Arc<dyn AlterationCapability>,
    /// Non-throwing validation reporting.
    pub reporter: Arc<dyn ValidationReporter>,
}

impl RuleServices {
    /// Create services with the default injector and alteration handling.
    pub fn new(
        conditions: Arc<dyn ConditionLookup>,
        items: Arc<dyn ItemResolver>,
        reporter: Arc<dyn ValidationReporter>,
    ) -> Self {
        Self {
            conditions,
            items,
            injector: Arc::new(PlaceholderInjector),
            alterations: Arc::new(BadgeAlterations),
            reporter,
        }
    }

    /// Use a different placeholder injector.
    #[must_use]
    pub fn with_injector(mut self, injector: Arc<dyn PropertyInjector>) -> Self {
        self.injector = injector;
        self
    }

    /// Use a different alteration capability.
    #[must_use]
    pub fn with_alterations(mut self, alterations: Arc<dyn AlterationCapability>) -> Self {
        self.alterations = alterations;
        self
    }

    /// Report a validation failure for a rule on `parent`.
    pub fn fail_validation(&self, parent: &RuleParent, key: &str, message: impl Into<String>) {
        self.reporter
            .report(Diagnostic::new(parent.name.as_str(), key, message));
    }
}
