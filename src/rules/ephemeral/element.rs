//! The `EphemeralEffect` rule element.
//!
//! On every data-preparation pass the element resolves its selectors and
//! publishes one fresh producer under each of them, on the side named by
//! `affects`. All selectors share the same producer.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::core::ActorContext;
use crate::rules::injection::InjectionContext;
use crate::rules::{RuleElement, RuleParent, RuleServices};
use crate::synthetics::{Affects, DeferredEffect, SyntheticsTable};

use super::factory::EphemeralEffectFactory;
use super::schema::{ConfigError, RuleElementConfig, KEY};

/// Attaches an effect or condition to one side of matching actions
/// without adding it to the actor.
///
/// ## Example
///
/// ```
/// use std::sync::Arc;
/// use ephemeral_effects::core::{Actor, DiagnosticLog};
/// use ephemeral_effects::items::{ConditionManager, ItemStore};
/// use ephemeral_effects::rules::{EphemeralEffectRuleElement, RuleElement, RuleParent, RuleServices};
/// use ephemeral_effects::synthetics::{Affects, SyntheticsTable};
/// use serde_json::json;
///
/// let services = RuleServices::new(
///     Arc::new(ConditionManager::new()),
///     Arc::new(ItemStore::new()),
///     Arc::new(DiagnosticLog::new()),
/// );
/// let rule = EphemeralEffectRuleElement::new(
///     json!({ "key": "EphemeralEffect", "affects": "origin", "selectors": ["strike-damage"], "uuid": "Item.abc" }),
///     RuleParent::new("Sneak Attack"),
///     Arc::new(Actor::new("Merisiel")),
///     services,
/// )
/// .unwrap();
///
/// let mut synthetics = SyntheticsTable::new();
/// rule.before_prepare_data(&mut synthetics);
/// assert_eq!(synthetics.ephemeral_effects("strike-damage", Affects::Origin).len(), 1);
/// ```
pub struct EphemeralEffectRuleElement {
    config: Arc<RuleElementConfig>,
    label: String,
    parent: Arc<RuleParent>,
    actor: Arc<dyn ActorContext>,
    services: RuleServices,
}

impl EphemeralEffectRuleElement {
    /// Parse, validate and construct from raw configuration.
    pub fn new(
        source: Value,
        parent: RuleParent,
        actor: Arc<dyn ActorContext>,
        services: RuleServices,
    ) -> Result<Self, ConfigError> {
        let config = RuleElementConfig::from_value(source)?;
        Ok(Self::from_config(config, parent, actor, services))
    }

    /// Construct from an already validated configuration.
    pub fn from_config(
        config: RuleElementConfig,
        parent: RuleParent,
        actor: Arc<dyn ActorContext>,
        services: RuleServices,
    ) -> Self {
        let label = config.label.clone().unwrap_or_else(|| parent.name.clone());
        Self {
            config: Arc::new(config),
            label,
            parent: Arc::new(parent),
            actor,
            services,
        }
    }

    /// The validated configuration.
    #[must_use]
    pub fn config(&self) -> &RuleElementConfig {
        &self.config
    }

    /// Display label: the configured label or the parent item's name.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Side of the action the effect is attached to.
    #[must_use]
    pub fn affects(&self) -> Affects {
        self.config.affects
    }

    /// Build a fresh producer for this configuration.
    #[must_use]
    pub fn deferred_effect(&self) -> DeferredEffect {
        EphemeralEffectFactory::new(
            Arc::clone(&self.config),
            self.label.clone(),
            Arc::clone(&self.parent),
            Arc::clone(&self.actor),
            self.services.clone(),
        )
        .into_deferred()
    }

    /// Substitute placeholders in every selector.
    ///
    /// `None` (after reporting) if any selector fails to resolve or resolves
    /// to a blank string.
    pub fn resolve_selectors(&self) -> Option<Vec<String>> {
        let actor = self.actor.injection_data();
        let rule = self.config.injection_data();
        let ctx = InjectionContext::new(&actor, &self.parent.data, &rule);

        let mut resolved = Vec::with_capacity(self.config.selectors.len());
        for (index, selector) in self.config.selectors.iter().enumerate() {
            match self.services.injector.inject(selector, &ctx) {
                Ok(selector) if !selector.trim().is_empty() => resolved.push(selector),
                Ok(_) => {
                    self.fail_validation(format!("selectors.{index}: resolved to an empty string"));
                    return None;
                }
                Err(e) => {
                    self.fail_validation(format!("selectors.{index}: {e}"));
                    return None;
                }
            }
        }
        Some(resolved)
    }

    fn fail_validation(&self, message: impl Into<String>) {
        self.services.fail_validation(&self.parent, KEY, message);
    }
}

impl RuleElement for EphemeralEffectRuleElement {
    fn key(&self) -> &'static str {
        KEY
    }

    fn priority(&self) -> i32 {
        self.config.priority
    }

    fn before_prepare_data(&self, synthetics: &mut SyntheticsTable) {
        if self.config.ignored {
            return;
        }
        let Some(selectors) = self.resolve_selectors() else {
            return;
        };

        let producer = self.deferred_effect();
        for selector in &selectors {
            synthetics.register(selector, self.config.affects, producer.clone());
        }

        debug!(
            item = %self.parent.name,
            affects = %self.config.affects,
            selectors = ?selectors,
            "Registered ephemeral effect"
        );
    }
}
