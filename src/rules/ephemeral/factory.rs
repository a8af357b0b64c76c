//! Deferred effect construction.
//!
//! [`EphemeralEffectFactory`] holds everything an invocation needs and turns
//! into a [`DeferredEffect`] that can be published to a synthetics table.
//! Each invocation runs the full pipeline from scratch:
//!
//! 1. Gate on the predicate (caller options or the actor's current ones)
//! 2. Resolve placeholders in the item reference
//! 3. Shape-check the reference
//! 4. Locate the item: condition registry first, then async resolution
//! 5. Require a condition or effect
//! 6. Clone the stored source
//! 7. Reject sources carrying rules that need their own preparation
//! 8. Optionally append the derived label to the name
//! 9. Apply alterations in order; any veto discards the candidate
//!
//! Every failure resolves to `None`. Nothing here panics or returns an error.

use std::sync::Arc;

use futures::FutureExt;
use tracing::debug;

use crate::core::ActorContext;
use crate::items::{ItemSource, ItemUuid};
use crate::rules::injection::{resolve_value, InjectionContext, Resolvables};
use crate::rules::{RuleParent, RuleServices};
use crate::synthetics::{DeferredEffect, InvocationParams};

use super::label::adjust_name;
use super::schema::{RuleElementConfig, KEY};

/// Nested rule keys that cannot appear on an ephemeral effect.
///
/// The produced source is injected straight into a contextual actor clone,
/// skipping the data-preparation pipeline these rules depend on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnsafeRuleKey {
    /// Requires an interactive choice.
    ChoiceSet,
    /// Grants further items.
    GrantItem,
}

impl UnsafeRuleKey {
    /// Exact match against the unsafe set.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ChoiceSet" => Some(Self::ChoiceSet),
            "GrantItem" => Some(Self::GrantItem),
            _ => None,
        }
    }

    /// The rule key as written in configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ChoiceSet => "ChoiceSet",
            Self::GrantItem => "GrantItem",
        }
    }
}

/// Builds ephemeral effect sources on demand.
pub struct EphemeralEffectFactory {
    config: Arc<RuleElementConfig>,
    label: String,
    parent: Arc<RuleParent>,
    actor: Arc<dyn ActorContext>,
    services: RuleServices,
}

impl EphemeralEffectFactory {
    /// Create a factory. `label` is the rule's display label.
    pub fn new(
        config: Arc<RuleElementConfig>,
        label: impl Into<String>,
        parent: Arc<RuleParent>,
        actor: Arc<dyn ActorContext>,
        services: RuleServices,
    ) -> Self {
        Self {
            config,
            label: label.into(),
            parent,
            actor,
            services,
        }
    }

    /// Wrap the factory in a shareable producer.
    #[must_use]
    pub fn into_deferred(self) -> DeferredEffect {
        let factory = Arc::new(self);
        DeferredEffect::new(move |params| {
            let factory = Arc::clone(&factory);
            async move { factory.produce(params).await }.boxed()
        })
    }

    /// Run the pipeline once.
    pub async fn produce(&self, params: InvocationParams) -> Option<ItemSource> {
        if !self.passes_gate(&params) {
            debug!(item = %self.parent.name, "Predicate failed; no ephemeral effect");
            return None;
        }

        let uuid = self.resolve_uuid()?;

        let located = match self.services.conditions.condition(&uuid) {
            Some(condition) => Some(condition),
            None => {
                debug!(%uuid, "Not a registered condition; resolving item");
                self.services.items.resolve(&uuid).await
            }
        };

        let item = match located {
            Some(item) if item.kind.is_effect_like() => item,
            Some(item) => {
                self.fail_validation(format!(
                    "\"{uuid}\" is a {}, not an effect or condition",
                    item.kind
                ));
                return None;
            }
            None => {
                self.fail_validation(format!(
                    "unable to find effect or condition item with uuid \"{uuid}\""
                ));
                return None;
            }
        };

        let mut source = ItemSource::clone(&item);

        if let Some(unsafe_key) = source.rule_keys().find_map(UnsafeRuleKey::from_key) {
            self.fail_validation(format!(
                "effects with {} rule elements cannot be applied ephemerally",
                unsafe_key.as_str()
            ));
            return None;
        }

        if self.config.adjust_name {
            source.name = adjust_name(&source.name, &self.label);
        }

        self.apply_alterations(&mut source, &params.resolvables)?;

        Some(source)
    }

    fn passes_gate(&self, params: &InvocationParams) -> bool {
        if self.config.ignored {
            return false;
        }
        match &params.test {
            Some(options) => self.config.predicate.test(options),
            None => self.config.predicate.test(&self.actor.roll_options()),
        }
    }

    fn resolve_uuid(&self) -> Option<ItemUuid> {
        let actor = self.actor.injection_data();
        let rule = self.config.injection_data();
        let ctx = InjectionContext::new(&actor, &self.parent.data, &rule);

        let resolved = match self.services.injector.inject(&self.config.identifier, &ctx) {
            Ok(resolved) => resolved,
            Err(e) => {
                self.fail_validation(format!("uuid: {e}"));
                return None;
            }
        };

        match ItemUuid::parse(&resolved) {
            Ok(uuid) => Some(uuid),
            Err(e) => {
                self.fail_validation(format!("uuid: {e}"));
                None
            }
        }
    }

    fn apply_alterations(&self, source: &mut ItemSource, resolvables: &Resolvables) -> Option<()> {
        if self.config.alterations.is_empty() {
            return Some(());
        }

        let actor = self.actor.injection_data();
        let rule = self.config.injection_data();
        let ctx = InjectionContext::new(&actor, &self.parent.data, &rule).with_resolvables(resolvables);
        let alterations = &self.services.alterations;

        for (index, alteration) in self.config.alterations.iter().enumerate() {
            let value = match resolve_value(
                alteration.value.as_deref(),
                self.services.injector.as_ref(),
                &ctx,
            ) {
                Ok(value) => value,
                Err(e) => {
                    self.fail_validation(format!("alterations.{index}.value: {e}"));
                    return None;
                }
            };

            if !alterations.can_alter(alteration, source, &value) {
                debug!(
                    item = %self.parent.name,
                    index,
                    ?value,
                    "Alteration refused; discarding ephemeral effect"
                );
                return None;
            }
            alterations.apply(alteration, source, &value);
        }

        Some(())
    }

    fn fail_validation(&self, message: impl Into<String>) {
        self.services.fail_validation(&self.parent, KEY, message);
    }
}
