//! Per-actor synthetics table.
//!
//! Maps selector → producers for each side of an action. The table is
//! rebuilt from scratch on every data-preparation pass; entries are only
//! ever appended during a pass.

use futures::future::join_all;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::items::ItemSource;

use super::deferred::{DeferredEffect, InvocationParams};

/// Which side of an action a producer's effect is attached to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Affects {
    /// The action's target.
    #[default]
    Target,
    /// The action's originator.
    Origin,
}

impl std::fmt::Display for Affects {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Target => f.write_str("target"),
            Self::Origin => f.write_str("origin"),
        }
    }
}

/// Producers registered for a single selector.
pub type Producers = SmallVec<[DeferredEffect; 2]>;

/// Target- and origin-side producers for one selector.
#[derive(Clone, Debug, Default)]
pub struct EphemeralEffectBucket {
    pub target: Producers,
    pub origin: Producers,
}

impl EphemeralEffectBucket {
    /// Producers for one side.
    #[must_use]
    pub fn side(&self, affects: Affects) -> &[DeferredEffect] {
        match affects {
            Affects::Target => &self.target,
            Affects::Origin => &self.origin,
        }
    }

    /// Mutable producers for one side.
    pub fn side_mut(&mut self, affects: Affects) -> &mut Producers {
        match affects {
            Affects::Target => &mut self.target,
            Affects::Origin => &mut self.origin,
        }
    }

    /// Check if neither side has producers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.target.is_empty() && self.origin.is_empty()
    }
}

/// Dynamically generated behavior producers, keyed by selector.
#[derive(Clone, Debug, Default)]
pub struct SyntheticsTable {
    ephemeral_effects: FxHashMap<String, EphemeralEffectBucket>,
}

impl SyntheticsTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bucket for a selector, created empty if the selector is new.
    pub fn bucket_mut(&mut self, selector: &str) -> &mut EphemeralEffectBucket {
        self.ephemeral_effects
            .entry(selector.to_string())
            .or_default()
    }

    /// Append a producer to one side of a selector's bucket.
    pub fn register(&mut self, selector: &str, affects: Affects, producer: DeferredEffect) {
        self.bucket_mut(selector).side_mut(affects).push(producer);
    }

    /// Bucket for a selector, if any producer was registered this pass.
    #[must_use]
    pub fn bucket(&self, selector: &str) -> Option<&EphemeralEffectBucket> {
        self.ephemeral_effects.get(selector)
    }

    /// Producers for a selector and side. Empty if none are registered.
    #[must_use]
    pub fn ephemeral_effects(&self, selector: &str, affects: Affects) -> &[DeferredEffect] {
        self.bucket(selector)
            .map(|bucket| bucket.side(affects))
            .unwrap_or(&[])
    }

    /// Iterate over registered selectors.
    pub fn selectors(&self) -> impl Iterator<Item = &str> {
        self.ephemeral_effects.keys().map(String::as_str)
    }

    /// Number of selectors with a bucket.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ephemeral_effects.len()
    }

    /// Check if no selector has a bucket.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ephemeral_effects.is_empty()
    }

    /// Drop every bucket. Called by the framework before each pass.
    pub fn clear(&mut self) {
        self.ephemeral_effects.clear();
    }

    /// Invoke every producer registered for `selectors` on one side and
    /// collect the effects that were actually produced.
    ///
    /// Results keep selector order, then registration order. Producers that
    /// resolve to nothing are skipped.
    pub async fn extract_ephemeral_effects<'s>(
        &self,
        selectors: impl IntoIterator<Item = &'s str>,
        affects: Affects,
        params: &InvocationParams,
    ) -> Vec<ItemSource> {
        let pending: Vec<_> = selectors
            .into_iter()
            .flat_map(|selector| self.ephemeral_effects(selector, affects))
            .map(|producer| producer.invoke(params.clone()))
            .collect();

        join_all(pending).await.into_iter().flatten().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::ItemKind;
    use futures::executor::block_on;
    use futures::FutureExt;

    fn named(name: &'static str) -> DeferredEffect {
        DeferredEffect::new(move |_| {
            async move { Some(ItemSource::new(name, ItemKind::Effect)) }.boxed()
        })
    }

    fn nothing() -> DeferredEffect {
        DeferredEffect::new(|_| async { None::<ItemSource> }.boxed())
    }

    #[test]
    fn test_register_creates_bucket() {
        let mut table = SyntheticsTable::new();
        assert!(table.bucket("strike-damage").is_none());

        table.register("strike-damage", Affects::Origin, named("A"));

        let bucket = table.bucket("strike-damage").unwrap();
        assert_eq!(bucket.origin.len(), 1);
        assert!(bucket.target.is_empty());
        assert!(!bucket.is_empty());
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_register_appends_in_order() {
        let mut table = SyntheticsTable::new();
        let first = named("first");
        let second = named("second");

        table.register("attack", Affects::Target, first.clone());
        table.register("attack", Affects::Target, second.clone());

        let producers = table.ephemeral_effects("attack", Affects::Target);
        assert_eq!(producers.len(), 2);
        assert!(producers[0].ptr_eq(&first));
        assert!(producers[1].ptr_eq(&second));
    }

    #[test]
    fn test_unknown_selector_is_empty() {
        let table = SyntheticsTable::new();
        assert!(table.ephemeral_effects("damage", Affects::Target).is_empty());
    }

    #[test]
    fn test_clear() {
        let mut table = SyntheticsTable::new();
        table.register("a", Affects::Target, nothing());
        table.register("b", Affects::Origin, nothing());
        assert_eq!(table.selectors().count(), 2);

        table.clear();
        assert!(table.is_empty());
    }

    #[test]
    fn test_extract_skips_nothing_and_keeps_order() {
        let mut table = SyntheticsTable::new();
        table.register("strike-attack", Affects::Target, named("A"));
        table.register("strike-attack", Affects::Target, nothing());
        table.register("strike-damage", Affects::Target, named("B"));
        table.register("strike-damage", Affects::Origin, named("C"));

        let effects = block_on(table.extract_ephemeral_effects(
            ["strike-attack", "strike-damage", "unknown"],
            Affects::Target,
            &InvocationParams::new(),
        ));

        let names: Vec<_> = effects.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }

    #[test]
    fn test_affects_serialization() {
        assert_eq!(serde_json::to_string(&Affects::Origin).unwrap(), "\"origin\"");
        let affects: Affects = serde_json::from_str("\"target\"").unwrap();
        assert_eq!(affects, Affects::Target);
        assert_eq!(Affects::default(), Affects::Target);
    }
}
