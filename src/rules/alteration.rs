//! Item alterations.
//!
//! An alteration is a declared mutation of a produced item's data:
//! a `mode` (how to combine), a `property` (what to change) and a `value`
//! expression resolved at invocation time.
//!
//! Applying alterations goes through [`AlterationCapability`], which can
//! refuse an alteration outright. A refusal is a veto, not an error.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::items::{EffectBadge, ItemSource};

use super::injection::ResolvedValue;

/// How the resolved value combines with the current one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlterationMode {
    /// Add to the current value.
    Add,
    /// Replace the current value.
    Override,
    /// Replace the current value only if the new one is higher.
    Upgrade,
}

/// Which property of the item is altered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AlterationProperty {
    /// The value shown on the item's badge.
    BadgeValue,
}

/// A configured alteration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAlteration {
    pub mode: AlterationMode,

    pub property: AlterationProperty,

    /// Unresolved value expression. Numbers and booleans in the source
    /// configuration are kept in their textual form.
    #[serde(
        default,
        deserialize_with = "deserialize_expression",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<String>,
}

impl ItemAlteration {
    /// Create an alteration.
    pub fn new(
        mode: AlterationMode,
        property: AlterationProperty,
        value: impl Into<String>,
    ) -> Self {
        Self {
            mode,
            property,
            value: Some(value.into()),
        }
    }

    /// Create a badge-value alteration.
    pub fn badge_value(mode: AlterationMode, value: impl Into<String>) -> Self {
        Self::new(mode, AlterationProperty::BadgeValue, value)
    }
}

fn deserialize_expression<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "alteration value must be a string, found {other}"
        ))),
    }
}

/// Capability that applies alterations to a candidate item.
pub trait AlterationCapability: Send + Sync {
    /// Can `alteration` be applied to `source` with the resolved value?
    fn can_alter(
        &self,
        alteration: &ItemAlteration,
        source: &ItemSource,
        value: &ResolvedValue,
    ) -> bool;

    /// Apply `alteration` in place. Only called after `can_alter` agreed.
    fn apply(&self, alteration: &ItemAlteration, source: &mut ItemSource, value: &ResolvedValue);
}

/// Standard alteration handling.
///
/// `badge-value` requires an integer value and a counter or value badge.
/// Counter badges are clamped into `[min, max]` after the change; `min`
/// defaults to 1 and `max` to the number of labels, when labels exist.
///
/// ```
/// use ephemeral_effects::items::{EffectBadge, ItemKind, ItemSource};
/// use ephemeral_effects::rules::{AlterationCapability, AlterationMode, BadgeAlterations, ItemAlteration, ResolvedValue};
///
/// let mut frightened = ItemSource::new("Frightened", ItemKind::Condition).with_badge(EffectBadge::counter(1));
/// let alteration = ItemAlteration::badge_value(AlterationMode::Add, "1");
/// let value = ResolvedValue::Int(1);
///
/// assert!(BadgeAlterations.can_alter(&alteration, &frightened, &value));
/// BadgeAlterations.apply(&alteration, &mut frightened, &value);
/// assert_eq!(frightened.system.badge.unwrap().as_int(), Some(2));
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct BadgeAlterations;

impl BadgeAlterations {
    fn combine(mode: AlterationMode, current: i64, value: i64) -> i64 {
        match mode {
            AlterationMode::Add => current.saturating_add(value),
            AlterationMode::Override => value,
            AlterationMode::Upgrade => current.max(value),
        }
    }
}

impl AlterationCapability for BadgeAlterations {
    fn can_alter(
        &self,
        alteration: &ItemAlteration,
        source: &ItemSource,
        value: &ResolvedValue,
    ) -> bool {
        match alteration.property {
            AlterationProperty::BadgeValue => {
                value.as_int().is_some()
                    && source
                        .system
                        .badge
                        .as_ref()
                        .is_some_and(|badge| badge.as_int().is_some())
            }
        }
    }

    fn apply(&self, alteration: &ItemAlteration, source: &mut ItemSource, value: &ResolvedValue) {
        let Some(value) = value.as_int() else {
            return;
        };

        match (alteration.property, source.system.badge.as_mut()) {
            (
                AlterationProperty::BadgeValue,
                Some(EffectBadge::Counter {
                    value: current,
                    min,
                    max,
                    labels,
                }),
            ) => {
                let min = min.unwrap_or(1);
                let max = max
                    .or_else(|| labels.as_ref().map(|l| l.len() as i64))
                    .unwrap_or(i64::MAX)
                    .max(min);
                *current = Self::combine(alteration.mode, *current, value).clamp(min, max);
            }
            (AlterationProperty::BadgeValue, Some(EffectBadge::Value { value: current })) => {
                *current = Self::combine(alteration.mode, *current, value);
            }
            (AlterationProperty::BadgeValue, Some(EffectBadge::Formula { .. }) | None) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::ItemKind;
    use serde_json::json;

    fn counter(value: i64, max: Option<i64>) -> ItemSource {
        ItemSource::new("Frightened", ItemKind::Condition).with_badge(EffectBadge::Counter {
            value,
            min: None,
            max,
            labels: None,
        })
    }

    fn badge_value(source: &ItemSource) -> Option<i64> {
        source.system.badge.as_ref().and_then(EffectBadge::as_int)
    }

    #[test]
    fn test_alteration_from_json() {
        let alteration: ItemAlteration = serde_json::from_value(json!({
            "mode": "upgrade",
            "property": "badge-value",
            "value": 2
        }))
        .unwrap();
        assert_eq!(alteration.mode, AlterationMode::Upgrade);
        assert_eq!(alteration.property, AlterationProperty::BadgeValue);
        assert_eq!(alteration.value.as_deref(), Some("2"));

        let absent: ItemAlteration = serde_json::from_value(json!({
            "mode": "add",
            "property": "badge-value"
        }))
        .unwrap();
        assert_eq!(absent.value, None);
    }

    #[test]
    fn test_alteration_schema_rejects_unknown_members() {
        assert!(serde_json::from_value::<ItemAlteration>(json!({
            "mode": "multiply", "property": "badge-value", "value": "2"
        }))
        .is_err());
        assert!(serde_json::from_value::<ItemAlteration>(json!({
            "mode": "add", "property": "name", "value": "2"
        }))
        .is_err());
        assert!(serde_json::from_value::<ItemAlteration>(json!({
            "mode": "add", "property": "badge-value", "value": [1]
        }))
        .is_err());
    }

    #[test]
    fn test_modes() {
        let cases = [
            (AlterationMode::Add, 2, 3, 5),
            (AlterationMode::Override, 2, 1, 1),
            (AlterationMode::Upgrade, 2, 1, 2),
            (AlterationMode::Upgrade, 2, 4, 4),
        ];

        for (mode, start, value, expected) in cases {
            let mut source = counter(start, None);
            let alteration = ItemAlteration::badge_value(mode, value.to_string());
            let value = ResolvedValue::Int(value);

            assert!(BadgeAlterations.can_alter(&alteration, &source, &value));
            BadgeAlterations.apply(&alteration, &mut source, &value);
            assert_eq!(badge_value(&source), Some(expected), "{mode:?}");
        }
    }

    #[test]
    fn test_counter_is_clamped() {
        let mut source = counter(3, Some(4));
        let add = ItemAlteration::badge_value(AlterationMode::Add, "5");
        BadgeAlterations.apply(&add, &mut source, &ResolvedValue::Int(5));
        assert_eq!(badge_value(&source), Some(4));

        let lower = ItemAlteration::badge_value(AlterationMode::Override, "-2");
        BadgeAlterations.apply(&lower, &mut source, &ResolvedValue::Int(-2));
        assert_eq!(badge_value(&source), Some(1));
    }

    #[test]
    fn test_counter_labels_bound_max() {
        let mut source = ItemSource::new("Drained", ItemKind::Condition).with_badge(
            EffectBadge::Counter {
                value: 1,
                min: None,
                max: None,
                labels: Some(vec!["I".into(), "II".into(), "III".into()]),
            },
        );
        let alteration = ItemAlteration::badge_value(AlterationMode::Add, "10");
        BadgeAlterations.apply(&alteration, &mut source, &ResolvedValue::Int(10));
        assert_eq!(badge_value(&source), Some(3));
    }

    #[test]
    fn test_value_badge_is_not_clamped() {
        let mut source = ItemSource::new("Effect: Aid", ItemKind::Effect)
            .with_badge(EffectBadge::Value { value: 1 });
        let alteration = ItemAlteration::badge_value(AlterationMode::Add, "-3");
        BadgeAlterations.apply(&alteration, &mut source, &ResolvedValue::Int(-3));
        assert_eq!(badge_value(&source), Some(-2));
    }

    #[test]
    fn test_veto_cases() {
        let alteration = ItemAlteration::badge_value(AlterationMode::Add, "1");

        let no_badge = ItemSource::new("Prone", ItemKind::Condition);
        assert!(!BadgeAlterations.can_alter(&alteration, &no_badge, &ResolvedValue::Int(1)));

        let formula = ItemSource::new("Effect: Bane", ItemKind::Effect).with_badge(
            EffectBadge::Formula {
                value: "1d4".to_string(),
            },
        );
        assert!(!BadgeAlterations.can_alter(&alteration, &formula, &ResolvedValue::Int(1)));

        let source = counter(1, None);
        assert!(!BadgeAlterations.can_alter(&alteration, &source, &ResolvedValue::Null));
        assert!(!BadgeAlterations.can_alter(
            &alteration,
            &source,
            &ResolvedValue::Text("two".to_string())
        ));
    }
}
