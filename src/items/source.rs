//! Item source data.
//!
//! `ItemSource` is the persisted data of an item definition (an effect, a
//! condition, a feat, ...). Ephemeral effects are produced by cloning the
//! source of a stored effect or condition and adjusting the copy.
//!
//! Only the fields the rule pipeline reads are typed. Everything else in
//! `system` is preserved verbatim through `extra`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Item kind tag.
///
/// Closed set: anything unrecognised deserialises as `Unknown`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Condition,
    Effect,
    Action,
    Feat,
    Weapon,
    Armor,
    Equipment,
    Spell,
    Consumable,
    #[serde(other)]
    Unknown,
}

impl ItemKind {
    /// Can an item of this kind be attached as an ephemeral effect?
    #[must_use]
    pub const fn is_effect_like(self) -> bool {
        matches!(self, Self::Condition | Self::Effect)
    }
}

impl std::fmt::Display for ItemKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Condition => "condition",
            Self::Effect => "effect",
            Self::Action => "action",
            Self::Feat => "feat",
            Self::Weapon => "weapon",
            Self::Armor => "armor",
            Self::Equipment => "equipment",
            Self::Spell => "spell",
            Self::Consumable => "consumable",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// A nested rule element entry on an item.
///
/// Kept untyped: only `key` matters to this crate, the rest is carried
/// through unchanged.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSource {
    /// Rule element key (`FlatModifier`, `ChoiceSet`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(flatten)]
    pub data: Map<String, Value>,
}

impl RuleSource {
    /// Create a rule entry with the given key and no other data.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            data: Map::new(),
        }
    }

    /// Add a field (builder pattern).
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data.insert(field.into(), value.into());
        self
    }
}

/// Badge shown on an effect or condition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EffectBadge {
    /// Integer counter, optionally bounded or labelled per value.
    Counter {
        value: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        labels: Option<Vec<String>>,
    },
    /// Plain integer value.
    Value { value: i64 },
    /// Unevaluated roll formula.
    Formula { value: String },
}

impl EffectBadge {
    /// Create an unbounded counter badge.
    #[must_use]
    pub fn counter(value: i64) -> Self {
        Self::Counter {
            value,
            min: None,
            max: None,
            labels: None,
        }
    }

    /// Integer value of a counter or value badge.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Counter { value, .. } | Self::Value { value } => Some(*value),
            Self::Formula { .. } => None,
        }
    }
}

/// System data of an item.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemSystem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    /// Nested rule elements.
    #[serde(default)]
    pub rules: Vec<RuleSource>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<EffectBadge>,

    /// Everything else, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Persisted item data.
///
/// ## Example
///
/// ```
/// use ephemeral_effects::items::{EffectBadge, ItemKind, ItemSource};
///
/// let frightened = ItemSource::new("Frightened", ItemKind::Condition)
///     .with_slug("frightened")
///     .with_badge(EffectBadge::counter(1));
///
/// assert!(frightened.kind.is_effect_like());
/// assert_eq!(frightened.system.badge.as_ref().and_then(EffectBadge::as_int), Some(1));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemSource {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub name: String,

    #[serde(rename = "type")]
    pub kind: ItemKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,

    #[serde(default)]
    pub system: ItemSystem,
}

impl ItemSource {
    /// Create an item with empty system data.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ItemKind) -> Self {
        Self {
            id: None,
            name: name.into(),
            kind,
            img: None,
            system: ItemSystem::default(),
        }
    }

    /// Set the document id (builder pattern).
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set the slug (builder pattern).
    #[must_use]
    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.system.slug = Some(slug.into());
        self
    }

    /// Set the badge (builder pattern).
    #[must_use]
    pub fn with_badge(mut self, badge: EffectBadge) -> Self {
        self.system.badge = Some(badge);
        self
    }

    /// Append a nested rule (builder pattern).
    #[must_use]
    pub fn with_rule(mut self, rule: RuleSource) -> Self {
        self.system.rules.push(rule);
        self
    }

    /// Keys of all nested rules, in order. Rules without a key are skipped.
    pub fn rule_keys(&self) -> impl Iterator<Item = &str> {
        self.system.rules.iter().filter_map(|r| r.key.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_from_json() {
        let kind: ItemKind = serde_json::from_value(json!("effect")).unwrap();
        assert_eq!(kind, ItemKind::Effect);

        let kind: ItemKind = serde_json::from_value(json!("kit")).unwrap();
        assert_eq!(kind, ItemKind::Unknown);
    }

    #[test]
    fn test_effect_like() {
        assert!(ItemKind::Condition.is_effect_like());
        assert!(ItemKind::Effect.is_effect_like());
        assert!(!ItemKind::Weapon.is_effect_like());
        assert!(!ItemKind::Unknown.is_effect_like());
    }

    #[test]
    fn test_source_from_json_keeps_extra_data() {
        let source: ItemSource = serde_json::from_value(json!({
            "_id": "abc",
            "name": "Effect: Rage",
            "type": "effect",
            "system": {
                "slug": "effect-rage",
                "duration": { "value": 1, "unit": "minutes" },
                "rules": [
                    { "key": "FlatModifier", "selector": "damage", "value": 2 },
                    { "selector": "ac" }
                ],
                "badge": { "type": "counter", "value": 2, "max": 4 }
            }
        }))
        .unwrap();

        assert_eq!(source.id.as_deref(), Some("abc"));
        assert_eq!(source.system.slug.as_deref(), Some("effect-rage"));
        assert_eq!(source.system.extra["duration"]["unit"], "minutes");
        assert_eq!(source.rule_keys().collect::<Vec<_>>(), vec!["FlatModifier"]);
        assert_eq!(
            source.system.badge,
            Some(EffectBadge::Counter {
                value: 2,
                min: None,
                max: Some(4),
                labels: None
            })
        );

        let json = serde_json::to_value(&source).unwrap();
        assert_eq!(json["system"]["rules"][0]["selector"], "damage");
        assert_eq!(json["system"]["duration"]["value"], 1);
    }

    #[test]
    fn test_badge_as_int() {
        assert_eq!(EffectBadge::counter(3).as_int(), Some(3));
        assert_eq!(EffectBadge::Value { value: -1 }.as_int(), Some(-1));
        assert_eq!(
            EffectBadge::Formula {
                value: "1d6".to_string()
            }
            .as_int(),
            None
        );
    }
}
