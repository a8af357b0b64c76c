//! `EphemeralEffect` configuration schema.
//!
//! Raw author configuration is deserialised into [`EphemeralEffectSource`]
//! and then validated into a [`RuleElementConfig`]. Validation is purely
//! structural and synchronous; a failure makes the whole configuration
//! block unusable.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::rules::alteration::ItemAlteration;
use crate::rules::predicate::Predicate;
use crate::rules::DEFAULT_PRIORITY;
use crate::synthetics::Affects;

/// Rule element key.
pub const KEY: &str = "EphemeralEffect";

/// Construction-time configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid EphemeralEffect configuration: {0}")]
    Schema(#[from] serde_json::Error),

    #[error("expected key \"EphemeralEffect\", found \"{0}\"")]
    WrongKey(String),

    #[error("must have at least one selector")]
    NoSelectors,

    #[error("selector {index} is blank")]
    BlankSelector { index: usize },

    #[error("uuid must be a non-blank string")]
    BlankUuid,
}

/// Configuration as written by content authors.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EphemeralEffectSource {
    #[serde(default)]
    pub key: Option<String>,

    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub slug: Option<String>,

    #[serde(default)]
    pub predicate: Predicate,

    #[serde(default)]
    pub priority: Option<i32>,

    #[serde(default)]
    pub ignored: bool,

    #[serde(default)]
    pub affects: Affects,

    /// A single string is accepted as a one-element list.
    #[serde(default, deserialize_with = "one_or_many")]
    pub selectors: Vec<String>,

    #[serde(default)]
    pub uuid: Option<String>,

    #[serde(default = "default_true")]
    pub adjust_name: bool,

    #[serde(default)]
    pub alterations: Vec<ItemAlteration>,
}

fn default_true() -> bool {
    true
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(selector)) => vec![selector],
        Some(OneOrMany::Many(selectors)) => selectors,
    })
}

/// Validated `EphemeralEffect` configuration.
///
/// `selectors` is never empty and `identifier` is never blank.
/// Serialises back to the author-facing shape (`uuid`, `adjustName`, ...).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleElementConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,

    #[serde(skip_serializing_if = "Predicate::is_empty")]
    pub predicate: Predicate,

    pub priority: i32,

    pub ignored: bool,

    pub affects: Affects,

    pub selectors: Vec<String>,

    /// Item reference, possibly containing placeholders.
    #[serde(rename = "uuid")]
    pub identifier: String,

    pub adjust_name: bool,

    pub alterations: Vec<ItemAlteration>,
}

impl RuleElementConfig {
    /// Parse and validate raw configuration.
    ///
    /// ```
    /// use ephemeral_effects::rules::{ConfigError, RuleElementConfig};
    /// use serde_json::json;
    ///
    /// let config = RuleElementConfig::from_value(json!({
    ///     "key": "EphemeralEffect",
    ///     "selectors": ["strike-attack"],
    ///     "uuid": "Compendium.pf2e.conditionitems.Item.AJh5ex99aV6VTggg"
    /// }))
    /// .unwrap();
    /// assert!(config.adjust_name);
    ///
    /// let err = RuleElementConfig::from_value(json!({ "selectors": [], "uuid": "Item.x" })).unwrap_err();
    /// assert!(matches!(err, ConfigError::NoSelectors));
    /// ```
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        let source: EphemeralEffectSource = serde_json::from_value(value)?;
        Self::try_from(source)
    }

    /// Configuration data for `{rule|path}` placeholders.
    #[must_use]
    pub fn injection_data(&self) -> Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

impl TryFrom<EphemeralEffectSource> for RuleElementConfig {
    type Error = ConfigError;

    fn try_from(source: EphemeralEffectSource) -> Result<Self, Self::Error> {
        if let Some(key) = source.key {
            if key != KEY {
                return Err(ConfigError::WrongKey(key));
            }
        }

        if source.selectors.is_empty() {
            return Err(ConfigError::NoSelectors);
        }
        if let Some(index) = source.selectors.iter().position(|s| s.trim().is_empty()) {
            return Err(ConfigError::BlankSelector { index });
        }

        let identifier = source
            .uuid
            .filter(|uuid| !uuid.trim().is_empty())
            .ok_or(ConfigError::BlankUuid)?;

        Ok(Self {
            label: source.label,
            slug: source.slug,
            predicate: source.predicate,
            priority: source.priority.unwrap_or(DEFAULT_PRIORITY),
            ignored: source.ignored,
            affects: source.affects,
            selectors: source.selectors,
            identifier,
            adjust_name: source.adjust_name,
            alterations: source.alterations,
        })
    }
}
