//! Placeholder injection.
//!
//! Configuration strings may contain `{scope|path}` placeholders that are
//! resolved against live data at preparation or invocation time:
//!
//! - `{actor|system.details.level}`: owning actor data
//! - `{item|name}`: parent item data
//! - `{rule|selectors.0}`: the rule element's own configuration
//! - `{<name>|path}`: a caller-supplied resolvable (alteration values only)
//!
//! Placeholders with an unknown scope are left in place. A known scope whose
//! path does not resolve is an error.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Named values supplied by the caller of a producer.
///
/// Persistent map: cloning per invocation is O(1).
pub type Resolvables = im::HashMap<String, Value>;

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Za-z][\w-]*)\|([^{}|]+)\}").expect("placeholder pattern is valid")
});

/// Placeholder resolution failure.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InjectionError {
    #[error("failed to resolve {placeholder}")]
    Unresolved { placeholder: String },

    #[error("{placeholder} resolved to null")]
    Null { placeholder: String },
}

/// Data sources for placeholder resolution.
#[derive(Clone, Copy, Debug)]
pub struct InjectionContext<'a> {
    /// Owning actor data.
    pub actor: &'a Value,
    /// Parent item data.
    pub item: &'a Value,
    /// Rule element configuration.
    pub rule: &'a Value,
    /// Caller-supplied resolvables.
    pub resolvables: Option<&'a Resolvables>,
}

impl<'a> InjectionContext<'a> {
    /// Create a context without resolvables.
    pub fn new(actor: &'a Value, item: &'a Value, rule: &'a Value) -> Self {
        Self {
            actor,
            item,
            rule,
            resolvables: None,
        }
    }

    /// Add caller-supplied resolvables.
    #[must_use]
    pub fn with_resolvables(mut self, resolvables: &'a Resolvables) -> Self {
        self.resolvables = Some(resolvables);
        self
    }

    /// Root value for a scope name, if the scope is known.
    #[must_use]
    pub fn scope(&self, name: &str) -> Option<&'a Value> {
        match name {
            "actor" => Some(self.actor),
            "item" => Some(self.item),
            "rule" => Some(self.rule),
            other => self.resolvables.and_then(|r| r.get(other)),
        }
    }
}

/// Resolves placeholders in template strings.
pub trait PropertyInjector: Send + Sync {
    /// Substitute every resolvable placeholder in `template`.
    fn inject(&self, template: &str, ctx: &InjectionContext<'_>) -> Result<String, InjectionError>;
}

/// Default `{scope|dotted.path}` injector.
///
/// ```
/// use ephemeral_effects::rules::{InjectionContext, PlaceholderInjector, PropertyInjector};
/// use serde_json::json;
///
/// let actor = json!({ "system": { "details": { "level": 7 } } });
/// let item = json!({ "name": "Dagger" });
/// let rule = json!({});
/// let ctx = InjectionContext::new(&actor, &item, &rule);
///
/// let resolved = PlaceholderInjector.inject("level-{actor|system.details.level}-{item|name}", &ctx).unwrap();
/// assert_eq!(resolved, "level-7-Dagger");
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct PlaceholderInjector;

impl PropertyInjector for PlaceholderInjector {
    fn inject(&self, template: &str, ctx: &InjectionContext<'_>) -> Result<String, InjectionError> {
        let mut resolved = String::with_capacity(template.len());
        let mut last = 0;

        for caps in PLACEHOLDER.captures_iter(template) {
            let (Some(whole), Some(scope), Some(path)) = (caps.get(0), caps.get(1), caps.get(2))
            else {
                continue;
            };

            let Some(root) = ctx.scope(scope.as_str()) else {
                // Unknown scope: keep the placeholder for a later pass.
                continue;
            };

            let placeholder = whole.as_str();
            let value = lookup_path(root, path.as_str()).ok_or_else(|| InjectionError::Unresolved {
                placeholder: placeholder.to_string(),
            })?;
            let text = value_to_string(value).ok_or_else(|| InjectionError::Null {
                placeholder: placeholder.to_string(),
            })?;

            resolved.push_str(&template[last..whole.start()]);
            resolved.push_str(&text);
            last = whole.end();
        }

        resolved.push_str(&template[last..]);
        Ok(resolved)
    }
}

/// Walk a dotted path. Numeric segments index into arrays.
#[must_use]
pub fn lookup_path<'v>(root: &'v Value, path: &str) -> Option<&'v Value> {
    path.split('.').try_fold(root, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// A resolved alteration value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolvedValue {
    /// Absent or blank expression.
    Null,
    /// Integer literal.
    Int(i64),
    /// `true` / `false`.
    Bool(bool),
    /// Anything else.
    Text(String),
}

impl ResolvedValue {
    /// Interpret an already-injected expression.
    #[must_use]
    pub fn interpret(text: &str) -> Self {
        let text = text.trim();
        if text.is_empty() {
            return Self::Null;
        }
        if let Ok(n) = text.parse::<i64>() {
            return Self::Int(n);
        }
        match text {
            "true" => Self::Bool(true),
            "false" => Self::Bool(false),
            _ => Self::Text(text.to_string()),
        }
    }

    /// Get as integer if this is an Int value.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as bool if this is a Bool value.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Get as string reference if this is a Text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Resolve an alteration value expression.
pub fn resolve_value(
    expression: Option<&str>,
    injector: &dyn PropertyInjector,
    ctx: &InjectionContext<'_>,
) -> Result<ResolvedValue, InjectionError> {
    match expression {
        None => Ok(ResolvedValue::Null),
        Some(expression) => injector
            .inject(expression, ctx)
            .map(|text| ResolvedValue::interpret(&text)),
    }
}
