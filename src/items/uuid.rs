//! Item references.
//!
//! An item reference locates a stored item definition. Only three shapes
//! are accepted:
//!
//! - `Item.<id>`: a world-level item
//! - `Actor.<id>.Item.<id>`: an item embedded on an actor
//! - `Compendium.<scope>.<pack>.Item.<id>`: an item in a compendium pack

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a string is not a well-formed item reference.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum UuidError {
    #[error("item UUID is empty")]
    Empty,

    #[error("\"{0}\" does not reference an item document")]
    NotAnItem(String),

    #[error("\"{uuid}\" has an invalid segment \"{segment}\"")]
    InvalidSegment { uuid: String, segment: String },
}

/// Where the referenced item is stored.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UuidScope {
    /// World-level item.
    World,
    /// Item embedded on an actor.
    Actor { actor_id: String },
    /// Item in a compendium pack.
    Compendium { scope: String, pack: String },
}

/// A parsed, well-formed item reference.
///
/// ```
/// use ephemeral_effects::items::{ItemUuid, UuidScope};
///
/// let uuid = ItemUuid::parse("Compendium.pf2e.conditionitems.Item.AJh5ex99aV6VTggg").unwrap();
/// assert_eq!(uuid.id(), "AJh5ex99aV6VTggg");
/// assert!(matches!(uuid.scope(), UuidScope::Compendium { .. }));
///
/// assert!(ItemUuid::parse("Actor.abc123").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemUuid {
    raw: String,
    scope: UuidScope,
    id: String,
}

impl ItemUuid {
    /// Parse and shape-check an item reference.
    pub fn parse(raw: &str) -> Result<Self, UuidError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(UuidError::Empty);
        }

        let parts: Vec<&str> = raw.split('.').collect();
        let (scope, id) = match parts.as_slice() {
            ["Item", id] => (UuidScope::World, *id),
            ["Actor", actor_id, "Item", id] => {
                check_id(raw, actor_id)?;
                (
                    UuidScope::Actor {
                        actor_id: (*actor_id).to_string(),
                    },
                    *id,
                )
            }
            ["Compendium", scope, pack, "Item", id] => {
                check_name(raw, scope)?;
                check_name(raw, pack)?;
                (
                    UuidScope::Compendium {
                        scope: (*scope).to_string(),
                        pack: (*pack).to_string(),
                    },
                    *id,
                )
            }
            _ => return Err(UuidError::NotAnItem(raw.to_string())),
        };
        check_id(raw, id)?;

        Ok(Self {
            raw: raw.to_string(),
            scope,
            id: id.to_string(),
        })
    }

    /// The full reference string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Where the item is stored.
    #[must_use]
    pub fn scope(&self) -> &UuidScope {
        &self.scope
    }

    /// The item's document id (last segment).
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

fn check_id(uuid: &str, segment: &str) -> Result<(), UuidError> {
    if !segment.is_empty() && segment.chars().all(|c| c.is_ascii_alphanumeric()) {
        Ok(())
    } else {
        Err(invalid_segment(uuid, segment))
    }
}

fn check_name(uuid: &str, segment: &str) -> Result<(), UuidError> {
    let valid = !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(invalid_segment(uuid, segment))
    }
}

fn invalid_segment(uuid: &str, segment: &str) -> UuidError {
    UuidError::InvalidSegment {
        uuid: uuid.to_string(),
        segment: segment.to_string(),
    }
}

impl std::str::FromStr for ItemUuid {
    type Err = UuidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ItemUuid {
    type Error = UuidError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ItemUuid> for String {
    fn from(uuid: ItemUuid) -> Self {
        uuid.raw
    }
}

impl std::fmt::Display for ItemUuid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}
