//! Item lookup.
//!
//! Two lookups with different costs:
//! - [`ConditionLookup`]: synchronous, in-memory, well-known conditions
//! - [`ItemResolver`]: asynchronous, any stored item
//!
//! Both hand out shared `Arc<ItemSource>`s. Callers that want to modify an
//! item must clone the source first; the stored definition is never mutated.

use std::sync::Arc;

use async_trait::async_trait;
use rustc_hash::FxHashMap;

use super::source::{ItemKind, ItemSource};
use super::uuid::ItemUuid;

/// Fast-path lookup of well-known conditions.
pub trait ConditionLookup: Send + Sync {
    /// Get a condition by reference, if registered.
    fn condition(&self, uuid: &ItemUuid) -> Option<Arc<ItemSource>>;
}

/// Generic asynchronous item resolution.
#[async_trait]
pub trait ItemResolver: Send + Sync {
    /// Resolve an item by reference.
    async fn resolve(&self, uuid: &ItemUuid) -> Option<Arc<ItemSource>>;
}

/// Registry of condition definitions.
///
/// ## Example
///
/// ```
/// use ephemeral_effects::items::{ConditionLookup, ConditionManager, ItemKind, ItemSource, ItemUuid};
///
/// let mut conditions = ConditionManager::new();
/// let uuid = ItemUuid::parse("Compendium.pf2e.conditionitems.Item.AJh5ex99aV6VTggg").unwrap();
/// conditions.register(uuid.clone(), ItemSource::new("Flat-Footed", ItemKind::Condition));
///
/// let found = conditions.condition(&uuid).unwrap();
/// assert_eq!(found.name, "Flat-Footed");
/// ```
#[derive(Clone, Debug, Default)]
pub struct ConditionManager {
    conditions: FxHashMap<ItemUuid, Arc<ItemSource>>,
    by_slug: FxHashMap<String, ItemUuid>,
}

impl ConditionManager {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a condition definition.
    ///
    /// Panics if a condition with the same reference already exists or the
    /// source is not a condition.
    pub fn register(&mut self, uuid: ItemUuid, source: ItemSource) {
        assert!(
            source.kind == ItemKind::Condition,
            "{} is a {}, not a condition",
            source.name,
            source.kind
        );
        if self.conditions.contains_key(&uuid) {
            panic!("Condition {} already registered", uuid);
        }
        if let Some(slug) = &source.system.slug {
            self.by_slug.insert(slug.clone(), uuid.clone());
        }
        self.conditions.insert(uuid, Arc::new(source));
    }

    /// Get a condition by slug (`frightened`, `flat-footed`, ...).
    #[must_use]
    pub fn get_by_slug(&self, slug: &str) -> Option<Arc<ItemSource>> {
        self.by_slug
            .get(slug)
            .and_then(|uuid| self.conditions.get(uuid))
            .cloned()
    }

    /// Check if a reference is registered.
    #[must_use]
    pub fn contains(&self, uuid: &ItemUuid) -> bool {
        self.conditions.contains_key(uuid)
    }

    /// Get the number of registered conditions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Iterate over all condition definitions.
    pub fn iter(&self) -> impl Iterator<Item = (&ItemUuid, &Arc<ItemSource>)> {
        self.conditions.iter()
    }
}

impl ConditionLookup for ConditionManager {
    fn condition(&self, uuid: &ItemUuid) -> Option<Arc<ItemSource>> {
        self.conditions.get(uuid).cloned()
    }
}

/// In-memory store of arbitrary items, resolved asynchronously.
#[derive(Clone, Debug, Default)]
pub struct ItemStore {
    items: FxHashMap<ItemUuid, Arc<ItemSource>>,
}

impl ItemStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an item. Returns the previous definition, if any.
    pub fn insert(&mut self, uuid: ItemUuid, source: ItemSource) -> Option<Arc<ItemSource>> {
        self.items.insert(uuid, Arc::new(source))
    }

    /// Add an item (builder pattern).
    #[must_use]
    pub fn with_item(mut self, uuid: ItemUuid, source: ItemSource) -> Self {
        self.insert(uuid, source);
        self
    }

    /// Synchronous access to a stored item.
    #[must_use]
    pub fn get(&self, uuid: &ItemUuid) -> Option<&Arc<ItemSource>> {
        self.items.get(uuid)
    }

    /// Get the number of stored items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Find items of a kind.
    pub fn find_by_kind(&self, kind: ItemKind) -> impl Iterator<Item = &Arc<ItemSource>> {
        self.items.values().filter(move |item| item.kind == kind)
    }
}

#[async_trait]
impl ItemResolver for ItemStore {
    async fn resolve(&self, uuid: &ItemUuid) -> Option<Arc<ItemSource>> {
        self.items.get(uuid).cloned()
    }
}
