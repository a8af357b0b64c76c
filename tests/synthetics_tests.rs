//! Synthetics table integration tests.
//!
//! Several rule elements prepared together: ordering, rebuild semantics and
//! extraction across selectors.

use std::sync::Arc;

use futures::executor::block_on;
use serde_json::{json, Value};

use ephemeral_effects::core::{Actor, ActorContext, DiagnosticLog};
use ephemeral_effects::items::{ConditionManager, ItemKind, ItemSource, ItemStore, ItemUuid};
use ephemeral_effects::rules::{EphemeralEffectRuleElement, RuleElement, RuleParent, RuleServices};
use ephemeral_effects::synthetics::{
    prepare_synthetics, rebuild_synthetics, Affects, InvocationParams,
};

fn services() -> RuleServices {
    let mut store = ItemStore::new();
    for (id, name) in [("aid", "Effect: Aid"), ("bless", "Effect: Bless"), ("heroism", "Effect: Heroism")] {
        store.insert(
            ItemUuid::parse(&format!("Item.{id}")).unwrap(),
            ItemSource::new(name, ItemKind::Effect),
        );
    }
    RuleServices::new(
        Arc::new(ConditionManager::new()),
        Arc::new(store),
        Arc::new(DiagnosticLog::new()),
    )
}

fn rule(parent: &str, config: Value) -> EphemeralEffectRuleElement {
    let actor: Arc<dyn ActorContext> = Arc::new(Actor::new("Kyra"));
    EphemeralEffectRuleElement::new(config, RuleParent::new(parent), actor, services()).unwrap()
}

fn names(effects: &[ItemSource]) -> Vec<&str> {
    effects.iter().map(|e| e.name.as_str()).collect()
}

#[test]
fn test_extraction_follows_priority_then_selector_order() {
    let aid = rule("Aid", json!({
        "selectors": ["attack"],
        "uuid": "Item.aid",
        "adjustName": false,
        "priority": 150
    }));
    let bless = rule("Bless", json!({
        "selectors": ["attack", "damage"],
        "uuid": "Item.bless",
        "adjustName": false,
        "priority": 50
    }));
    let heroism = rule("Heroism", json!({
        "selectors": ["damage"],
        "uuid": "Item.heroism",
        "adjustName": false
    }));

    let rules: Vec<&dyn RuleElement> = vec![&aid, &bless, &heroism];
    let table = prepare_synthetics(rules);

    let attack = block_on(table.extract_ephemeral_effects(
        ["attack"],
        Affects::Target,
        &InvocationParams::new(),
    ));
    assert_eq!(names(&attack), vec!["Effect: Bless", "Effect: Aid"]);

    let both = block_on(table.extract_ephemeral_effects(
        ["damage", "attack"],
        Affects::Target,
        &InvocationParams::new(),
    ));
    assert_eq!(
        names(&both),
        vec!["Effect: Bless", "Effect: Heroism", "Effect: Bless", "Effect: Aid"]
    );
}

#[test]
fn test_extraction_skips_empty_results() {
    let gated = rule("Aid", json!({
        "selectors": ["attack"],
        "uuid": "Item.aid",
        "predicate": ["self:aided"]
    }));
    let open = rule("Bless", json!({ "selectors": ["attack"], "uuid": "Item.bless" }));

    let rules: Vec<&dyn RuleElement> = vec![&gated, &open];
    let table = prepare_synthetics(rules);

    let effects = block_on(table.extract_ephemeral_effects(
        ["attack", "unknown"],
        Affects::Target,
        &InvocationParams::new(),
    ));
    assert_eq!(names(&effects), vec!["Effect: Bless (Bless)"]);
}

#[test]
fn test_rebuild_discards_stale_producers() {
    let aid = rule("Aid", json!({ "selectors": ["attack"], "uuid": "Item.aid" }));
    let bless = rule("Bless", json!({ "affects": "origin", "selectors": ["damage"], "uuid": "Item.bless" }));

    let mut table = prepare_synthetics([&aid as &dyn RuleElement, &bless as &dyn RuleElement]);
    let stale = table.ephemeral_effects("attack", Affects::Target)[0].clone();
    assert_eq!(table.len(), 2);

    rebuild_synthetics(&mut table, [&aid as &dyn RuleElement]);

    assert_eq!(table.len(), 1);
    assert!(table.bucket("damage").is_none());
    let fresh = &table.ephemeral_effects("attack", Affects::Target)[0];
    assert_eq!(table.ephemeral_effects("attack", Affects::Target).len(), 1);
    assert!(!fresh.ptr_eq(&stale));
}

#[test]
fn test_preparation_is_idempotent() {
    let aid = rule("Aid", json!({ "selectors": ["attack", "damage"], "uuid": "Item.aid" }));

    let first = prepare_synthetics([&aid as &dyn RuleElement]);
    let second = prepare_synthetics([&aid as &dyn RuleElement]);

    let mut first_selectors: Vec<&str> = first.selectors().collect();
    let mut second_selectors: Vec<&str> = second.selectors().collect();
    first_selectors.sort_unstable();
    second_selectors.sort_unstable();
    assert_eq!(first_selectors, second_selectors);

    for selector in ["attack", "damage"] {
        let a = first.ephemeral_effects(selector, Affects::Target);
        let b = second.ephemeral_effects(selector, Affects::Target);
        assert_eq!(a.len(), b.len());
        assert!(!a[0].ptr_eq(&b[0]));
    }
}
