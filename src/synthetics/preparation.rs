//! Data-preparation pass.
//!
//! Runs every rule element's `before_prepare_data` hook in priority order
//! against a freshly cleared table.

use crate::rules::RuleElement;

use super::table::SyntheticsTable;

/// Build a new table from `rules`.
pub fn prepare_synthetics<'r, I>(rules: I) -> SyntheticsTable
where
    I: IntoIterator<Item = &'r dyn RuleElement>,
{
    let mut table = SyntheticsTable::new();
    rebuild_synthetics(&mut table, rules);
    table
}

/// Clear `table` and repopulate it from `rules`.
///
/// Rules run in ascending priority; ties keep their given order.
pub fn rebuild_synthetics<'r, I>(table: &mut SyntheticsTable, rules: I)
where
    I: IntoIterator<Item = &'r dyn RuleElement>,
{
    let mut rules: Vec<&dyn RuleElement> = rules.into_iter().collect();
    rules.sort_by_key(|rule| rule.priority());

    table.clear();
    for rule in &rules {
        rule.before_prepare_data(table);
    }

    tracing::debug!(
        rules = rules.len(),
        selectors = table.len(),
        "Prepared synthetics"
    );
}
