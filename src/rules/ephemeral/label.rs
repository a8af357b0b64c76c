//! Name adjustment for produced effects.
//!
//! Attack labels look like `"Strike: Dagger (melee)"`. The trailing
//! parenthetical only repeats what the attack already says, so it is dropped
//! before the label is appended to the effect name:
//!
//! - `"Strike: Dagger (melee)"` → `"Strike: Dagger"`
//! - `"Flanked"` → `"Flanked"` (no colon: used verbatim)
//!
//! Only the final parenthetical group is considered; earlier groups and
//! additional colons are kept as written.

/// Derive the label appended to a produced effect's name.
#[must_use]
pub fn derive_label(label: &str) -> &str {
    if !label.contains(':') {
        return label;
    }
    strip_trailing_parenthetical(label.trim()).trim()
}

/// Append the derived label to `name`: `"<name> (<label>)"`.
#[must_use]
pub fn adjust_name(name: &str, label: &str) -> String {
    format!("{name} ({})", derive_label(label))
}

/// Remove a single `(...)` group that ends the string. The group must be
/// non-empty and must not contain `)`.
fn strip_trailing_parenthetical(label: &str) -> &str {
    let Some(inner_end) = label.strip_suffix(')') else {
        return label;
    };
    let Some(open) = inner_end.rfind('(') else {
        return label;
    };

    let inner = &inner_end[open + 1..];
    if inner.is_empty() || inner.contains(')') {
        return label;
    }
    &label[..open]
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_strike_label() {
        assert_eq!(derive_label("Strike: Dagger (melee)"), "Strike: Dagger");
        assert_eq!(
            adjust_name("Effect: Off-Guard", "Strike: Dagger (melee)"),
            "Effect: Off-Guard (Strike: Dagger)"
        );
    }

    #[test]
    fn test_label_without_colon_is_verbatim() {
        assert_eq!(derive_label("Flanked"), "Flanked");
        assert_eq!(derive_label("Sneak Attack (precision)"), "Sneak Attack (precision)");
        assert_eq!(adjust_name("Off-Guard", "Flanked"), "Off-Guard (Flanked)");
    }

    #[test]
    fn test_colon_without_parenthetical() {
        assert_eq!(derive_label("Spell Attack: Fireball "), "Spell Attack: Fireball");
    }

    #[test]
    fn test_only_final_parenthetical_is_removed() {
        assert_eq!(
            derive_label("Strike: Bow (Longbow) (ranged)"),
            "Strike: Bow (Longbow)"
        );
        assert_eq!(derive_label("A: B: C (d)"), "A: B: C");
    }

    #[test]
    fn test_malformed_parenthetical_is_kept() {
        assert_eq!(derive_label("Strike: Fist ()"), "Strike: Fist ()");
        assert_eq!(derive_label("Strike: Fist (a (b))"), "Strike: Fist (a (b))");
        assert_eq!(derive_label("Strike: Fist (agile) extra"), "Strike: Fist (agile) extra");
    }

    proptest! {
        #[test]
        fn prop_no_colon_is_identity(label in "[^:]{0,32}") {
            prop_assert_eq!(derive_label(&label), label.as_str());
        }

        #[test]
        fn prop_strike_shape(head in "[A-Za-z]{1,8}", body in "[A-Za-z ]{0,12}[A-Za-z]", tag in "[a-z]{1,8}") {
            let label = format!("{head}: {body} ({tag})");
            let expected = format!("{head}: {body}");
            prop_assert_eq!(derive_label(&label), expected.as_str());
        }
    }
}
