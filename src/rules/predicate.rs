//! Predicates over roll options.
//!
//! A predicate is a list of statements that must all hold. A statement is
//! either a roll option atom (true when the option is active) or a
//! combinator over nested statements.
//!
//! JSON shape, as written by content authors:
//!
//! ```json
//! ["self:effect:rage", { "not": "target:trait:undead" }, { "or": ["a", "b"] }]
//! ```

use serde::{Deserialize, Serialize};

use crate::core::RollOptions;

/// A single predicate statement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PredicateStatement {
    /// Roll option must be active.
    Atom(String),

    /// Statement must be false.
    Not { not: Box<PredicateStatement> },

    /// All statements must be true.
    And { and: Vec<PredicateStatement> },

    /// At least one statement must be true.
    Or { or: Vec<PredicateStatement> },

    /// No statement may be true.
    Nor { nor: Vec<PredicateStatement> },
}

impl PredicateStatement {
    /// Create an atom statement.
    pub fn atom(option: impl Into<String>) -> Self {
        Self::Atom(option.into())
    }

    /// Create an AND statement.
    pub fn all(statements: impl IntoIterator<Item = PredicateStatement>) -> Self {
        Self::And {
            and: statements.into_iter().collect(),
        }
    }

    /// Create an OR statement.
    pub fn any(statements: impl IntoIterator<Item = PredicateStatement>) -> Self {
        Self::Or {
            or: statements.into_iter().collect(),
        }
    }

    /// Create a NOR statement.
    pub fn none(statements: impl IntoIterator<Item = PredicateStatement>) -> Self {
        Self::Nor {
            nor: statements.into_iter().collect(),
        }
    }

    /// Negate this statement.
    pub fn negate(self) -> Self {
        Self::Not {
            not: Box::new(self),
        }
    }

    /// Check the statement against a set of roll options.
    #[must_use]
    pub fn test(&self, options: &RollOptions) -> bool {
        match self {
            Self::Atom(option) => options.contains(option.as_str()),
            Self::Not { not } => !not.test(options),
            Self::And { and } => and.iter().all(|s| s.test(options)),
            Self::Or { or } => or.iter().any(|s| s.test(options)),
            Self::Nor { nor } => !nor.iter().any(|s| s.test(options)),
        }
    }
}

impl From<&str> for PredicateStatement {
    fn from(option: &str) -> Self {
        Self::atom(option)
    }
}

/// A conjunction of statements. The empty predicate always passes.
///
/// ```
/// use ephemeral_effects::core::RollOptions;
/// use ephemeral_effects::rules::{Predicate, PredicateStatement};
///
/// let predicate = Predicate::new(["self:effect:rage".into(), PredicateStatement::atom("target:undead").negate()]);
///
/// let options: RollOptions = ["self:effect:rage".to_string()].into_iter().collect();
/// assert!(predicate.test(&options));
/// assert!(Predicate::default().test(&RollOptions::new()));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Predicate(pub Vec<PredicateStatement>);

impl Predicate {
    /// Create a predicate from statements.
    pub fn new(statements: impl IntoIterator<Item = PredicateStatement>) -> Self {
        Self(statements.into_iter().collect())
    }

    /// Check whether every statement holds.
    #[must_use]
    pub fn test(&self, options: &RollOptions) -> bool {
        self.0.iter().all(|s| s.test(options))
    }

    /// Check if the predicate has no statements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Add a statement (builder pattern).
    #[must_use]
    pub fn and(mut self, statement: PredicateStatement) -> Self {
        self.0.push(statement);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn options(list: &[&str]) -> RollOptions {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_atom() {
        let statement = PredicateStatement::atom("self:effect:rage");
        assert!(statement.test(&options(&["self:effect:rage"])));
        assert!(!statement.test(&options(&["self:effect:bless"])));
    }

    #[test]
    fn test_combinators() {
        let opts = options(&["a", "b"]);

        assert!(PredicateStatement::all(["a".into(), "b".into()]).test(&opts));
        assert!(!PredicateStatement::all(["a".into(), "c".into()]).test(&opts));

        assert!(PredicateStatement::any(["c".into(), "b".into()]).test(&opts));
        assert!(!PredicateStatement::any(["c".into(), "d".into()]).test(&opts));

        assert!(PredicateStatement::none(["c".into(), "d".into()]).test(&opts));
        assert!(!PredicateStatement::none(["c".into(), "a".into()]).test(&opts));

        assert!(PredicateStatement::atom("c").negate().test(&opts));
        assert!(!PredicateStatement::any(Vec::new()).test(&opts));
    }

    #[test]
    fn test_predicate_is_conjunction() {
        let predicate = Predicate::new(["a".into()]).and(PredicateStatement::atom("b"));
        assert!(predicate.test(&options(&["a", "b", "c"])));
        assert!(!predicate.test(&options(&["a"])));
    }

    #[test]
    fn test_predicate_from_json() {
        let predicate: Predicate = serde_json::from_value(json!([
            "self:effect:rage",
            { "not": "target:trait:undead" },
            { "or": ["item:melee", { "and": ["item:ranged", "item:thrown"] }] },
            { "nor": ["self:condition:fatigued"] }
        ]))
        .unwrap();

        assert_eq!(predicate.0.len(), 4);
        assert!(predicate.test(&options(&["self:effect:rage", "item:melee"])));
        assert!(predicate.test(&options(&[
            "self:effect:rage",
            "item:ranged",
            "item:thrown"
        ])));
        assert!(!predicate.test(&options(&[
            "self:effect:rage",
            "item:melee",
            "target:trait:undead"
        ])));
        assert!(!predicate.test(&options(&[
            "self:effect:rage",
            "item:melee",
            "self:condition:fatigued"
        ])));

        let json = serde_json::to_value(&predicate).unwrap();
        assert_eq!(json[1], json!({ "not": "target:trait:undead" }));
    }

    proptest! {
        #[test]
        fn prop_empty_predicate_always_passes(opts in proptest::collection::vec("[a-z:]{1,12}", 0..8)) {
            let options: RollOptions = opts.into_iter().collect();
            prop_assert!(Predicate::default().test(&options));
        }

        #[test]
        fn prop_double_negation(option in "[a-z:]{1,12}", active in any::<bool>()) {
            let opts = if active { options(&[option.as_str()]) } else { RollOptions::new() };
            let statement = PredicateStatement::atom(option.clone());
            prop_assert_eq!(statement.clone().negate().negate().test(&opts), statement.test(&opts));
        }
    }
}
