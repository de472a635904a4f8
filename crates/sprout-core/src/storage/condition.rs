//! Write conditions evaluated by a store against its authoritative record.
//!
//! A condition is the only synchronization primitive available to this crate:
//! the store checks it atomically at write time and rejects the write with a
//! condition failure when it does not hold.

use crate::storage::record::{FieldMap, FieldValue, ProfileField};
use std::fmt::{self, Display};

///
/// Condition
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Condition {
    All(Vec<Self>),
    Any(Vec<Self>),
    Pred(FieldPredicate),
}

///
/// FieldPredicate
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FieldPredicate {
    AttributeExists { field: ProfileField, exists: bool },
    AttributeIsNullType(ProfileField),
    Equals(ProfileField, FieldValue),
    NotEquals(ProfileField, FieldValue),
    LessThan(ProfileField, FieldValue),
}

pub fn all<I>(conditions: I) -> Condition
where
    I: IntoIterator<Item = Condition>,
{
    Condition::All(conditions.into_iter().collect())
}

pub fn any<I>(conditions: I) -> Condition
where
    I: IntoIterator<Item = Condition>,
{
    Condition::Any(conditions.into_iter().collect())
}

#[must_use]
pub const fn attribute_exists(field: ProfileField) -> Condition {
    Condition::Pred(FieldPredicate::AttributeExists {
        field,
        exists: true,
    })
}

#[must_use]
pub const fn attribute_not_exists(field: ProfileField) -> Condition {
    Condition::Pred(FieldPredicate::AttributeExists {
        field,
        exists: false,
    })
}

#[must_use]
pub const fn attribute_is_null_type(field: ProfileField) -> Condition {
    Condition::Pred(FieldPredicate::AttributeIsNullType(field))
}

#[must_use]
pub const fn equals(field: ProfileField, value: FieldValue) -> Condition {
    Condition::Pred(FieldPredicate::Equals(field, value))
}

#[must_use]
pub const fn not_equals(field: ProfileField, value: FieldValue) -> Condition {
    Condition::Pred(FieldPredicate::NotEquals(field, value))
}

#[must_use]
pub const fn less_than(field: ProfileField, value: FieldValue) -> Condition {
    Condition::Pred(FieldPredicate::LessThan(field, value))
}

impl Condition {
    /// Evaluate against the current stored record.
    ///
    /// Comparison semantics follow conditional-write stores: `Equals` and
    /// `LessThan` are false on a missing field, `NotEquals` is true on a
    /// missing field, and `LessThan` only compares values of the same type.
    /// An explicit null counts as an existing attribute.
    #[must_use]
    pub fn evaluate(&self, record: &FieldMap) -> bool {
        match self {
            Self::All(conds) => conds.iter().all(|c| c.evaluate(record)),
            Self::Any(conds) => conds.iter().any(|c| c.evaluate(record)),
            Self::Pred(pred) => pred.evaluate(record),
        }
    }
}

impl FieldPredicate {
    fn evaluate(&self, record: &FieldMap) -> bool {
        match self {
            Self::AttributeExists { field, exists } => record.contains_key(field) == *exists,
            Self::AttributeIsNullType(field) => {
                matches!(record.get(field), Some(FieldValue::Null))
            }
            Self::Equals(field, value) => record.get(field) == Some(value),
            Self::NotEquals(field, value) => record.get(field) != Some(value),
            Self::LessThan(field, value) => match (record.get(field), value) {
                (Some(FieldValue::Int(current)), FieldValue::Int(bound)) => current < bound,
                (Some(FieldValue::Str(current)), FieldValue::Str(bound)) => current < bound,
                _ => false,
            },
        }
    }
}

impl Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (conds, joiner) = match self {
            Self::Pred(pred) => return write!(f, "{pred}"),
            Self::All(conds) => (conds, " AND "),
            Self::Any(conds) => (conds, " OR "),
        };

        f.write_str("(")?;
        for (i, cond) in conds.iter().enumerate() {
            if i > 0 {
                f.write_str(joiner)?;
            }
            write!(f, "{cond}")?;
        }
        f.write_str(")")
    }
}

impl Display for FieldPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AttributeExists { field, exists } => {
                write!(f, "attribute_exists({field}) = {exists}")
            }
            Self::AttributeIsNullType(field) => write!(f, "attribute_type({field}, NULL)"),
            Self::Equals(field, value) => write!(f, "{field} = {}", render(value)),
            Self::NotEquals(field, value) => write!(f, "{field} <> {}", render(value)),
            Self::LessThan(field, value) => write!(f, "{field} < {}", render(value)),
        }
    }
}

fn render(value: &FieldValue) -> String {
    match value {
        FieldValue::Null => "null".to_string(),
        FieldValue::Int(v) => v.to_string(),
        FieldValue::Str(v) => format!("{v:?}"),
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    fn record(entries: &[(ProfileField, FieldValue)]) -> FieldMap {
        entries.iter().cloned().collect()
    }

    #[test]
    fn predicates_follow_conditional_write_semantics() {
        let rec = record(&[
            (ProfileField::SeedVersion, FieldValue::Int(0)),
            (ProfileField::Email, FieldValue::Null),
            (ProfileField::DisplayName, FieldValue::str("")),
        ]);

        struct Case {
            name: &'static str,
            cond: Condition,
            expected: bool,
        }

        let cases = [
            Case {
                name: "exists on null field",
                cond: attribute_exists(ProfileField::Email),
                expected: true,
            },
            Case {
                name: "not exists on missing field",
                cond: attribute_not_exists(ProfileField::AvatarUrl),
                expected: true,
            },
            Case {
                name: "null type on null field",
                cond: attribute_is_null_type(ProfileField::Email),
                expected: true,
            },
            Case {
                name: "null type on empty string",
                cond: attribute_is_null_type(ProfileField::DisplayName),
                expected: false,
            },
            Case {
                name: "equals empty string",
                cond: equals(ProfileField::DisplayName, FieldValue::str("")),
                expected: true,
            },
            Case {
                name: "equals on missing field",
                cond: equals(ProfileField::SeededAt, FieldValue::Int(0)),
                expected: false,
            },
            Case {
                name: "not equals on missing field",
                cond: not_equals(ProfileField::SeededAt, FieldValue::Int(0)),
                expected: true,
            },
            Case {
                name: "less than int",
                cond: less_than(ProfileField::SeedVersion, FieldValue::Int(1)),
                expected: true,
            },
            Case {
                name: "less than type mismatch",
                cond: less_than(ProfileField::SeedVersion, FieldValue::str("1")),
                expected: false,
            },
            Case {
                name: "less than on missing field",
                cond: less_than(ProfileField::SeededAt, FieldValue::Int(1)),
                expected: false,
            },
        ];

        for case in cases {
            assert_eq!(case.cond.evaluate(&rec), case.expected, "{}", case.name);
        }
    }

    #[test]
    fn composition_short_circuits_like_boolean_logic() {
        let rec = record(&[(ProfileField::SeedVersion, FieldValue::Int(-1))]);

        let claimable = all([
            less_than(ProfileField::SeedVersion, FieldValue::Int(1)),
            not_equals(ProfileField::SeedVersion, FieldValue::Int(-1)),
        ]);
        let either = any([
            equals(ProfileField::SeedVersion, FieldValue::Int(-1)),
            attribute_exists(ProfileField::Email),
        ]);

        assert!(!claimable.evaluate(&rec));
        assert!(either.evaluate(&rec));
        assert!(all([]).evaluate(&rec));
        assert!(!any([]).evaluate(&rec));
    }

    #[test]
    fn display_renders_readable_expression() {
        let cond = any([
            attribute_not_exists(ProfileField::Email),
            equals(ProfileField::Email, FieldValue::str("")),
        ]);

        assert_eq!(
            cond.to_string(),
            "(attribute_exists(email) = false OR email = \"\")"
        );
    }
}
