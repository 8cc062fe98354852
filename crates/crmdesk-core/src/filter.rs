//! # Filter Conditions
//!
//! Free-text search and structured per-field conditions.
//!
//! ## Matching Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Every comparison runs on lower-cased, stringified values               │
//! │                                                                         │
//! │  Operator          Holds when (field = f, value = v)                    │
//! │  ────────────────  ─────────────────────────────────────                │
//! │  is                f == v                                               │
//! │  isn't             f != v                                               │
//! │  contains          f.contains(v)                                        │
//! │  doesn't contain   !f.contains(v)                                       │
//! │  starts with       f.starts_with(v)                                     │
//! │  ends with         f.ends_with(v)                                       │
//! │  is empty          f == ""            (v ignored)                       │
//! │  is not empty      f != ""            (v ignored)                       │
//! │  anything else     true                                                 │
//! │                                                                         │
//! │  Conditions AND together; search AND conditions must both pass          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::record::Tabular;

// =============================================================================
// Operator
// =============================================================================

/// Comparison applied by a [`FilterCondition`].
///
/// Serialized with the labels the dashboard dropdown uses (`"is"`,
/// `"doesn't contain"`, ...). Labels outside the known set are kept verbatim
/// in [`Operator::Other`] and never filter anything out.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Operator {
    Is,
    IsNot,
    Contains,
    DoesNotContain,
    StartsWith,
    EndsWith,
    IsEmpty,
    IsNotEmpty,
    Other(String),
}

impl Operator {
    /// Every operator the dashboard offers, in menu order.
    pub const ALL: [Operator; 8] = [
        Operator::Is,
        Operator::IsNot,
        Operator::Contains,
        Operator::DoesNotContain,
        Operator::StartsWith,
        Operator::EndsWith,
        Operator::IsEmpty,
        Operator::IsNotEmpty,
    ];

    /// Dashboard label for this operator.
    pub fn label(&self) -> &str {
        match self {
            Operator::Is => "is",
            Operator::IsNot => "isn't",
            Operator::Contains => "contains",
            Operator::DoesNotContain => "doesn't contain",
            Operator::StartsWith => "starts with",
            Operator::EndsWith => "ends with",
            Operator::IsEmpty => "is empty",
            Operator::IsNotEmpty => "is not empty",
            Operator::Other(label) => label,
        }
    }

    /// Whether the comparison value is consulted at all.
    pub fn takes_value(&self) -> bool {
        !matches!(
            self,
            Operator::IsEmpty | Operator::IsNotEmpty | Operator::Other(_)
        )
    }

    /// Evaluates the operator. Both sides must already be lower-cased.
    pub fn evaluate(&self, field: &str, value: &str) -> bool {
        match self {
            Operator::Is => field == value,
            Operator::IsNot => field != value,
            Operator::Contains => field.contains(value),
            Operator::DoesNotContain => !field.contains(value),
            Operator::StartsWith => field.starts_with(value),
            Operator::EndsWith => field.ends_with(value),
            Operator::IsEmpty => field.is_empty(),
            Operator::IsNotEmpty => !field.is_empty(),
            Operator::Other(_) => true,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Operator {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "is" => Operator::Is,
            "isn't" => Operator::IsNot,
            "contains" => Operator::Contains,
            "doesn't contain" => Operator::DoesNotContain,
            "starts with" => Operator::StartsWith,
            "ends with" => Operator::EndsWith,
            "is empty" => Operator::IsEmpty,
            "is not empty" => Operator::IsNotEmpty,
            other => Operator::Other(other.to_string()),
        })
    }
}

impl From<String> for Operator {
    fn from(s: String) -> Self {
        match s.parse() {
            Ok(op) => op,
            Err(never) => match never {},
        }
    }
}

impl From<Operator> for String {
    fn from(op: Operator) -> Self {
        op.label().to_string()
    }
}

// =============================================================================
// Filter Condition
// =============================================================================

/// A single structured filter rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCondition {
    pub field: String,
    pub operator: Operator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl FilterCondition {
    /// Creates a condition with a comparison value.
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<String>) -> Self {
        FilterCondition {
            field: field.into(),
            operator,
            value: Some(value.into()),
        }
    }

    /// Creates a condition that takes no value (`is empty`, `is not empty`).
    pub fn unary(field: impl Into<String>, operator: Operator) -> Self {
        FilterCondition {
            field: field.into(),
            operator,
            value: None,
        }
    }

    /// Checks the condition against a row.
    pub fn matches<T: Tabular + ?Sized>(&self, row: &T) -> bool {
        let field = row.field(&self.field).to_search_text().to_lowercase();
        let value = self.value.as_deref().unwrap_or("").to_lowercase();
        self.operator.evaluate(&field, &value)
    }
}

// =============================================================================
// Conditions
// =============================================================================

/// Active conditions, at most one per field.
///
/// ## Example
/// ```rust
/// use crmdesk_core::filter::{Conditions, FilterCondition, Operator};
///
/// let mut conditions = Conditions::new();
/// conditions.apply(FilterCondition::new("status", Operator::Is, "new"));
/// conditions.apply(FilterCondition::new("status", Operator::Is, "won"));
///
/// // Last applied wins
/// assert_eq!(conditions.len(), 1);
/// assert_eq!(conditions.get("status").unwrap().value.as_deref(), Some("won"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conditions {
    by_field: BTreeMap<String, FilterCondition>,
}

impl Conditions {
    pub fn new() -> Self {
        Conditions::default()
    }

    /// Inserts a condition, replacing any existing one on the same field.
    pub fn apply(&mut self, condition: FilterCondition) -> Option<FilterCondition> {
        self.by_field.insert(condition.field.clone(), condition)
    }

    /// Removes the condition on `field`.
    pub fn remove(&mut self, field: &str) -> Option<FilterCondition> {
        self.by_field.remove(field)
    }

    pub fn get(&self, field: &str) -> Option<&FilterCondition> {
        self.by_field.get(field)
    }

    pub fn clear(&mut self) {
        self.by_field.clear();
    }

    pub fn len(&self) -> usize {
        self.by_field.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_field.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FilterCondition> {
        self.by_field.values()
    }

    /// True when every condition holds for the row.
    pub fn matches<T: Tabular + ?Sized>(&self, row: &T) -> bool {
        self.by_field.values().all(|c| c.matches(row))
    }
}

impl FromIterator<FilterCondition> for Conditions {
    fn from_iter<I: IntoIterator<Item = FilterCondition>>(iter: I) -> Self {
        let mut conditions = Conditions::new();
        for condition in iter {
            conditions.apply(condition);
        }
        conditions
    }
}

/// Free-text search: does any field contain `query`, ignoring case?
///
/// An empty query matches everything.
pub fn matches_query<T: Tabular + ?Sized>(row: &T, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    row.search_values()
        .iter()
        .any(|v| v.to_search_text().to_lowercase().contains(&needle))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;

    fn lead() -> Record {
        Record::new()
            .with("id", "L-1")
            .with("name", "Priya Sharma")
            .with("status", "Qualified")
            .with("email", "")
            .with("score", 87.0)
    }

    #[test]
    fn test_operator_labels_round_trip() {
        for op in Operator::ALL {
            let parsed: Operator = op.label().parse().unwrap();
            assert_eq!(parsed, op);
        }
        assert_eq!(
            "greater than".parse::<Operator>().unwrap(),
            Operator::Other("greater than".to_string())
        );
    }

    #[test]
    fn test_operator_serde_uses_labels() {
        let json = serde_json::to_string(&Operator::DoesNotContain).unwrap();
        assert_eq!(json, r#""doesn't contain""#);

        let condition: FilterCondition =
            serde_json::from_str(r#"{"field": "status", "operator": "isn't", "value": "Lost"}"#)
                .unwrap();
        assert_eq!(condition.operator, Operator::IsNot);
    }

    #[test]
    fn test_each_operator() {
        let row = lead();
        let check = |op: Operator, value: &str| FilterCondition::new("status", op, value).matches(&row);

        assert!(check(Operator::Is, "qualified"));
        assert!(!check(Operator::Is, "qual"));
        assert!(check(Operator::IsNot, "lost"));
        assert!(check(Operator::Contains, "ALIF"));
        assert!(check(Operator::DoesNotContain, "lost"));
        assert!(check(Operator::StartsWith, "qua"));
        assert!(check(Operator::EndsWith, "fied"));
        assert!(!check(Operator::EndsWith, "qua"));
    }

    #[test]
    fn test_emptiness_ignores_value() {
        let row = lead();
        assert!(FilterCondition::new("email", Operator::IsEmpty, "ignored").matches(&row));
        assert!(FilterCondition::unary("missing_field", Operator::IsEmpty).matches(&row));
        assert!(FilterCondition::unary("name", Operator::IsNotEmpty).matches(&row));
        assert!(!FilterCondition::unary("email", Operator::IsNotEmpty).matches(&row));
    }

    #[test]
    fn test_unknown_operator_is_vacuous() {
        let row = lead();
        let condition = FilterCondition::new("status", Operator::Other("between".into()), "x");
        assert!(condition.matches(&row));
    }

    #[test]
    fn test_is_and_is_not_are_complements() {
        let row = lead();
        for value in ["qualified", "Qualified", "new", ""] {
            let is = FilterCondition::new("status", Operator::Is, value).matches(&row);
            let is_not = FilterCondition::new("status", Operator::IsNot, value).matches(&row);
            assert_ne!(is, is_not, "value {value:?}");
        }
    }

    #[test]
    fn test_contains_every_substring() {
        let row = lead();
        let name = "priya sharma";
        for start in 0..name.len() {
            for end in start..=name.len() {
                let condition = FilterCondition::new("name", Operator::Contains, &name[start..end]);
                assert!(condition.matches(&row));
            }
        }
    }

    #[test]
    fn test_numbers_are_stringified() {
        let row = lead();
        assert!(FilterCondition::new("score", Operator::Is, "87").matches(&row));
        assert!(FilterCondition::new("score", Operator::StartsWith, "8").matches(&row));
    }

    #[test]
    fn test_conditions_are_anded() {
        let row = lead();
        let conditions: Conditions = [
            FilterCondition::new("status", Operator::Is, "qualified"),
            FilterCondition::new("name", Operator::StartsWith, "priya"),
        ]
        .into_iter()
        .collect();
        assert!(conditions.matches(&row));

        let mut failing = conditions.clone();
        failing.apply(FilterCondition::new("name", Operator::StartsWith, "sharma"));
        assert!(!failing.matches(&row));
    }

    #[test]
    fn test_matches_query() {
        let row = lead();
        assert!(matches_query(&row, ""));
        assert!(matches_query(&row, "SHARMA"));
        assert!(matches_query(&row, "87"));
        assert!(matches_query(&row, "L-1"));
        assert!(!matches_query(&row, "zzz"));
    }
}
