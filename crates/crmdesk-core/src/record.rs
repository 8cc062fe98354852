//! # Records and Field Values
//!
//! The table pipeline works over anything that can hand out scalar field
//! values by column key. Two shapes implement that contract:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Tabular Rows                                    │
//! │                                                                         │
//! │   ┌─────────────────────────┐       ┌─────────────────────────────┐    │
//! │   │  Record (untyped)       │       │  Lead / Deal / Invoice ...  │    │
//! │   │  BTreeMap<String,       │       │  typed struct + accessor    │    │
//! │   │           FieldValue>   │       │  table (entity.rs)          │    │
//! │   └────────────┬────────────┘       └──────────────┬──────────────┘    │
//! │                │                                   │                    │
//! │                └─────────────┬─────────────────────┘                    │
//! │                              ▼                                          │
//! │                    trait Tabular { field(key) }                         │
//! │                              │                                          │
//! │                              ▼                                          │
//! │                  pipeline::visible_page(..)                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Ordering Across Types
//! Sorting compares raw values. Values of different kinds are ranked
//! `Missing < Bool < Number < Date < Text`, so the comparator is a total
//! order and mixed columns sort deterministically.
//!
//! ## Number Text
//! Numbers stringify with Rust's `f64` formatting, which never uses an
//! exponent: `1e21` searches as `1000000000000000000000` and `1e-7` as
//! `0.0000001`. A JavaScript host writes those as `1e+21` and `1e-7`, so
//! search text for very large or very small numbers differs from the browser.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

// =============================================================================
// Field Value
// =============================================================================

/// A single scalar cell value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FieldValue {
    /// Absent field or JSON `null`.
    #[default]
    Missing,
    Bool(bool),
    Number(f64),
    Date(NaiveDate),
    Text(String),
}

impl FieldValue {
    /// Wraps an optional value, mapping `None` to [`FieldValue::Missing`].
    pub fn from_option<T: Into<FieldValue>>(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Missing)
    }

    /// Returns true for [`FieldValue::Missing`].
    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }

    /// Stringified form used by search and structured conditions.
    ///
    /// Numbers print without an exponent (see the module docs on number text).
    ///
    /// ## Example
    /// ```rust
    /// use crmdesk_core::record::FieldValue;
    ///
    /// assert_eq!(FieldValue::Number(900.0).to_search_text(), "900");
    /// assert_eq!(FieldValue::Number(1.5).to_search_text(), "1.5");
    /// assert_eq!(FieldValue::Missing.to_search_text(), "");
    /// ```
    pub fn to_search_text(&self) -> String {
        match self {
            FieldValue::Missing => String::new(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Number(n) => n.to_string(),
            FieldValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            FieldValue::Text(s) => s.clone(),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            FieldValue::Missing => 0,
            FieldValue::Bool(_) => 1,
            FieldValue::Number(_) => 2,
            FieldValue::Date(_) => 3,
            FieldValue::Text(_) => 4,
        }
    }

    /// Natural ordering on raw values, total across kinds.
    pub fn natural_cmp(&self, other: &FieldValue) -> Ordering {
        match (self, other) {
            (FieldValue::Bool(a), FieldValue::Bool(b)) => a.cmp(b),
            (FieldValue::Number(a), FieldValue::Number(b)) => a.total_cmp(b),
            (FieldValue::Date(a), FieldValue::Date(b)) => a.cmp(b),
            (FieldValue::Text(a), FieldValue::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_search_text())
    }
}

impl From<&Value> for FieldValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => FieldValue::Missing,
            Value::Bool(b) => FieldValue::Bool(*b),
            Value::Number(n) => n
                .as_f64()
                .map(FieldValue::Number)
                .unwrap_or_else(|| FieldValue::Text(n.to_string())),
            Value::String(s) => FieldValue::Text(s.clone()),
            // Nested data is flattened to its compact JSON text
            other => FieldValue::Text(other.to_string()),
        }
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Number(n as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(d: NaiveDate) -> Self {
        FieldValue::Date(d)
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Missing => serializer.serialize_none(),
            FieldValue::Bool(b) => serializer.serialize_bool(*b),
            FieldValue::Number(n) => serializer.serialize_f64(*n),
            FieldValue::Date(_) => serializer.serialize_str(&self.to_search_text()),
            FieldValue::Text(s) => serializer.serialize_str(s),
        }
    }
}

impl<'de> Deserialize<'de> for FieldValue {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(FieldValue::from(&value))
    }
}

// =============================================================================
// Tabular Trait
// =============================================================================

/// A row the table pipeline can filter, sort, and page.
pub trait Tabular {
    /// Stable row key (list key for rendering and selection).
    fn row_id(&self) -> String;

    /// Value at `key`, or [`FieldValue::Missing`] when the row has no such column.
    fn field(&self, key: &str) -> FieldValue;

    /// Every value that free-text search looks at.
    fn search_values(&self) -> Vec<FieldValue>;
}

// =============================================================================
// Record
// =============================================================================

/// An untyped row: field name → scalar value.
///
/// ## Example
/// ```rust
/// use crmdesk_core::record::{Record, Tabular};
///
/// let record: Record = serde_json::from_str(r#"{"id": "7", "name": "Asha", "score": 42}"#).unwrap();
/// assert_eq!(record.row_id(), "7");
/// assert_eq!(record.field("score").to_search_text(), "42");
/// assert!(record.field("email").is_missing());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Record::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets a field, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Borrowed access to a field.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Checks if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates fields in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }
}

impl Tabular for Record {
    fn row_id(&self) -> String {
        self.get("id")
            .or_else(|| self.get("_id"))
            .map(FieldValue::to_search_text)
            .unwrap_or_default()
    }

    fn field(&self, key: &str) -> FieldValue {
        self.get(key).cloned().unwrap_or_default()
    }

    fn search_values(&self) -> Vec<FieldValue> {
        self.fields.values().cloned().collect()
    }
}

impl FromIterator<(String, FieldValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Record {
            fields: iter.into_iter().collect(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_text() {
        assert_eq!(FieldValue::Text("Hot".into()).to_search_text(), "Hot");
        assert_eq!(FieldValue::Number(1062.0).to_search_text(), "1062");
        assert_eq!(FieldValue::Number(-0.25).to_search_text(), "-0.25");
        assert_eq!(FieldValue::Bool(true).to_search_text(), "true");
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(FieldValue::Date(date).to_search_text(), "2024-03-09");
        assert_eq!(FieldValue::Missing.to_search_text(), "");
    }

    #[test]
    fn test_number_text_has_no_exponent() {
        assert_eq!(FieldValue::Number(1e21).to_search_text(), "1000000000000000000000");
        assert_eq!(FieldValue::Number(1e-7).to_search_text(), "0.0000001");
    }

    #[test]
    fn test_natural_cmp_same_kind() {
        let a = FieldValue::Number(2.0);
        let b = FieldValue::Number(10.0);
        assert_eq!(a.natural_cmp(&b), Ordering::Less);

        // Raw text comparison is case-sensitive and lexicographic
        let a = FieldValue::Text("Zed".into());
        let b = FieldValue::Text("apple".into());
        assert_eq!(a.natural_cmp(&b), Ordering::Less);

        assert_eq!(
            FieldValue::Text("same".into()).natural_cmp(&FieldValue::Text("same".into())),
            Ordering::Equal
        );
    }

    #[test]
    fn test_natural_cmp_mixed_kinds_is_ranked() {
        let missing = FieldValue::Missing;
        let number = FieldValue::Number(1_000_000.0);
        let text = FieldValue::Text("1".into());

        assert_eq!(missing.natural_cmp(&number), Ordering::Less);
        assert_eq!(number.natural_cmp(&text), Ordering::Less);
        assert_eq!(text.natural_cmp(&missing), Ordering::Greater);
    }

    #[test]
    fn test_record_from_json() {
        let json = r#"{"id": 12, "name": "Ravi", "tags": ["a", "b"], "note": null}"#;
        let record: Record = serde_json::from_str(json).unwrap();

        assert_eq!(record.row_id(), "12");
        assert_eq!(record.field("name"), FieldValue::Text("Ravi".into()));
        assert_eq!(record.field("tags"), FieldValue::Text(r#"["a","b"]"#.into()));
        assert!(record.field("note").is_missing());
        assert!(record.field("absent").is_missing());
    }

    #[test]
    fn test_record_falls_back_to_underscore_id() {
        let record = Record::new().with("_id", "65f0c2").with("name", "Meera");
        assert_eq!(record.row_id(), "65f0c2");
    }

    #[test]
    fn test_record_serializes_flat() {
        let record = Record::new().with("id", "1").with("amount", 900.0);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json, serde_json::json!({"id": "1", "amount": 900.0}));
    }
}
